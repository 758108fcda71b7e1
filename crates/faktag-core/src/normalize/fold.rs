//! Comparison form of names and addresses.

/// Lowercase, fold Polish diacritics to ASCII, turn every other
/// non-alphanumeric character into a space and collapse whitespace.
pub fn fold_text(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ą' => 'a',
            'ć' => 'c',
            'ę' => 'e',
            'ł' => 'l',
            'ń' => 'n',
            'ó' => 'o',
            'ś' => 's',
            'ź' | 'ż' => 'z',
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => c,
            _ => ' ',
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_text() {
        assert_eq!(fold_text("Twój  Instalator, Piotr-Murawski"), "twoj instalator piotr murawski");
        assert_eq!(fold_text("ul. Bohaterów Warszawy 12/4"), "ul bohaterow warszawy 12 4");
        assert_eq!(fold_text("ŻÓŁĆ"), "zolc");
        assert_eq!(fold_text("  "), "");
    }
}
