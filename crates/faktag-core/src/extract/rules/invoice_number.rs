//! Invoice number extraction.

use super::patterns::{
    DATE_SHAPED_NUMBER, INVOICE_NUMBER_LABELED, INVOICE_NUMBER_PLAIN, INVOICE_NUMBER_PREFIXED,
};

/// Extract the invoice number.
///
/// Tries, in order: a labeled number (`Faktura VAT nr ...`), a letter-prefixed
/// fraction token (`FA/2341/6/2025/R`, `FZ 328/01/2023`) and a plain fraction
/// token (`123/2025`). Internal whitespace is collapsed to single spaces.
///
/// A word followed by a space and a date (`DNIA 12/03/2025`) is not a
/// prefixed number.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    let labeled = INVOICE_NUMBER_LABELED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', '-', '_']))
        .find(|v| v.chars().any(|c| c.is_ascii_digit()));

    labeled
        .or_else(|| prefixed_number(text))
        .or_else(|| INVOICE_NUMBER_PLAIN.find(text).map(|m| m.as_str()))
        .map(collapse_whitespace)
}

fn prefixed_number(text: &str) -> Option<&str> {
    INVOICE_NUMBER_PREFIXED
        .captures_iter(text)
        .find(|caps| {
            let spaced = caps.get(3).is_some_and(|sep| {
                !sep.as_str().is_empty() && sep.as_str().chars().all(char::is_whitespace)
            });
            let date_shaped = caps
                .get(4)
                .is_some_and(|digits| DATE_SHAPED_NUMBER.is_match(digits.as_str()));
            !(spaced && date_shaped)
        })
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_number() {
        assert_eq!(
            extract_invoice_number("Faktura VAT nr FV/001/2024\nData: 15.01.2024").as_deref(),
            Some("FV/001/2024")
        );
        assert_eq!(
            extract_invoice_number("Nr faktury: 2024-0042.").as_deref(),
            Some("2024-0042")
        );
    }

    #[test]
    fn test_labeled_without_digits_falls_through() {
        let text = "Faktura VAT numer oryginał\n123/2025";
        assert_eq!(extract_invoice_number(text).as_deref(), Some("123/2025"));
    }

    #[test]
    fn test_prefixed_number() {
        assert_eq!(
            extract_invoice_number("FAKTURA VAT\nFZ   328/01/2023").as_deref(),
            Some("FZ 328/01/2023")
        );
        assert_eq!(
            extract_invoice_number("Dokument FA/2341/6/2025/R").as_deref(),
            Some("FA/2341/6/2025/R")
        );
    }

    #[test]
    fn test_date_after_word_is_not_a_prefixed_number() {
        assert_eq!(
            extract_invoice_number("Wystawiono DNIA 12/03/2025\nFZ 328/01/2023").as_deref(),
            Some("FZ 328/01/2023")
        );
        assert_eq!(
            extract_invoice_number("SPRZEDAŻ Z DNIA 12/03/2025").as_deref(),
            Some("12/03/2025")
        );
        assert_eq!(
            extract_invoice_number("Dokument FV/12/03/2025").as_deref(),
            Some("FV/12/03/2025")
        );
    }

    #[test]
    fn test_plain_number() {
        assert_eq!(
            extract_invoice_number("Rachunek 12/03/2025").as_deref(),
            Some("12/03/2025")
        );
        assert_eq!(extract_invoice_number("brak numeru"), None);
    }
}
