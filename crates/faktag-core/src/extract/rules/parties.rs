//! Vendor and buyer name and address extraction.

use regex::Regex;

use super::dates::DateExtractor;
use super::patterns::{
    BUYER_LABEL, DOCUMENT_TITLE, DUE_DATE, IDENTIFIER_LINE, INVOICE_NUMBER_LABELED, ISSUE_DATE,
    LEGAL_ENTITY, PAYMENT_LABEL, SELLER_LABEL,
};
use super::FieldExtractor;

/// Names and buyer address found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyNames {
    pub vendor_name: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_address: Option<String>,
}

/// Extract both party names and the buyer address.
pub fn extract_parties(text: &str, header_lines: usize) -> PartyNames {
    let vendor_name = extract_vendor_name(text, header_lines);
    let buyer_name = extract_buyer_name(text, vendor_name.as_deref());
    let buyer_address = extract_buyer_address(text);

    PartyNames {
        vendor_name,
        buyer_name,
        buyer_address,
    }
}

/// Vendor name from the seller label, else a header line that looks like a company.
pub fn extract_vendor_name(text: &str, header_lines: usize) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();

    if let Some((name, _)) = labeled_value(&SELLER_LABEL, &lines) {
        return Some(name);
    }

    let buyer_line = lines
        .iter()
        .position(|l| BUYER_LABEL.is_match(l))
        .unwrap_or(lines.len());
    let header: Vec<&str> = lines[..buyer_line]
        .iter()
        .take(header_lines)
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    header
        .iter()
        .find(|l| LEGAL_ENTITY.is_match(l) && !IDENTIFIER_LINE.is_match(l))
        .or_else(|| header.iter().find(|l| is_substantial(l)))
        .map(|l| l.to_string())
}

/// Buyer name from the buyer label, without a vendor name captured on the same line.
pub fn extract_buyer_name(text: &str, vendor_name: Option<&str>) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let (name, _) = labeled_value(&BUYER_LABEL, &lines)?;

    match vendor_name.and_then(|v| strip_prefix_ignore_case(&name, v)) {
        Some(rest) => Some(rest),
        None => Some(name),
    }
}

/// Up to two lines after the buyer name, stopping at the next identifier or label.
pub fn extract_buyer_address(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let (_, name_line) = labeled_value(&BUYER_LABEL, &lines)?;

    let parts: Vec<&str> = lines[name_line + 1..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .take_while(|l| !is_field_line(l))
        .take(2)
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Value after a label on the same line, or on the next non-empty line.
fn labeled_value(label: &Regex, lines: &[&str]) -> Option<(String, usize)> {
    let (idx, caps) = lines
        .iter()
        .enumerate()
        .find_map(|(idx, line)| label.captures(line).map(|caps| (idx, caps)))?;

    let inline = clean_value(caps.get(1).map_or("", |m| m.as_str()));
    if !inline.is_empty() {
        return Some((inline, idx));
    }

    lines
        .iter()
        .enumerate()
        .skip(idx + 1)
        .find(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (clean_value(l), i))
        .filter(|(value, _)| !value.is_empty())
}

/// Cut a captured value at the next label or identifier on the same line.
fn clean_value(raw: &str) -> String {
    let end = [&*SELLER_LABEL, &*BUYER_LABEL, &*IDENTIFIER_LINE]
        .iter()
        .filter_map(|re| re.find(raw).map(|m| m.start()))
        .min()
        .unwrap_or(raw.len());

    raw[..end]
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|' | ':'))
        .to_string()
}

fn strip_prefix_ignore_case(value: &str, prefix: &str) -> Option<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return None;
    }

    let head = value.get(..prefix.len())?;
    if head.to_lowercase() != prefix.to_lowercase() {
        return None;
    }

    let rest = value[prefix.len()..]
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|' | '-'));
    (!rest.is_empty()).then(|| rest.to_string())
}

fn is_field_line(line: &str) -> bool {
    [
        &*IDENTIFIER_LINE,
        &*SELLER_LABEL,
        &*BUYER_LABEL,
        &*ISSUE_DATE,
        &*DUE_DATE,
        &*PAYMENT_LABEL,
        &*INVOICE_NUMBER_LABELED,
        &*DOCUMENT_TITLE,
    ]
    .iter()
    .any(|re| re.is_match(line))
}

/// A line with at least three letters that is not a title, identifier or date.
fn is_substantial(line: &str) -> bool {
    line.chars().filter(|c| c.is_alphabetic()).count() >= 3
        && !is_field_line(line)
        && DateExtractor::new().extract(line).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_names() {
        let text = "Sprzedawca: Acme Sp. z o.o.\nNIP: 123-456-78-90\nNabywca: Foo\nNIP: 098 765 43 21";
        let parties = extract_parties(text, 15);
        assert_eq!(parties.vendor_name.as_deref(), Some("Acme Sp. z o.o."));
        assert_eq!(parties.buyer_name.as_deref(), Some("Foo"));
        assert_eq!(parties.buyer_address, None);
    }

    #[test]
    fn test_name_on_next_line() {
        let text = "Sprzedawca:\nAcme Sp. z o.o.\nNabywca:\n\nQBORG Spółka z o.o.\nul. 3 Maja 8\n00-001 Warszawa\nNIP: 8522669232";
        let parties = extract_parties(text, 15);
        assert_eq!(parties.vendor_name.as_deref(), Some("Acme Sp. z o.o."));
        assert_eq!(parties.buyer_name.as_deref(), Some("QBORG Spółka z o.o."));
        assert_eq!(
            parties.buyer_address.as_deref(),
            Some("ul. 3 Maja 8, 00-001 Warszawa")
        );
    }

    #[test]
    fn test_vendor_fallback_legal_entity() {
        let text = "FAKTURA VAT\nOrlen S.A.\nul. Chemików 7\nNabywca: Foo";
        assert_eq!(extract_vendor_name(text, 15).as_deref(), Some("Orlen S.A."));
    }

    #[test]
    fn test_vendor_fallback_skips_nip_lines() {
        let text = "NIP: 1234567890 Acme Sp. z o.o.\nBeta Sp. z o.o.";
        assert_eq!(extract_vendor_name(text, 15).as_deref(), Some("Beta Sp. z o.o."));
    }

    #[test]
    fn test_vendor_fallback_substantial_line() {
        let text = "Faktura nr 12/2025\n15.01.2025\nPiekarnia Kowalski\nNabywca: Foo";
        assert_eq!(
            extract_vendor_name(text, 15).as_deref(),
            Some("Piekarnia Kowalski")
        );
    }

    #[test]
    fn test_buyer_strips_vendor_prefix() {
        let text = "Sprzedawca: Acme\nNabywca: Acme Foo Bar";
        let parties = extract_parties(text, 15);
        assert_eq!(parties.vendor_name.as_deref(), Some("Acme"));
        assert_eq!(parties.buyer_name.as_deref(), Some("Foo Bar"));
    }

    #[test]
    fn test_missing_labels() {
        assert_eq!(extract_buyer_name("nothing here", None), None);
        assert_eq!(extract_vendor_name("", 15), None);
    }
}
