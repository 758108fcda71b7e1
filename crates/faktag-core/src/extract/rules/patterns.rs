//! Common regex patterns for Polish invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // NIP (Polish tax ID): label followed by digits with optional separators
    pub static ref NIP_LABELED: Regex = Regex::new(
        r"(?i)\b(?:N\.I\.P\.?|NIP|VAT[\s\-]*ID)[\s:.#]*(?:PL[\s\-]?)?(\d[\d \-]{8,16}\d)"
    ).unwrap();

    pub static ref NIP_STANDALONE: Regex = Regex::new(
        r"\b(\d{3})[- ]?(\d{3})[- ]?(\d{2})[- ]?(\d{2})\b"
    ).unwrap();

    // Lines that carry identifiers or contact data rather than names or dates
    pub static ref IDENTIFIER_LINE: Regex = Regex::new(
        r"(?i)\b(?:nip|n\.i\.p|regon|krs|bdo|tel|telefon|phone|fax|vat\s*id)\b"
    ).unwrap();

    // Dates
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_POLISH_LONG: Regex = Regex::new(
        r"(?i)\b(\d{1,2})\s+(stycznia|lutego|marca|kwietnia|maja|czerwca|lipca|sierpnia|września|października|listopada|grudnia)\s+(\d{4})"
    ).unwrap();

    // Labeled dates
    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"(?i)(?:data\s+(?:wystawienia|faktury)|wystawion[aoe]?\s+dnia?|date\s+of\s+issue|issue\s+date)[\s:]*([^\n]*)"
    ).unwrap();

    pub static ref DUE_DATE: Regex = Regex::new(
        r"(?i)(?:termin\s+p[łl]atno[śs]ci|termin\s+zap[łl]aty|p[łl]atne?\s+do|due\s+date)[\s:]*([^\n]*)"
    ).unwrap();

    // Invoice numbers
    pub static ref INVOICE_NUMBER_LABELED: Regex = Regex::new(
        r"(?i)(?:faktura\s+(?:vat\s+)?(?:nr\.?|numer)|nr\.?\s+faktury|numer\s+faktury|invoice\s+(?:no\.?|number))[\s:]*([A-Za-z0-9][A-Za-z0-9/\-_.]*)"
    ).unwrap();

    // Groups: whole token, letters, separator, numeric part
    pub static ref INVOICE_NUMBER_PREFIXED: Regex = Regex::new(
        r"\b(([A-Z]{1,4})([ \t/\-]*)(\d+(?:/\d+){1,3})(?:/[A-Z]{1,3})?)\b"
    ).unwrap();

    // dd/mm/yyyy, as in "DNIA 12/03/2025"
    pub static ref DATE_SHAPED_NUMBER: Regex = Regex::new(
        r"^\d{1,2}/\d{1,2}/\d{4}$"
    ).unwrap();

    pub static ref INVOICE_NUMBER_PLAIN: Regex = Regex::new(
        r"\b(\d+(?:/\d+){1,3})\b"
    ).unwrap();

    // Party sections
    pub static ref SELLER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:sprzedawca|wystawca|dostawca|seller)\b[ \t]*:?[ \t]*(.*)"
    ).unwrap();

    pub static ref BUYER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:nabywca|kupuj[aą]cy|odbiorca|buyer)\b[ \t]*:?[ \t]*(.*)"
    ).unwrap();

    pub static ref LEGAL_ENTITY: Regex = Regex::new(
        r"(?i)\b(?:sp\.?\s*z\s*o\.?\s*o\.?|s\.\s?a\.|sp\.\s?k\.|sp\.\s?j\.|ltd\b|gmbh\b|inc\b)"
    ).unwrap();

    pub static ref DOCUMENT_TITLE: Regex = Regex::new(
        r"(?i)^\s*(?:faktura|invoice|rachunek|paragon|duplikat|orygina[łl]|kopia|korekta|nota)\b"
    ).unwrap();

    // Payment method
    pub static ref PAYMENT_LABEL: Regex = Regex::new(
        r"(?i)(?:spos[óo]b|forma|metoda)\s+p[łl]atno[śs]ci[\s:]*([^\n]*)"
    ).unwrap();
}

/// Byte offset of the first buyer section marker, if any.
pub fn buyer_marker_position(text: &str) -> Option<usize> {
    BUYER_LABEL.find(text).map(|m| m.start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_marker_position() {
        let text = "Sprzedawca: Acme\nNabywca: Foo";
        assert_eq!(buyer_marker_position(text), Some(17));
        assert_eq!(buyer_marker_position("Sprzedawca: Acme"), None);
    }

    #[test]
    fn test_prefixed_number_ignores_nip() {
        assert!(INVOICE_NUMBER_PREFIXED.find("NIP 123-456-78-90").is_none());
        assert_eq!(
            INVOICE_NUMBER_PREFIXED.find("Faktura FA/2341/6/2025/R z dnia").map(|m| m.as_str()),
            Some("FA/2341/6/2025/R")
        );
    }
}
