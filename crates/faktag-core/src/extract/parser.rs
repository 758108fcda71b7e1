//! Field parser combining the individual extraction rules.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{InvoiceFields, NAME_NOT_FOUND, NIP_UNKNOWN, NUMBER_UNKNOWN};

use super::rules::{
    extract_dates, extract_invoice_number, extract_parties, extract_payment_method, NipExtractor,
};

/// Result of field extraction.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Extracted fields, with sentinels where nothing was found.
    pub fields: InvoiceFields,
    /// Human readable notes about missing fields.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Runs every field rule over a document's text.
#[derive(Debug, Clone)]
pub struct FieldParser {
    /// Whether to validate NIP checksums.
    validate_nip: bool,
    /// Lines scanned by header fallbacks.
    header_lines: usize,
}

impl FieldParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            validate_nip: config.validate_nip_checksum,
            header_lines: config.header_lines,
        }
    }

    /// Set NIP checksum validation.
    pub fn with_nip_validation(mut self, validate: bool) -> Self {
        self.validate_nip = validate;
        self
    }

    /// Set how many leading lines the header fallbacks inspect.
    pub fn with_header_lines(mut self, lines: usize) -> Self {
        self.header_lines = lines;
        self
    }

    /// Extract all invoice fields from plain text.
    pub fn parse(&self, text: &str) -> ParseResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing invoice fields from {} characters of text", text.len());

        let parties = extract_parties(text, self.header_lines);
        let nips = NipExtractor::new()
            .with_validation(self.validate_nip)
            .extract_parties(text);
        let dates = extract_dates(text, self.header_lines);

        let fields = InvoiceFields {
            vendor_name: parties
                .vendor_name
                .unwrap_or_else(|| NAME_NOT_FOUND.to_string()),
            vendor_nip: nips.vendor,
            buyer_name: parties
                .buyer_name
                .unwrap_or_else(|| NAME_NOT_FOUND.to_string()),
            buyer_nip: nips.buyer.unwrap_or_else(|| NIP_UNKNOWN.to_string()),
            buyer_address: parties.buyer_address,
            invoice_number: extract_invoice_number(text)
                .unwrap_or_else(|| NUMBER_UNKNOWN.to_string()),
            issue_date: dates.issue_date,
            due_date: dates.due_date,
            payment_method: extract_payment_method(text),
        };

        for field in fields.missing_fields() {
            debug!("Field not found: {}", field);
            warnings.push(format!("Could not extract {}", field.replace('_', " ")));
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted fields in {}ms ({} warnings)",
            processing_time_ms,
            warnings.len()
        );

        ParseResult {
            fields,
            warnings,
            processing_time_ms,
        }
    }
}

impl Default for FieldParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::PaymentMethod;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_seller_buyer_scenario() {
        let text = "Sprzedawca: Acme Sp. z o.o.\nNIP: 123-456-78-90\nNabywca: Foo\nNIP: 098 765 43 21";
        let result = FieldParser::new().parse(text);

        assert_eq!(result.fields.vendor_nip.as_deref(), Some("1234567890"));
        assert_eq!(result.fields.buyer_nip, "0987654321");
        assert_eq!(result.fields.vendor_name, "Acme Sp. z o.o.");
        assert_eq!(result.fields.buyer_name, "Foo");
    }

    #[test]
    fn test_full_invoice() {
        let text = r#"FAKTURA VAT nr FV/12/2025
Data wystawienia: 2025-03-05
Sprzedawca:
Orlen S.A.
ul. Chemików 7, 09-411 Płock
NIP: 774-00-01-454
Nabywca:
Twój Instalator Piotr Murawski
ul. Bohaterów Warszawy 12
78-400 Szczecinek
NIP: 852 248 23 21
Termin płatności: 19.03.25
Sposób płatności: przelew
"#;
        let result = FieldParser::new().parse(text);
        let expected = InvoiceFields {
            vendor_name: "Orlen S.A.".to_string(),
            vendor_nip: Some("7740001454".to_string()),
            buyer_name: "Twój Instalator Piotr Murawski".to_string(),
            buyer_nip: "8522482321".to_string(),
            buyer_address: Some("ul. Bohaterów Warszawy 12, 78-400 Szczecinek".to_string()),
            invoice_number: "FV/12/2025".to_string(),
            issue_date: Some("05.03.2025".to_string()),
            due_date: Some("19.03.2025".to_string()),
            payment_method: Some(PaymentMethod::Transfer),
        };

        assert_eq!(result.fields, expected);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_text_uses_sentinels() {
        let result = FieldParser::new().parse("");

        assert_eq!(result.fields, InvoiceFields::default());
        assert!(result.warnings.iter().any(|w| w.contains("invoice number")));
    }
}
