//! Sequential number and label formatting.

use serde::{Deserialize, Serialize};

use crate::models::invoice::{CategoryCodes, InvoiceRecord};

/// How a buyer's sequential numbers are printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelScheme {
    /// `007/2025`
    Standard,
    /// `KJ_A_0007`, the letter taken from the vendor name.
    PrefixedLetter { prefix: String },
}

impl LabelScheme {
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        LabelScheme::PrefixedLetter {
            prefix: prefix.into(),
        }
    }

    /// Format `number` for an invoice from `vendor_name`.
    pub fn format(&self, vendor_name: &str, number: u32, year: i32) -> String {
        match self {
            LabelScheme::Standard => format!("{:03}/{}", number, year),
            LabelScheme::PrefixedLetter { prefix } => {
                format!("{}_{}_{:04}", prefix, vendor_letter(vendor_name), number)
            }
        }
    }
}

static STANDARD: LabelScheme = LabelScheme::Standard;

/// Uppercased first character of the vendor name, `X` when blank.
pub fn vendor_letter(vendor_name: &str) -> char {
    vendor_name
        .trim()
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('X')
}

/// Buyers with their own numbering scheme.
pub fn default_schemes() -> Vec<(String, LabelScheme)> {
    vec![
        ("8522482321".to_string(), LabelScheme::prefixed("KJ")),
        ("8522669232".to_string(), LabelScheme::prefixed("KT")),
    ]
}

/// Builds sequential numbers and labels from a buyer-keyed scheme table.
#[derive(Debug, Clone)]
pub struct LabelFormatter {
    schemes: Vec<(String, LabelScheme)>,
}

impl LabelFormatter {
    pub fn new() -> Self {
        Self {
            schemes: default_schemes(),
        }
    }

    /// Add or replace the scheme of one buyer.
    pub fn with_scheme(mut self, buyer_nip: impl Into<String>, scheme: LabelScheme) -> Self {
        let buyer_nip = buyer_nip.into();
        self.schemes.retain(|(nip, _)| *nip != buyer_nip);
        self.schemes.push((buyer_nip, scheme));
        self
    }

    /// Scheme used for `buyer_nip`.
    pub fn scheme(&self, buyer_nip: &str) -> &LabelScheme {
        self.schemes
            .iter()
            .find(|(nip, _)| nip == buyer_nip)
            .map(|(_, scheme)| scheme)
            .unwrap_or(&STANDARD)
    }

    pub fn sequential_number(&self, buyer_nip: &str, vendor_name: &str, number: u32, year: i32) -> String {
        self.scheme(buyer_nip).format(vendor_name, number, year)
    }

    /// `group;mpk;sequentialNumber[;clientNumber]`
    pub fn build(&self, codes: &CategoryCodes, sequential_number: &str, client_number: Option<&str>) -> String {
        let mut label = format!("{};{};{}", codes.group, codes.mpk, sequential_number);
        if let Some(client) = client_number.map(str::trim).filter(|c| !c.is_empty()) {
            label.push(';');
            label.push_str(client);
        }
        label
    }

    /// Regenerate the sequential number and label of an edited record.
    ///
    /// The allocated number and year never change; only the vendor letter,
    /// codes and client number flow into the new strings.
    pub fn relabel(&self, record: &mut InvoiceRecord) {
        record.sequential_number = self.sequential_number(
            &record.buyer_nip,
            &record.vendor_name,
            record.sequence,
            record.year,
        );
        record.label = self.build(
            &record.codes(),
            &record.sequential_number,
            record.client_number.as_deref(),
        );
    }
}

impl Default for LabelFormatter {
    fn default() -> Self {
        Self::new()
    }
}
