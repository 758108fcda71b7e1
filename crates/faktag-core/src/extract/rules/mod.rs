//! Rule-based field extractors for Polish invoices.
//!
//! Every rule is a pure function over the document text. A field that no
//! rule can find is reported as absent, never as an error.

pub mod dates;
pub mod invoice_number;
pub mod nip;
pub mod parties;
pub mod patterns;
pub mod payment;

pub use dates::{extract_dates, format_date, normalize_date, parse_date, DateExtractor, InvoiceDates};
pub use invoice_number::extract_invoice_number;
pub use nip::{normalize_nip, validate_nip, NipExtractor, PartyNips};
pub use parties::{extract_buyer_address, extract_buyer_name, extract_parties, extract_vendor_name, PartyNames};
pub use payment::extract_payment_method;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched value with its confidence and location.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
