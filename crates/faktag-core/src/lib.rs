//! Core library for Polish invoice tagging.
//!
//! This crate provides:
//! - Text normalization (PDF text layer, OCR fallback over page images)
//! - Rule-based field extraction (parties, NIP, dates, number, payment)
//! - Buyer identity verification against known buyers
//! - Vendor category classification into MPK and group codes
//! - Per-buyer sequential numbering and labels
//! - Mapping and counter stores

pub mod classify;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod sequence;
pub mod store;
pub mod verify;

pub use classify::{CategoryMatch, Classifier};
pub use error::{FaktagError, Result};
pub use extract::{FieldParser, ParseResult};
pub use models::{
    CategoryCodes, ExtractedText, FaktagConfig, InvoiceFields, InvoiceRecord, MediaType,
    PaymentMethod, RawDocument, TextSource,
};
pub use normalize::TextNormalizer;
pub use ocr::{OcrOutput, OcrRequest, OcrService};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{InvoiceEdit, InvoicePipeline, PendingInvoice, ProcessingOutcome};
pub use sequence::{LabelFormatter, LabelScheme, SequenceAssigner};
pub use store::{JsonFileStore, MemoryStore};
pub use verify::{IdentityVerifier, MatchedBy, VerificationResult};
