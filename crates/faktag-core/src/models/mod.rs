//! Data models for documents, invoices and configuration.

pub mod config;
pub mod document;
pub mod invoice;

pub use config::FaktagConfig;
pub use document::{ExtractedText, MediaType, RawDocument, TextSource};
pub use invoice::{
    CategoryCodes, InvoiceFields, InvoiceRecord, PaymentMethod, NAME_NOT_FOUND, NIP_UNKNOWN,
    NUMBER_UNKNOWN,
};
