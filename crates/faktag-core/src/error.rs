//! Error types for the faktag-core library.

use thiserror::Error;

/// Main error type for the faktag library.
#[derive(Error, Debug)]
pub enum FaktagError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// No text could be obtained from the document.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Mapping or counter store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Fatal per-document failures of the text normalizer.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Neither the text layer nor OCR produced any text.
    #[error("no text could be extracted from the document")]
    NoText,

    /// The source bytes could not be decoded at all.
    #[error("document is unreadable: {0}")]
    Unreadable(String),
}

/// Errors raised by mapping and counter stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A compare-and-swap kept losing against concurrent writers.
    #[error("concurrent update conflict on {key} after {attempts} attempts")]
    Conflict { key: String, attempts: u32 },

    /// The counter reached its largest number for the year.
    #[error("counter {key} has no numbers left in {year}")]
    Exhausted { key: String, year: i32 },

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PdfError> for ExtractionError {
    fn from(err: PdfError) -> Self {
        ExtractionError::Unreadable(err.to_string())
    }
}

/// Result type for the faktag library.
pub type Result<T> = std::result::Result<T, FaktagError>;
