//! Source documents and the plain text recovered from them.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of bytes held by a [`RawDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// PDF, with or without a text layer.
    Pdf,
    /// Raster image (PNG, JPEG, TIFF, ...).
    Image,
}

impl MediaType {
    /// Guess the media type from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" | "gif" => {
                Some(MediaType::Image)
            }
            _ => None,
        }
    }
}

/// An invoice file as handed over by the caller.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub file_name: Option<String>,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self {
            bytes,
            media_type,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Read a document from disk, detecting the media type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let media_type = MediaType::from_path(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unsupported file type: {}", path.display()),
            )
        })?;
        let bytes = std::fs::read(path)?;
        let mut doc = Self::new(bytes, media_type);
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            doc = doc.with_file_name(name);
        }
        Ok(doc)
    }
}

/// Where the text of an [`ExtractedText`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    /// Embedded PDF text layer.
    Native,
    /// Optical character recognition.
    Ocr,
}

/// Plain text recovered from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub source: TextSource,
    /// Mean OCR confidence in [0, 1]; `None` for native text.
    pub confidence: Option<f32>,
}

impl ExtractedText {
    pub fn native(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: TextSource::Native,
            confidence: None,
        }
    }

    pub fn ocr(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            source: TextSource::Ocr,
            confidence: Some(confidence.clamp(0.0, 1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_path() {
        assert_eq!(MediaType::from_path(Path::new("a/Faktura.PDF")), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_path(Path::new("scan.jpeg")), Some(MediaType::Image));
        assert_eq!(MediaType::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaType::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_ocr_confidence_is_clamped() {
        assert_eq!(ExtractedText::ocr("x", 1.7).confidence, Some(1.0));
        assert_eq!(ExtractedText::native("x").confidence, None);
    }
}
