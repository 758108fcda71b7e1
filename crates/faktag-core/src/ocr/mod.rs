//! OCR fallback: the recognition service boundary, page preprocessing and
//! best-of-rotations selection.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;
mod rotation;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;
pub use rotation::{best_rotation, select_best, Rotation, RotationCandidate};

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, PageSegmentation};

/// Hints passed along with every recognition call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRequest {
    /// Language hint, e.g. `pol`.
    pub language: String,
    /// Page segmentation hint.
    pub page_segmentation: PageSegmentation,
}

impl OcrRequest {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            page_segmentation: PageSegmentation::Auto,
        }
    }

    pub fn with_page_segmentation(mut self, mode: PageSegmentation) -> Self {
        self.page_segmentation = mode;
        self
    }
}

impl From<&OcrConfig> for OcrRequest {
    fn from(config: &OcrConfig) -> Self {
        Self::new(config.language.clone()).with_page_segmentation(config.page_segmentation)
    }
}

/// Text recognized in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub text: String,
    /// Overall recognition confidence in [0, 1].
    pub confidence: f32,
}

impl OcrOutput {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// An empty result with zero confidence.
    pub fn empty() -> Self {
        Self::new(String::new(), 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A text recognition engine.
///
/// Implementations are black boxes: given an image they return the text and
/// how confident they are about it.
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn recognize(
        &self,
        image: &DynamicImage,
        request: &OcrRequest,
    ) -> Result<OcrOutput, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_config() {
        let config = OcrConfig {
            page_segmentation: PageSegmentation::Sparse,
            ..OcrConfig::default()
        };
        let request = OcrRequest::from(&config);
        assert_eq!(request.language, "pol");
        assert_eq!(request.page_segmentation, PageSegmentation::Sparse);
    }

    #[test]
    fn test_output_emptiness() {
        assert!(OcrOutput::empty().is_empty());
        assert!(OcrOutput::new("  \n", 0.9).is_empty());
        assert!(!OcrOutput::new("Faktura", 0.9).is_empty());
    }
}
