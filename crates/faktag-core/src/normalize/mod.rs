//! Text normalization: turn a raw document into plain text, preferring the
//! PDF text layer and falling back to OCR of the page images.

mod fold;

pub use fold::fold_text;

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::FaktagConfig;
use crate::models::document::{ExtractedText, MediaType, RawDocument};
use crate::ocr::{best_rotation, ImagePreprocessor, OcrRequest, OcrService, Rotation};
use crate::pdf::PdfExtractor;

/// Ways of obtaining text, tried in order until one is sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStrategy {
    /// Embedded PDF text layer.
    TextLayer,
    /// OCR of the page images at every configured rotation.
    Ocr,
}

impl TextStrategy {
    pub const ORDER: [TextStrategy; 2] = [TextStrategy::TextLayer, TextStrategy::Ocr];
}

/// Raw inputs gathered from a document before any recognition runs.
struct Sources {
    native: String,
    images: Vec<DynamicImage>,
}

/// Converts documents to plain text.
pub struct TextNormalizer {
    min_text_length: usize,
    max_pages: usize,
    rotations: Vec<Rotation>,
    request: OcrRequest,
    preprocessor: ImagePreprocessor,
    ocr: Option<Arc<dyn OcrService>>,
}

impl TextNormalizer {
    /// Create a normalizer without an OCR backend.
    pub fn new(config: &FaktagConfig) -> Self {
        let mut rotations = Rotation::from_degrees_list(&config.ocr.rotations);
        if rotations.is_empty() {
            rotations.push(Rotation::Deg0);
        }

        Self {
            min_text_length: config.pdf.min_text_length,
            max_pages: config.pdf.max_pages,
            rotations,
            request: OcrRequest::from(&config.ocr),
            preprocessor: ImagePreprocessor::from_config(&config.ocr),
            ocr: None,
        }
    }

    /// Attach the OCR service used for scanned documents and images.
    pub fn with_ocr(mut self, service: Arc<dyn OcrService>) -> Self {
        self.ocr = Some(service);
        self
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    fn is_sufficient(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.min_text_length
    }

    /// Extract plain text from a document.
    pub async fn normalize(&self, doc: &RawDocument) -> Result<ExtractedText, ExtractionError> {
        let sources = self.gather(doc)?;

        for strategy in TextStrategy::ORDER {
            match strategy {
                TextStrategy::TextLayer => {
                    if self.is_sufficient(&sources.native) {
                        info!(
                            "Using native text layer ({} chars)",
                            sources.native.trim().len()
                        );
                        return Ok(ExtractedText::native(sources.native.trim()));
                    }
                }
                TextStrategy::Ocr => {
                    if let Some(text) = self.recognize_pages(&sources.images).await {
                        info!(
                            "Using OCR text ({} chars, confidence {:.3})",
                            text.text.len(),
                            text.confidence.unwrap_or_default()
                        );
                        return Ok(text);
                    }
                }
            }
        }

        if !sources.native.trim().is_empty() {
            debug!("OCR produced nothing, keeping short native text");
            return Ok(ExtractedText::native(sources.native.trim()));
        }

        Err(ExtractionError::NoText)
    }

    /// Decode the document once; page images are only extracted when the
    /// text layer is too short to use.
    fn gather(&self, doc: &RawDocument) -> Result<Sources, ExtractionError> {
        match doc.media_type {
            MediaType::Image => {
                let image = image::load_from_memory(&doc.bytes)
                    .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
                Ok(Sources {
                    native: String::new(),
                    images: vec![image],
                })
            }
            MediaType::Pdf => {
                let pdf = PdfExtractor::load(&doc.bytes)?.with_max_pages(self.max_pages);
                let native = pdf.extract_text().unwrap_or_else(|e| {
                    warn!("Text layer extraction failed: {}", e);
                    String::new()
                });
                debug!(
                    "PDF text layer: {} chars over {} pages",
                    native.trim().len(),
                    pdf.page_count()
                );

                let images = if self.is_sufficient(&native) || self.ocr.is_none() {
                    Vec::new()
                } else {
                    pdf.page_images()
                };

                Ok(Sources { native, images })
            }
        }
    }

    /// OCR every page image and join the per-page winners.
    async fn recognize_pages(&self, images: &[DynamicImage]) -> Option<ExtractedText> {
        let Some(service) = self.ocr.as_deref() else {
            if !images.is_empty() {
                warn!("Document needs OCR but no OCR service is configured");
            }
            return None;
        };

        let mut texts = Vec::new();
        let mut confidences = Vec::new();

        for (index, image) in images.iter().enumerate() {
            let binarized = self.preprocessor.binarize(image);
            match best_rotation(service, &binarized, &self.rotations, &self.request).await {
                Ok(Some(best)) => {
                    debug!(
                        "Page {}: rotation {}°, confidence {:.3}",
                        index + 1,
                        best.rotation.degrees(),
                        best.output.confidence
                    );
                    texts.push(best.output.text.trim().to_string());
                    confidences.push(best.output.confidence);
                }
                Ok(None) => debug!("Page {}: no text recognized", index + 1),
                Err(e) => warn!("Page {}: OCR failed: {}", index + 1, e),
            }
        }

        if texts.is_empty() {
            return None;
        }

        let confidence = confidences.iter().sum::<f32>() / confidences.len() as f32;
        Some(ExtractedText::ocr(texts.join("\n"), confidence))
    }
}
