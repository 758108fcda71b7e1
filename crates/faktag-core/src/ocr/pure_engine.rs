//! Pure Rust OCR backend using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;

use super::{OcrOutput, OcrRequest, OcrService};

/// File names expected inside the model directory.
pub const DETECTION_MODEL: &str = "det.onnx";
pub const RECOGNITION_MODEL: &str = "latin_rec.onnx";
pub const DICTIONARY: &str = "latin_dict.txt";

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Inference runs on the calling task; the engine is serialized behind a
/// mutex so one instance can be shared across documents.
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join(DETECTION_MODEL);
        let rec_path = model_dir.join(RECOGNITION_MODEL);
        let dict_path = model_dir.join(DICTIONARY);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
        })
    }

    fn run(&self, image: &DynamicImage) -> Result<OcrOutput, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let engine = self
            .engine
            .lock()
            .map_err(|_| OcrError::Recognition("OCR engine lock poisoned".to_string()))?;
        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;
        drop(engine);

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        // Reading order: rows of ~20px from the top, then left to right
        let mut regions: Vec<(f64, f64, String, f32)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                (x, y, r.text.replace("[UNK]", " "), r.confidence)
            })
            .collect();
        regions.sort_by(|a, b| {
            let (row_a, row_b) = ((a.1 / 20.0) as i64, (b.1 / 20.0) as i64);
            row_a
                .cmp(&row_b)
                .then(a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        });

        let confidence = if regions.is_empty() {
            0.0
        } else {
            regions.iter().map(|r| r.3).sum::<f32>() / regions.len() as f32
        };
        let text = regions
            .iter()
            .map(|r| r.2.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} regions in {}ms, confidence {:.3}",
            regions.len(),
            start.elapsed().as_millis(),
            confidence
        );

        Ok(OcrOutput::new(text, confidence.clamp(0.0, 1.0)))
    }
}

#[async_trait]
impl OcrService for PureOcrEngine {
    async fn recognize(
        &self,
        image: &DynamicImage,
        request: &OcrRequest,
    ) -> Result<OcrOutput, OcrError> {
        // The latin model covers Polish; the hints only matter to other engines.
        debug!(
            "Recognizing with language={} segmentation={:?}",
            request.language, request.page_segmentation
        );
        self.run(image)
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}
