//! Configuration structures for the tagging pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the faktag pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaktagConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR fallback configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Buyer verification weights and thresholds.
    pub verification: VerificationConfig,

    /// Category scoring weights and thresholds.
    pub classification: ClassificationConfig,

    /// Sequential number allocation.
    pub sequence: SequenceConfig,

    /// Persistent store location.
    pub store: StoreConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum trimmed text length to trust the embedded text layer.
    pub min_text_length: usize,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            max_pages: 10,
        }
    }
}

/// Page segmentation hint passed to the OCR service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegmentation {
    /// Let the engine decide.
    #[default]
    Auto,
    /// Treat the image as a single uniform block of text.
    SingleBlock,
    /// Sparse text, no particular order.
    Sparse,
}

/// OCR fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language hint passed to the OCR service.
    pub language: String,

    /// Page segmentation hint.
    pub page_segmentation: PageSegmentation,

    /// Rotations (degrees clockwise) tried for every page, in order.
    pub rotations: Vec<u16>,

    /// Lower clamp for the binarization threshold.
    pub threshold_min: u8,

    /// Upper clamp for the binarization threshold.
    pub threshold_max: u8,

    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "pol".to_string(),
            page_segmentation: PageSegmentation::Auto,
            rotations: vec![0, 90, 180, 270],
            threshold_min: 95,
            threshold_max: 225,
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Reject NIPs whose checksum digit does not match.
    pub validate_nip_checksum: bool,

    /// Number of leading lines scanned by header fallbacks.
    pub header_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate_nip_checksum: false,
            header_lines: 15,
        }
    }
}

/// Buyer verification weights and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Score contributed by a name pattern hit.
    pub name_weight: f32,

    /// Score contributed by an address pattern hit.
    pub address_weight: f32,

    /// Minimum rule score that yields a NIP suggestion.
    pub match_threshold: f32,

    /// Confidence reported for a match against stored buyers.
    pub stored_match_confidence: f32,

    /// Confidence reported when nothing matched.
    pub default_confidence: f32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.6,
            address_weight: 0.4,
            match_threshold: 0.6,
            stored_match_confidence: 0.8,
            default_confidence: 0.5,
        }
    }
}

/// Category scoring weights and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Points per keyword hit in the vendor name.
    pub vendor_weight: u32,

    /// Points per keyword hit in the full document text.
    pub text_weight: u32,

    /// Raw score that maps to confidence 1.0.
    pub confidence_divisor: f32,

    /// Minimum raw score for a category to count as detected.
    pub detection_floor: u32,

    /// Confidence above which a detection is assigned without asking.
    pub auto_assign_confidence: f32,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            vendor_weight: 10,
            text_weight: 3,
            confidence_divisor: 20.0,
            detection_floor: 5,
            auto_assign_confidence: 0.7,
        }
    }
}

/// Sequential number allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Compare-and-swap attempts before giving up with a conflict.
    pub max_attempts: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self { max_attempts: 16 }
    }
}

/// Persistent store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON store file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("faktag-store.json"),
        }
    }
}

impl FaktagConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "classification": { "auto_assign_confidence": 0.9 } }"#;
        let config: FaktagConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.classification.auto_assign_confidence, 0.9);
        assert_eq!(config.classification.detection_floor, 5);
        assert_eq!(config.pdf.min_text_length, 50);
        assert_eq!(config.ocr.rotations, vec![0, 90, 180, 270]);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FaktagConfig::default();
        config.sequence.max_attempts = 3;
        config.save(&path).unwrap();

        let loaded = FaktagConfig::from_file(&path).unwrap();
        assert_eq!(loaded.sequence.max_attempts, 3);
        assert_eq!(loaded.ocr.language, "pol");
    }
}
