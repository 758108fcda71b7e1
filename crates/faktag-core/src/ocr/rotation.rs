//! Multi-orientation recognition: OCR a page at several rotations and keep
//! the most confident reading.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OcrError;

use super::{OcrOutput, OcrRequest, OcrService};

/// Clockwise page rotation tried before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Default attempt order.
    pub const ALL: [Rotation; 4] = [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270];

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Parse a list of degrees, dropping anything that is not a right angle.
    pub fn from_degrees_list(degrees: &[u16]) -> Vec<Self> {
        let mut rotations = Vec::new();
        for rotation in degrees.iter().filter_map(|d| Self::from_degrees(*d)) {
            if !rotations.contains(&rotation) {
                rotations.push(rotation);
            }
        }
        rotations
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        match self {
            Rotation::Deg0 => image.clone(),
            Rotation::Deg90 => image.rotate90(),
            Rotation::Deg180 => image.rotate180(),
            Rotation::Deg270 => image.rotate270(),
        }
    }
}

/// One recognition attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationCandidate {
    pub rotation: Rotation,
    pub output: OcrOutput,
}

/// Pick the candidate with the strictly highest confidence.
///
/// Candidates without text never win; on equal confidence the earlier
/// candidate is kept.
pub fn select_best(candidates: Vec<RotationCandidate>) -> Option<RotationCandidate> {
    let mut best: Option<RotationCandidate> = None;

    for candidate in candidates.into_iter().filter(|c| !c.output.is_empty()) {
        let better = best
            .as_ref()
            .map_or(true, |current| candidate.output.confidence > current.output.confidence);
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Recognize `image` at every rotation and return the best reading.
///
/// A failing rotation is skipped. If every rotation fails, the last error is
/// returned; if all succeed without text, the result is `None`.
pub async fn best_rotation(
    service: &dyn OcrService,
    image: &DynamicImage,
    rotations: &[Rotation],
    request: &OcrRequest,
) -> Result<Option<RotationCandidate>, OcrError> {
    let mut candidates = Vec::with_capacity(rotations.len());
    let mut last_error = None;

    for rotation in rotations {
        let rotated = rotation.apply(image);
        match service.recognize(&rotated, request).await {
            Ok(output) => {
                debug!(
                    "Rotation {}°: confidence {:.3}, {} chars",
                    rotation.degrees(),
                    output.confidence,
                    output.text.len()
                );
                candidates.push(RotationCandidate {
                    rotation: *rotation,
                    output,
                });
            }
            Err(e) => {
                warn!("OCR failed at rotation {}°: {}", rotation.degrees(), e);
                last_error = Some(e);
            }
        }
    }

    if candidates.is_empty() {
        if let Some(e) = last_error {
            return Err(e);
        }
    }

    let best = select_best(candidates);
    if let Some(best) = &best {
        debug!(
            "Selected rotation {}° (confidence {:.3})",
            best.rotation.degrees(),
            best.output.confidence
        );
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{GenericImageView, RgbImage};

    fn candidate(rotation: Rotation, text: &str, confidence: f32) -> RotationCandidate {
        RotationCandidate {
            rotation,
            output: OcrOutput::new(text, confidence),
        }
    }

    #[test]
    fn test_highest_confidence_wins() {
        let best = select_best(vec![
            candidate(Rotation::Deg0, "a", 0.41),
            candidate(Rotation::Deg90, "b", 0.35),
            candidate(Rotation::Deg180, "c", 0.92),
            candidate(Rotation::Deg270, "d", 0.50),
        ])
        .unwrap();
        assert_eq!(best.rotation, Rotation::Deg180);
    }

    #[test]
    fn test_tie_keeps_earlier() {
        let best = select_best(vec![
            candidate(Rotation::Deg0, "a", 0.8),
            candidate(Rotation::Deg90, "b", 0.8),
        ])
        .unwrap();
        assert_eq!(best.rotation, Rotation::Deg0);
    }

    #[test]
    fn test_empty_text_never_wins() {
        let best = select_best(vec![
            candidate(Rotation::Deg0, "", 0.99),
            candidate(Rotation::Deg90, "text", 0.1),
        ])
        .unwrap();
        assert_eq!(best.rotation, Rotation::Deg90);
        assert!(select_best(vec![candidate(Rotation::Deg0, " ", 1.0)]).is_none());
    }

    #[test]
    fn test_degrees_list() {
        assert_eq!(
            Rotation::from_degrees_list(&[0, 90, 45, 450, 270]),
            vec![Rotation::Deg0, Rotation::Deg90, Rotation::Deg270]
        );
    }

    /// Scores each call by image width so only the 90° rotation of a tall
    /// image reads well.
    struct WidthScoredOcr;

    #[async_trait]
    impl OcrService for WidthScoredOcr {
        async fn recognize(
            &self,
            image: &DynamicImage,
            _request: &OcrRequest,
        ) -> Result<OcrOutput, OcrError> {
            let (w, h) = image.dimensions();
            Ok(OcrOutput::new(format!("{}x{}", w, h), w as f32 / (w + h) as f32))
        }
    }

    #[tokio::test]
    async fn test_best_rotation_picks_non_zero_orientation() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(10, 30));
        let request = OcrRequest::new("pol");

        let best = best_rotation(&WidthScoredOcr, &image, &Rotation::ALL, &request)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(best.rotation, Rotation::Deg90);
        assert_eq!(best.output.text, "30x10");
    }

    struct FailingOcr;

    #[async_trait]
    impl OcrService for FailingOcr {
        async fn recognize(
            &self,
            _image: &DynamicImage,
            _request: &OcrRequest,
        ) -> Result<OcrOutput, OcrError> {
            Err(OcrError::Recognition("engine offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_all_rotations_failing_is_an_error() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let result = best_rotation(&FailingOcr, &image, &Rotation::ALL, &OcrRequest::new("pol")).await;
        assert!(matches!(result, Err(OcrError::Recognition(_))));
    }
}
