//! Image preprocessing for OCR.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::models::config::OcrConfig;

/// Binarizes page images before recognition.
pub struct ImagePreprocessor {
    /// Lower clamp for the global threshold.
    threshold_min: u8,
    /// Upper clamp for the global threshold.
    threshold_max: u8,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&OcrConfig::default())
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            threshold_min: config.threshold_min.min(config.threshold_max),
            threshold_max: config.threshold_max.max(config.threshold_min),
        }
    }

    /// Set the clamp range of the global threshold.
    pub fn with_threshold_range(mut self, min: u8, max: u8) -> Self {
        self.threshold_min = min.min(max);
        self.threshold_max = max.max(min);
        self
    }

    /// Threshold for a grayscale image: its mean luminance, clamped.
    pub fn threshold(&self, gray: &GrayImage) -> u8 {
        let pixels = u64::from(gray.width()) * u64::from(gray.height());
        if pixels == 0 {
            return self.threshold_min;
        }

        let sum: u64 = gray.pixels().map(|p| u64::from(p[0])).sum();
        let mean = (sum / pixels) as u8;
        mean.clamp(self.threshold_min, self.threshold_max)
    }

    /// Convert to grayscale and map every pixel to black or white.
    pub fn binarize(&self, image: &DynamicImage) -> DynamicImage {
        let mut gray = image.to_luma8();
        let threshold = self.threshold(&gray);
        debug!(
            "Binarizing {}x{} image at threshold {}",
            gray.width(),
            gray.height(),
            threshold
        );

        for pixel in gray.pixels_mut() {
            *pixel = if pixel[0] > threshold { Luma([255]) } else { Luma([0]) };
        }

        DynamicImage::ImageLuma8(gray)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(values: &[u8], width: u32) -> GrayImage {
        GrayImage::from_raw(width, values.len() as u32 / width, values.to_vec()).unwrap()
    }

    #[test]
    fn test_threshold_is_clamped_mean() {
        let pre = ImagePreprocessor::new();
        assert_eq!(pre.threshold(&gray(&[100, 200, 150, 150], 2)), 150);
        assert_eq!(pre.threshold(&gray(&[0, 0, 0, 0], 2)), 95);
        assert_eq!(pre.threshold(&gray(&[255, 255, 255, 255], 2)), 225);
    }

    #[test]
    fn test_binarize_produces_two_levels() {
        let pre = ImagePreprocessor::new();
        let img = DynamicImage::ImageLuma8(gray(&[10, 140, 160, 250], 2));
        let out = pre.binarize(&img).to_luma8();

        let values: Vec<u8> = out.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_threshold_range_is_ordered() {
        let pre = ImagePreprocessor::new().with_threshold_range(200, 50);
        assert_eq!(pre.threshold(&gray(&[0], 1)), 50);
    }
}
