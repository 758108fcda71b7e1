//! Vendor category classification.
//!
//! Known vendors are resolved through fixed overrides. Everything else is
//! scored against the keyword catalog: hits in the vendor name weigh more
//! than hits in the body text.

pub mod catalog;

pub use catalog::{CATEGORIES, Category, CodeOption, GROUP_OPTIONS, MPK_OPTIONS, VENDOR_OVERRIDES, VendorOverride};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::ClassificationConfig;
use crate::models::invoice::CategoryCodes;
use crate::normalize::fold_text;

/// Result of classifying a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMatch {
    pub detected: bool,
    pub mpk_code: String,
    pub group_code: String,
    pub description: String,
    /// In [0, 1].
    pub confidence: f32,
}

impl CategoryMatch {
    /// Empty codes with zero confidence.
    pub fn not_detected() -> Self {
        Self {
            detected: false,
            mpk_code: String::new(),
            group_code: String::new(),
            description: String::new(),
            confidence: 0.0,
        }
    }

    /// Codes of a detected match.
    pub fn codes(&self) -> Option<CategoryCodes> {
        self.detected.then(|| {
            CategoryCodes::new(&self.mpk_code, &self.group_code).with_category(&self.description)
        })
    }
}

impl From<&VendorOverride> for CategoryMatch {
    fn from(o: &VendorOverride) -> Self {
        Self {
            detected: true,
            mpk_code: o.mpk.to_string(),
            group_code: o.group.to_string(),
            description: o.description.to_string(),
            confidence: 1.0,
        }
    }
}

/// Keyword scorer over [`CATEGORIES`].
pub struct Classifier {
    config: ClassificationConfig,
    /// Case-insensitive keyword matchers, parallel to `CATEGORIES`.
    matchers: Vec<Vec<Regex>>,
}

impl Classifier {
    pub fn new(config: &ClassificationConfig) -> Self {
        let matchers = CATEGORIES
            .iter()
            .map(|category| {
                category
                    .keywords
                    .iter()
                    .filter_map(|k| Regex::new(&format!("(?i){}", regex::escape(k))).ok())
                    .collect()
            })
            .collect();

        Self {
            config: config.clone(),
            matchers,
        }
    }

    /// Whether a match is confident enough to assign without asking.
    pub fn is_confident(&self, m: &CategoryMatch) -> bool {
        m.detected && m.confidence > self.config.auto_assign_confidence
    }

    /// Fixed codes for a recognized vendor.
    pub fn classify_vendor_specific(&self, vendor_name: &str) -> Option<CategoryMatch> {
        let folded = fold_text(vendor_name);
        if folded.is_empty() {
            return None;
        }

        let hit = VENDOR_OVERRIDES
            .iter()
            .find(|o| o.patterns.iter().all(|p| folded.contains(p)))?;

        debug!("Vendor override {:?} matched {}", hit.patterns, vendor_name);
        Some(CategoryMatch::from(hit))
    }

    /// Score every catalog category and return the best one.
    pub fn classify(&self, vendor_name: &str, full_text: &str) -> CategoryMatch {
        let mut best: Option<(usize, u32)> = None;

        for (index, matchers) in self.matchers.iter().enumerate() {
            let vendor_hits: usize = matchers.iter().map(|re| re.find_iter(vendor_name).count()).sum();
            let text_hits: usize = matchers.iter().map(|re| re.find_iter(full_text).count()).sum();

            let raw = vendor_hits as u32 * self.config.vendor_weight
                + text_hits as u32 * self.config.text_weight;

            if raw > 0 && best.is_none_or(|(_, top)| raw > top) {
                best = Some((index, raw));
            }
        }

        let Some((index, raw)) = best.filter(|(_, raw)| *raw >= self.config.detection_floor) else {
            debug!("No category reached the detection floor");
            return CategoryMatch::not_detected();
        };

        let category = &CATEGORIES[index];
        let confidence = (raw as f32 / self.config.confidence_divisor).min(1.0);
        debug!("Best category {} (raw {}, confidence {:.2})", category.id, raw, confidence);

        CategoryMatch {
            detected: true,
            mpk_code: category.mpk.to_string(),
            group_code: category.group.to_string(),
            description: category.name.to_string(),
            confidence,
        }
    }

    /// Override first, then keyword scoring.
    pub fn detect(&self, vendor_name: &str, full_text: &str) -> CategoryMatch {
        self.classify_vendor_specific(vendor_name)
            .unwrap_or_else(|| self.classify(vendor_name, full_text))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassificationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verizon_connect_override() {
        let classifier = Classifier::default();
        let m = classifier
            .classify_vendor_specific("Verizon Connect Poland Sp. z o.o.")
            .unwrap();

        assert!(m.detected);
        assert_eq!(m.mpk_code, "MPK730");
        assert_eq!(m.group_code, "7/4");
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_override_matches_inside_words() {
        let classifier = Classifier::default();
        let joined = classifier
            .classify_vendor_specific("VerizonConnect Polska Sp. z o.o.")
            .unwrap();
        assert_eq!(joined.mpk_code, "MPK730");
        assert_eq!(
            classifier.classify_vendor_specific("Orlenpaliwa Sp. z o.o.").map(|m| m.mpk_code),
            Some("MPK710".to_string())
        );
        assert_eq!(
            classifier.classify_vendor_specific("Circle K Polska").map(|m| m.group_code),
            Some("7/2".to_string())
        );
        assert!(classifier.classify_vendor_specific("Kowalczyk i Syn").is_none());
        assert!(classifier.classify_vendor_specific("").is_none());
    }

    #[test]
    fn test_vendor_hits_dominate() {
        let classifier = Classifier::default();
        let m = classifier.classify("Kancelaria Adwokat Nowak", "Faktura za usługi");

        // vendor: kancelaria + adwokat = 20, capped at 1.0
        assert!(m.detected);
        assert_eq!(m.mpk_code, "MPK190");
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn test_keywords_count_inside_words() {
        let classifier = Classifier::default();
        // "adwokat" is not in "adwokacka", "kancelaria" is
        let m = classifier.classify("Kancelaria Adwokacka", "");
        assert_eq!(m.mpk_code, "MPK190");
        assert!((m.confidence - 0.5).abs() < 1e-6);

        // "paliwo" also counts inside "paliwowe"
        let m = classifier.classify("Firma ABC", "Karty paliwowe, paliwo");
        assert_eq!(m.mpk_code, "MPK710");
        assert!((m.confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_text_only_scoring() {
        let classifier = Classifier::default();
        let m = classifier.classify("Firma ABC", "Paliwo ON, diesel 40 l");

        // paliwo + diesel in text = 6 -> 0.3
        assert!(m.detected);
        assert_eq!(m.mpk_code, "MPK710");
        assert!((m.confidence - 0.3).abs() < 1e-6);
        assert!(!classifier.is_confident(&m));
    }

    #[test]
    fn test_below_floor_is_not_detected() {
        let classifier = Classifier::default();
        let m = classifier.classify("Firma ABC", "jedna linia o paliwo");

        assert_eq!(m, CategoryMatch::not_detected());
        assert!(m.codes().is_none());
    }

    #[test]
    fn test_ties_go_to_catalog_order() {
        let classifier = Classifier::default();
        // "usługi" scores equally for admin-services and admin-services2
        let m = classifier.classify("Usługi", "");
        assert_eq!(m.mpk_code, "MPK121");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = Classifier::default();
        let text = "Monitoring GPS pojazdów, tracking floty, abonament";
        let first = classifier.classify("Flota Serwis", text);
        for _ in 0..5 {
            assert_eq!(classifier.classify("Flota Serwis", text), first);
        }
    }
}
