//! NIP (Polish Tax Identification Number) extraction and validation.

use super::patterns::{NIP_LABELED, NIP_STANDALONE, buyer_marker_position};
use super::{ExtractionMatch, FieldExtractor};

/// NIP field extractor.
///
/// Labeled matches (`NIP: ...`) come first with high confidence, followed by
/// bare 10-digit runs. Every value is normalized to exactly 10 digits.
pub struct NipExtractor {
    validate: bool,
}

impl NipExtractor {
    /// Create a new NIP extractor without checksum validation.
    pub fn new() -> Self {
        Self { validate: false }
    }

    /// Set whether to validate NIP checksums.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn accept(&self, nip: &str) -> bool {
        !self.validate || validate_nip(nip)
    }

    /// Labeled NIPs in document order.
    pub fn extract_labeled(&self, text: &str) -> Vec<ExtractionMatch<String>> {
        let mut results = Vec::new();

        for caps in NIP_LABELED.captures_iter(text) {
            let (Some(full), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            if let Some(nip) = normalize_nip(value.as_str()).filter(|n| self.accept(n)) {
                results.push(
                    ExtractionMatch::new(nip, 0.95, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        results
    }

    /// Standalone 10-digit runs in document order, deduplicated.
    pub fn extract_standalone(&self, text: &str) -> Vec<ExtractionMatch<String>> {
        let mut results: Vec<ExtractionMatch<String>> = Vec::new();

        for caps in NIP_STANDALONE.captures_iter(text) {
            let Some(full) = caps.get(0) else {
                continue;
            };

            let nip = format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4]);
            if results.iter().any(|r| r.value == nip) || !self.accept(&nip) {
                continue;
            }

            results.push(
                ExtractionMatch::new(nip, 0.7, full.as_str())
                    .with_position(full.start(), full.end()),
            );
        }

        results
    }

    /// Split the NIPs of a document into vendor and buyer.
    ///
    /// A labeled NIP before the buyer marker belongs to the vendor, the first
    /// one after it to the buyer. Bare 10-digit runs only fill the gaps.
    pub fn extract_parties(&self, text: &str) -> PartyNips {
        let marker = buyer_marker_position(text);
        let before_marker =
            |m: &ExtractionMatch<String>| match (marker, m.position) {
                (Some(pos), Some((start, _))) => start < pos,
                _ => true,
            };

        let labeled = self.extract_labeled(text);
        let mut vendor = match marker {
            Some(_) => labeled.iter().find(|m| before_marker(*m)),
            None => labeled.first(),
        }
        .map(|m| m.value.clone());

        let mut buyer = labeled
            .iter()
            .filter(|m| marker.is_none() || !before_marker(*m))
            .map(|m| m.value.clone())
            .find(|v| Some(v) != vendor.as_ref());

        if vendor.is_none() || buyer.is_none() {
            let runs = self.extract_standalone(text);

            if vendor.is_none() {
                vendor = runs
                    .iter()
                    .find(|m| before_marker(*m))
                    .or_else(|| runs.first())
                    .map(|m| m.value.clone())
                    .filter(|v| Some(v) != buyer.as_ref());
            }

            if buyer.is_none() && runs.len() > 1 {
                buyer = runs
                    .iter()
                    .filter(|m| marker.is_none() || !before_marker(*m))
                    .map(|m| m.value.clone())
                    .find(|v| Some(v) != vendor.as_ref());
            }
        }

        PartyNips { vendor, buyer }
    }
}

impl Default for NipExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NipExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = self.extract_labeled(text);

        for m in self.extract_standalone(text) {
            if !results.iter().any(|r| r.value == m.value) {
                results.push(m);
            }
        }

        results
    }
}

/// Vendor and buyer NIPs found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyNips {
    pub vendor: Option<String>,
    pub buyer: Option<String>,
}

/// Strip separators and accept only exactly 10 digits.
pub fn normalize_nip(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 10).then_some(digits)
}

/// Validate a Polish NIP using the checksum algorithm.
///
/// NIP format: 10 digits where the last digit is a checksum.
/// Weights: 6, 5, 7, 2, 3, 4, 5, 6, 7
pub fn validate_nip(nip: &str) -> bool {
    let digits: Vec<u32> = nip.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 10 {
        return false;
    }

    let weights = [6, 5, 7, 2, 3, 4, 5, 6, 7];
    let sum: u32 = digits
        .iter()
        .zip(weights.iter())
        .map(|(d, w)| d * w)
        .sum();

    let checksum = sum % 11;

    // A checksum of 10 is never issued
    checksum != 10 && checksum == digits[9]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nip() {
        assert!(validate_nip("5261040828"));
        assert!(validate_nip("526-104-08-28"));
        assert!(!validate_nip("1234567890"));
        assert!(!validate_nip("123456789"));
    }

    #[test]
    fn test_normalize_nip_separators() {
        assert_eq!(normalize_nip("123-456-78-90"), Some("1234567890".to_string()));
        assert_eq!(normalize_nip("098 765 43 21"), Some("0987654321".to_string()));
        assert_eq!(normalize_nip("12-34-56-78-90"), Some("1234567890".to_string()));
        assert_eq!(normalize_nip("123456789"), None);
        assert_eq!(normalize_nip("12345678901"), None);
    }

    #[test]
    fn test_labeled_nip_wrong_length_is_absent() {
        let extractor = NipExtractor::new();
        assert!(extractor.extract_labeled("NIP: 123-456-78-9").is_empty());
        assert!(extractor.extract_labeled("NIP: 123 456 78 901").is_empty());
    }

    #[test]
    fn test_vendor_and_buyer_split() {
        let text = "Sprzedawca: Acme Sp. z o.o.\nNIP: 123-456-78-90\nNabywca: Foo\nNIP: 098 765 43 21";
        let nips = NipExtractor::new().extract_parties(text);
        assert_eq!(nips.vendor.as_deref(), Some("1234567890"));
        assert_eq!(nips.buyer.as_deref(), Some("0987654321"));
    }

    #[test]
    fn test_only_buyer_section_has_nip() {
        let text = "Nabywca: Bar\nNIP: 0987654321";
        let nips = NipExtractor::new().extract_parties(text);
        assert_eq!(nips.vendor, None);
        assert_eq!(nips.buyer.as_deref(), Some("0987654321"));
    }

    #[test]
    fn test_standalone_fallback() {
        let extractor = NipExtractor::new();

        let single = extractor.extract_parties("Acme, 526-104-08-28, ul. Prosta 1");
        assert_eq!(single.vendor.as_deref(), Some("5261040828"));
        assert_eq!(single.buyer, None);

        let two = extractor.extract_parties("Acme 1234567890\nNabywca\nFoo 0987654321");
        assert_eq!(two.vendor.as_deref(), Some("1234567890"));
        assert_eq!(two.buyer.as_deref(), Some("0987654321"));
    }

    #[test]
    fn test_checksum_validation_filters() {
        let extractor = NipExtractor::new().with_validation(true);
        assert_eq!(
            NipExtractor::new().extract("NIP: 1234567890").map(|m| m.value),
            Some("1234567890".to_string())
        );
        assert!(extractor.extract("NIP: 1234567890").is_none());
        assert_eq!(
            extractor.extract("NIP: 526-104-08-28").map(|m| m.value),
            Some("5261040828".to_string())
        );
    }
}
