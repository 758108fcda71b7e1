//! Buyer identity verification.
//!
//! The extracted buyer NIP is cross-checked against an ordered table of
//! known buyers and then against buyer mappings confirmed earlier. When the
//! name or address points at a known buyer whose NIP differs, a correction
//! is suggested.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::VerificationConfig;
use crate::models::invoice::NAME_NOT_FOUND;
use crate::normalize::fold_text;
use crate::store::BuyerMapping;

/// A known buyer and the text that identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRule {
    pub nip: String,
    pub name_patterns: Vec<String>,
    pub address_patterns: Vec<String>,
}

impl VerificationRule {
    pub fn new(nip: impl Into<String>) -> Self {
        Self {
            nip: nip.into(),
            name_patterns: Vec::new(),
            address_patterns: Vec::new(),
        }
    }

    pub fn with_names(mut self, patterns: &[&str]) -> Self {
        self.name_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_addresses(mut self, patterns: &[&str]) -> Self {
        self.address_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// The built-in buyer table, evaluated in order.
pub fn default_rules() -> Vec<VerificationRule> {
    vec![
        VerificationRule::new("8522482321")
            .with_names(&["twój instalator", "twoj instalator", "piotr murawski"])
            .with_addresses(&["bohaterów warszawy", "bohaterow warszawy", "warszaw"]),
        VerificationRule::new("8522669232")
            .with_names(&["qborg", "qborg spółka", "qborg spolka"])
            .with_addresses(&["3 maja", "3maja", "maja 8"]),
    ]
}

/// What identified the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
    Nip,
    Name,
    Address,
}

/// Outcome of verifying a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Whether the extracted NIP can be trusted as-is.
    pub is_valid: bool,
    /// NIP of the buyer the name or address points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_nip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchedBy>,
    pub confidence: f32,
}

impl VerificationResult {
    fn unmatched(confidence: f32) -> Self {
        Self {
            is_valid: true,
            corrected_nip: None,
            matched_by: None,
            confidence,
        }
    }
}

/// Buyer identity verifier.
pub struct IdentityVerifier {
    rules: Vec<VerificationRule>,
    config: VerificationConfig,
}

impl IdentityVerifier {
    /// Create a verifier with the built-in rule table.
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            rules: default_rules(),
            config: config.clone(),
        }
    }

    /// Replace the rule table.
    pub fn with_rules(mut self, rules: Vec<VerificationRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[VerificationRule] {
        &self.rules
    }

    /// Minimum confidence at which a correction should be applied.
    pub fn threshold(&self) -> f32 {
        self.config.match_threshold
    }

    /// Verify a buyer against the rule table, then against `known` buyers.
    pub fn verify(
        &self,
        name: &str,
        nip: &str,
        address: Option<&str>,
        known: &[BuyerMapping],
    ) -> VerificationResult {
        let name = if name == NAME_NOT_FOUND {
            String::new()
        } else {
            fold_text(name)
        };
        let address = address.map(fold_text).unwrap_or_default();

        for rule in &self.rules {
            if nip == rule.nip {
                return VerificationResult {
                    is_valid: true,
                    corrected_nip: None,
                    matched_by: Some(MatchedBy::Nip),
                    confidence: 1.0,
                };
            }

            let mut score = 0.0;
            let mut matched_by = None;

            if any_pattern(&name, &rule.name_patterns) {
                score += self.config.name_weight;
                matched_by = Some(MatchedBy::Name);
            }

            if any_pattern(&address, &rule.address_patterns) {
                score += self.config.address_weight;
                matched_by.get_or_insert(MatchedBy::Address);
            }

            if score >= self.config.match_threshold {
                debug!("Buyer matches rule {} with score {:.2}", rule.nip, score);
                return VerificationResult {
                    is_valid: nip == rule.nip,
                    corrected_nip: Some(rule.nip.clone()),
                    matched_by,
                    confidence: score.min(1.0),
                };
            }
        }

        for stored in known {
            let stored_name = fold_text(&stored.name);
            let stored_address = fold_text(&stored.address);

            let matched_by = if overlaps(&name, &stored_name) {
                MatchedBy::Name
            } else if overlaps(&address, &stored_address) {
                MatchedBy::Address
            } else {
                continue;
            };

            debug!("Buyer matches stored mapping {} by {:?}", stored.nip, matched_by);
            return VerificationResult {
                is_valid: nip == stored.nip,
                corrected_nip: Some(stored.nip.clone()),
                matched_by: Some(matched_by),
                confidence: self.config.stored_match_confidence,
            };
        }

        VerificationResult::unmatched(self.config.default_confidence)
    }
}

fn any_pattern(haystack: &str, patterns: &[String]) -> bool {
    !haystack.is_empty()
        && patterns.iter().any(|p| {
            let p = fold_text(p);
            !p.is_empty() && haystack.contains(&p)
        })
}

/// Substring either way; empty strings never match.
fn overlaps(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> IdentityVerifier {
        IdentityVerifier::new(&VerificationConfig::default())
    }

    fn stored(nip: &str, name: &str, address: &str) -> BuyerMapping {
        BuyerMapping {
            nip: nip.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            created_at: 0,
            last_used: 0,
        }
    }

    #[test]
    fn test_exact_nip_short_circuits() {
        let result = verifier().verify("Ktokolwiek", "8522669232", None, &[]);
        assert!(result.is_valid);
        assert_eq!(result.matched_by, Some(MatchedBy::Nip));
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.corrected_nip, None);
    }

    #[test]
    fn test_name_match_suggests_correction() {
        let result = verifier().verify("TWÓJ INSTALATOR Piotr Murawski", "8522482312", None, &[]);
        assert!(!result.is_valid);
        assert_eq!(result.corrected_nip.as_deref(), Some("8522482321"));
        assert_eq!(result.matched_by, Some(MatchedBy::Name));
        assert!((result.confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_name_and_address_add_up() {
        let result = verifier().verify(
            "QBORG Spółka z o.o.",
            "1111111111",
            Some("ul. 3 Maja 8, 70-214 Szczecin"),
            &[],
        );
        assert_eq!(result.corrected_nip.as_deref(), Some("8522669232"));
        assert_eq!(result.matched_by, Some(MatchedBy::Name));
        assert!((result.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_address_alone_is_below_threshold() {
        let result = verifier().verify("Inna Firma", "1111111111", Some("ul. 3 Maja 8"), &[]);
        assert_eq!(result.corrected_nip, None);
        assert!(result.is_valid);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_stored_mapping_matches_either_way() {
        let known = [stored("5555555555", "Kowalski Budownictwo", "ul. Lipowa 3")];

        let by_name = verifier().verify("KOWALSKI BUDOWNICTWO SP. Z O.O.", "5555555550", None, &known);
        assert_eq!(by_name.corrected_nip.as_deref(), Some("5555555555"));
        assert_eq!(by_name.matched_by, Some(MatchedBy::Name));
        assert!((by_name.confidence - 0.8).abs() < 1e-6);

        let by_address = verifier().verify("Zupełnie inna", "5555555555", Some("Lipowa 3"), &known);
        assert!(by_address.is_valid);
        assert_eq!(by_address.matched_by, Some(MatchedBy::Address));
    }

    #[test]
    fn test_empty_values_never_match_stored() {
        let known = [stored("5555555555", "", "")];
        let result = verifier().verify(NAME_NOT_FOUND, "1234567890", Some(""), &known);
        assert_eq!(result.corrected_nip, None);
        assert!(result.is_valid);
    }

    #[test]
    fn test_custom_rules() {
        let rules = vec![VerificationRule::new("9999999999").with_names(&["acme"])];
        let result = verifier().with_rules(rules).verify("ACME Corp", "1", None, &[]);
        assert_eq!(result.corrected_nip.as_deref(), Some("9999999999"));
    }
}
