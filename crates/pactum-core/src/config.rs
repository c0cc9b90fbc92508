//! Business-rule thresholds and allow-lists.

use serde::{Deserialize, Serialize};

/// Tokens identifying a Chilean jurisdiction.
pub const CHILE_INDICATORS: &[&str] = &["chile", "santiago", "valparaiso", "concepcion", "chilean"];

/// Configuration for the business-rule evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Longest duration, in whole months, that may be auto-approved.
    pub max_duration_months: u32,
    /// Risk scores strictly above this require review.
    pub risk_threshold: u8,
    /// Display name of the accepted jurisdiction.
    pub jurisdiction_label: String,
    /// Lowercase substrings; a jurisdiction matching any of them is accepted.
    pub jurisdiction_allow_list: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_duration_months: 24,
            risk_threshold: 70,
            jurisdiction_label: "Chile".to_string(),
            jurisdiction_allow_list: CHILE_INDICATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RuleConfig {
    /// Replace the accepted jurisdiction and its indicator tokens.
    pub fn with_jurisdiction<I, S>(mut self, label: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.jurisdiction_label = label.to_string();
        self.jurisdiction_allow_list = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    /// Case-insensitive substring match against the allow-list.
    pub fn is_allowed_jurisdiction(&self, jurisdiction: &str) -> bool {
        let lower = jurisdiction.to_lowercase();
        self.jurisdiction_allow_list
            .iter()
            .any(|token| lower.contains(token.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chile_indicators_match_substrings() {
        let cfg = RuleConfig::default();
        assert!(cfg.is_allowed_jurisdiction("Santiago, Chile"));
        assert!(cfg.is_allowed_jurisdiction("Tribunales de VALPARAISO"));
        assert!(cfg.is_allowed_jurisdiction("Chilean law"));
        assert!(!cfg.is_allowed_jurisdiction("New York, USA"));
    }

    #[test]
    fn allow_list_is_swappable() {
        let cfg = RuleConfig::default().with_jurisdiction("Peru", [" Peru ", "Lima", ""]);
        assert_eq!(cfg.jurisdiction_allow_list, vec!["peru", "lima"]);
        assert!(cfg.is_allowed_jurisdiction("Lima, Peru"));
        assert!(!cfg.is_allowed_jurisdiction("Santiago, Chile"));
    }
}
