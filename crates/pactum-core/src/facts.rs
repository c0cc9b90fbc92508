//! Structured facts extracted from contract text.

use chrono::NaiveDate;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

/// Risk score assigned when nothing better is known.
pub const DEFAULT_RISK_SCORE: u8 = 50;

/// A contracting party as named in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    /// Role in the contract (e.g. "Seller", "Licensee"), when stated.
    pub role: Option<String>,
}

impl Party {
    pub fn new(name: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            name: name.into(),
            role: role.map(str::to_string),
        }
    }
}

/// Facts extracted from a single contract.
///
/// `risk_score` always lies in `1..=100`; use [`ContractFacts::with_risk_score`]
/// to set it from untrusted input. Deserialization refuses scores outside
/// that range and effective dates that are not `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFacts {
    #[serde(default)]
    pub parties: Vec<Party>,
    /// ISO 8601 date (`YYYY-MM-DD`).
    #[serde(default, deserialize_with = "iso_date")]
    pub effective_date: Option<String>,
    /// Whole months, floor semantics.
    pub duration_months: Option<u32>,
    /// Duration text exactly as it appears in the contract.
    pub duration_raw: Option<String>,
    pub jurisdiction: Option<String>,
    #[serde(default = "default_risk_score", deserialize_with = "risk_score")]
    pub risk_score: u8,
}

fn default_risk_score() -> u8 {
    DEFAULT_RISK_SCORE
}

fn risk_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let score = i64::deserialize(deserializer)?;
    match u8::try_from(score) {
        Ok(score @ 1..=100) => Ok(score),
        _ => Err(D::Error::custom(format!(
            "risk_score {score} is outside 1..=100"
        ))),
    }
}

fn iso_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let Some(date) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(_) => Ok(Some(date)),
        Err(_) => Err(D::Error::custom(format!(
            "effective_date {date:?} is not YYYY-MM-DD"
        ))),
    }
}

impl Default for ContractFacts {
    fn default() -> Self {
        Self {
            parties: Vec::new(),
            effective_date: None,
            duration_months: None,
            duration_raw: None,
            jurisdiction: None,
            risk_score: DEFAULT_RISK_SCORE,
        }
    }
}

impl ContractFacts {
    /// Set the risk score, clamping into `1..=100`.
    pub fn with_risk_score(mut self, score: i64) -> Self {
        self.risk_score = score.clamp(1, 100) as u8;
        self
    }

    /// Jurisdiction text, treating blank strings as absent.
    pub fn jurisdiction(&self) -> Option<&str> {
        self.jurisdiction
            .as_deref()
            .map(str::trim)
            .filter(|j| !j.is_empty())
    }

    /// Duration text, treating blank strings as absent.
    pub fn duration_raw(&self) -> Option<&str> {
        self.duration_raw
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Result of one extraction attempt.
///
/// `fallback` marks a failed extraction whose `facts` hold defaults; a model
/// may still report a confidence of `0.0` for facts it did produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub facts: ContractFacts,
    pub confidence: f64,
    #[serde(default)]
    pub fallback: bool,
}

impl ExtractionOutcome {
    pub fn new(facts: ContractFacts, confidence: f64) -> Self {
        Self {
            facts,
            confidence: confidence.clamp(0.0, 1.0),
            fallback: false,
        }
    }

    /// The all-default outcome used after any extraction failure.
    pub fn fallback() -> Self {
        Self {
            facts: ContractFacts::default(),
            confidence: 0.0,
            fallback: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}
