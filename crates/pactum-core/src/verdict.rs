//! Validation issues and the aggregate review verdict.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

/// A single finding against an extracted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub field: String,
    pub rule: String,
    pub message: String,
    pub severity: Severity,
    pub reasoning: Option<String>,
}

impl Issue {
    /// The issue attached to a record whose audit failed outright.
    pub fn system_error(message: impl Into<String>) -> Self {
        Self {
            field: "processing".to_string(),
            rule: "system_error".to_string(),
            message: message.into(),
            severity: Severity::Critical,
            reasoning: None,
        }
    }
}

/// Outcome of running every business rule over one set of facts.
///
/// `requires_review` is true iff `review_reasons` is non-empty; build
/// verdicts through [`ValidationVerdict::push`] to keep that so.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub issues: Vec<Issue>,
    pub requires_review: bool,
    pub review_reasons: Vec<String>,
}

impl ValidationVerdict {
    /// Record an issue raised by a review-triggering rule.
    pub fn push(&mut self, issue: Issue, review_reason: String) {
        self.issues.push(issue);
        self.review_reasons.push(review_reason);
        self.requires_review = true;
    }
}
