//! The contract record and its status lifecycle.
//!
//! ```text
//! pending ─► processing ─┬─► approved
//!                        ├─► requires_human_review ─► approved (human)
//!                        └─► rejected
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{ContractFacts, ExtractionOutcome, Issue, ValidationVerdict};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new() -> Self {
        RecordId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Pending,
    Processing,
    Approved,
    RequiresHumanReview,
    Rejected,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Approved,
        Self::RequiresHumanReview,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Approved => "approved",
            Self::RequiresHumanReview => "requires_human_review",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// No further automated transition leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Pending | Self::Processing => false,
            Self::Approved | Self::RequiresHumanReview | Self::Rejected => true,
        }
    }

    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        match (self, next) {
            (Pending, Processing) => true,
            (Processing, Approved | RequiresHumanReview | Rejected) => true,
            // Human approval after review.
            (RequiresHumanReview, Approved) => true,
            _ => false,
        }
    }

    pub fn transition(self, next: ContractStatus) -> Result<ContractStatus, StatusError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal status transition: {from} -> {to}")]
pub struct StatusError {
    pub from: ContractStatus,
    pub to: ContractStatus,
}

/// A human reviewer's correction of an audited record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanReview {
    pub facts: ContractFacts,
    pub human_approved: bool,
    pub reviewer_notes: Option<String>,
}

/// One contract moving through the audit pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub id: RecordId,
    pub file_name: String,
    pub file_size: usize,
    pub mime_type: String,
    pub raw_text: Option<String>,
    pub status: ContractStatus,
    pub facts: Option<ContractFacts>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub requires_human_review: bool,
    #[serde(default)]
    pub review_reasons: Vec<String>,
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub human_approved: bool,
    pub reviewer_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ContractRecord {
    /// A fresh record in `pending`.
    pub fn new(file_name: impl Into<String>, file_size: usize, mime_type: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            file_name: file_name.into(),
            file_size,
            mime_type: mime_type.into(),
            raw_text: None,
            status: ContractStatus::Pending,
            facts: None,
            confidence: None,
            issues: Vec::new(),
            requires_human_review: false,
            review_reasons: Vec::new(),
            processing_time_ms: None,
            human_approved: false,
            reviewer_notes: None,
            created_at: Utc::now(),
            processed_at: None,
            reviewed_at: None,
        }
    }

    fn move_to(&mut self, next: ContractStatus) -> Result<(), StatusError> {
        self.status = self.status.transition(next)?;
        debug!(id = %self.id, status = %self.status, "record status changed");
        Ok(())
    }

    pub fn begin_processing(&mut self) -> Result<(), StatusError> {
        self.move_to(ContractStatus::Processing)
    }

    pub fn attach_extraction(&mut self, outcome: &ExtractionOutcome) {
        self.facts = Some(outcome.facts.clone());
        self.confidence = Some(outcome.confidence);
    }

    /// Attach the verdict and settle on `approved` or `requires_human_review`.
    pub fn resolve(
        &mut self,
        verdict: &ValidationVerdict,
        processing_time_ms: u64,
    ) -> Result<(), StatusError> {
        let next = if verdict.requires_review {
            ContractStatus::RequiresHumanReview
        } else {
            ContractStatus::Approved
        };
        self.move_to(next)?;
        self.issues = verdict.issues.clone();
        self.requires_human_review = verdict.requires_review;
        self.review_reasons = verdict.review_reasons.clone();
        self.processing_time_ms = Some(processing_time_ms);
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Mark the audit as failed, replacing any issues with a single system error.
    pub fn reject(&mut self, message: &str) -> Result<(), StatusError> {
        self.move_to(ContractStatus::Rejected)?;
        self.issues = vec![Issue::system_error(message)];
        Ok(())
    }

    /// Only `requires_human_review` and `approved` records take a review.
    pub fn accepts_review(&self) -> bool {
        matches!(
            self.status,
            ContractStatus::RequiresHumanReview | ContractStatus::Approved
        )
    }

    /// Apply a reviewer's corrections; approval moves the record to `approved`.
    ///
    /// A record outside review is left untouched; the error names the refused move to `approved`.
    pub fn apply_review(&mut self, review: HumanReview) -> Result<(), StatusError> {
        if !self.accepts_review() {
            return Err(StatusError {
                from: self.status,
                to: ContractStatus::Approved,
            });
        }
        if review.human_approved && self.status != ContractStatus::Approved {
            self.move_to(ContractStatus::Approved)?;
            self.requires_human_review = false;
        }
        self.facts = Some(review.facts);
        self.human_approved = review.human_approved;
        self.reviewer_notes = review.reviewer_notes;
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }
}
