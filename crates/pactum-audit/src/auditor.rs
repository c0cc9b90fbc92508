//! The audit pipeline.
//!
//! `pending -> processing -> {approved | requires_human_review | rejected}`.
//! The record is written to the store after intake, after extraction and at
//! the end, each time as a whole. A failure at any stage leaves it durably
//! `rejected` and surfaces [`AuditError::Rejected`] to the caller.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use pactum_ai::Extractor;
use pactum_core::{ContractFacts, ContractRecord, ContractStatus, Issue, RecordId, StatusError};
use pactum_rules::RuleEvaluator;
use pactum_store::{ContractStore, SampleContract, SampleCorpus, StoreError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::AuditError;
use crate::source::{PlainTextSource, SourceError, TextSource};

const DEFAULT_CONCURRENCY: usize = 4;

/// Caller-facing summary of one finished audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub id: RecordId,
    pub status: ContractStatus,
    pub facts: ContractFacts,
    pub confidence: f64,
    pub issues: Vec<Issue>,
    pub requires_human_review: bool,
    pub review_reasons: Vec<String>,
    pub processing_time_ms: u64,
}

impl From<&ContractRecord> for AuditReport {
    fn from(record: &ContractRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: record.status,
            facts: record.facts.clone().unwrap_or_default(),
            confidence: record.confidence.unwrap_or(0.0),
            issues: record.issues.clone(),
            requires_human_review: record.requires_human_review,
            review_reasons: record.review_reasons.clone(),
            processing_time_ms: record.processing_time_ms.unwrap_or(0),
        }
    }
}

/// Result for one sample in a batch.
#[derive(Debug)]
pub enum SampleOutcome {
    Audited(AuditReport),
    Failed {
        title: String,
        id: Option<RecordId>,
        error: String,
    },
}

/// Why a stage gave up; becomes the rejected record's system error.
#[derive(Debug, Error)]
enum StageError {
    #[error("document contains no extractable text")]
    EmptyText,
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Status(#[from] StatusError),
}

pub struct Auditor {
    extractor: Extractor,
    evaluator: RuleEvaluator,
    store: Arc<dyn ContractStore>,
    source: Arc<dyn TextSource>,
    concurrency: usize,
}

impl Auditor {
    pub fn new(extractor: Extractor, evaluator: RuleEvaluator, store: Arc<dyn ContractStore>) -> Self {
        Self {
            extractor,
            evaluator,
            store,
            source: Arc::new(PlainTextSource),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn TextSource>) -> Self {
        self.source = source;
        self
    }

    /// Number of samples audited at once by [`Auditor::audit_samples`].
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn ContractStore> {
        &self.store
    }

    /// Audit an uploaded document.
    pub async fn audit_document(&self, file_name: &str, bytes: &[u8]) -> Result<AuditReport, AuditError> {
        let mut record = ContractRecord::new(file_name, bytes.len(), self.source.mime_type());
        let text = self.source.extract_text(bytes);
        if let Ok(text) = &text {
            record.raw_text = Some(text.clone());
        }
        self.run(record, text.map_err(StageError::from)).await
    }

    /// Audit text that is already known (the sample path).
    pub async fn audit_text(&self, title: &str, text: &str) -> Result<AuditReport, AuditError> {
        let mut record = ContractRecord::new(title, text.len(), "text/plain");
        record.raw_text = Some(text.to_string());
        self.run(record, Ok(text.to_string())).await
    }

    async fn audit_sample(&self, sample: SampleContract) -> SampleOutcome {
        let mut record = ContractRecord::new(
            sample.title.as_str(),
            sample.source.as_ref().map_or(sample.text.len(), Vec::len),
            "text/plain",
        );
        record.raw_text = Some(sample.text.clone());
        match self.run(record, Ok(sample.text)).await {
            Ok(report) => SampleOutcome::Audited(report),
            Err(e) => {
                let id = match &e {
                    AuditError::Rejected { id, .. } => Some(id.clone()),
                    AuditError::Store(_) => None,
                };
                SampleOutcome::Failed {
                    title: sample.title,
                    id,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Audit up to `n` samples from `corpus`, one independent audit each.
    /// Outcomes come back in corpus order.
    pub async fn audit_samples(
        &self,
        corpus: &dyn SampleCorpus,
        n: usize,
    ) -> Result<Vec<SampleOutcome>, AuditError> {
        let samples = corpus.samples(n).await?;
        info!(count = samples.len(), concurrency = self.concurrency, "auditing samples");
        let outcomes: Vec<SampleOutcome> = stream::iter(samples)
            .map(|sample| self.audit_sample(sample))
            .buffered(self.concurrency)
            .collect()
            .await;
        Ok(outcomes)
    }

    async fn run(
        &self,
        mut record: ContractRecord,
        text: Result<String, StageError>,
    ) -> Result<AuditReport, AuditError> {
        record
            .begin_processing()
            .map_err(|e| AuditError::Rejected {
                id: record.id.clone(),
                message: e.to_string(),
            })?;
        self.store.create(&record).await?;
        info!(id = %record.id, file = %record.file_name, size = record.file_size, "contract received");

        let start = Instant::now();
        match self.stages(&mut record, text, start).await {
            Ok(()) => {
                info!(
                    id = %record.id,
                    status = %record.status,
                    issues = record.issues.len(),
                    elapsed_ms = record.processing_time_ms,
                    "audit complete"
                );
                Ok(AuditReport::from(&record))
            }
            Err(e) => {
                let message = e.to_string();
                warn!(id = %record.id, error = %message, "audit failed, rejecting contract");
                if let Err(status_err) = record.reject(&message) {
                    error!(id = %record.id, error = %status_err, "could not mark contract rejected");
                }
                record.processing_time_ms = Some(elapsed_ms(start));
                if let Err(store_err) = self.store.update(&record).await {
                    error!(id = %record.id, error = %store_err, "could not persist rejected contract");
                }
                Err(AuditError::Rejected {
                    id: record.id,
                    message,
                })
            }
        }
    }

    /// Extraction, validation and resolution. `record` only changes in
    /// `processing`, so a failure here can always be turned into `rejected`.
    async fn stages(
        &self,
        record: &mut ContractRecord,
        text: Result<String, StageError>,
        start: Instant,
    ) -> Result<(), StageError> {
        let text = text?;
        if text.trim().is_empty() {
            return Err(StageError::EmptyText);
        }

        let outcome = self.extractor.extract(&text).await;
        record.attach_extraction(&outcome);
        self.store.update(record).await?;

        let verdict = self.evaluator.evaluate(&outcome.facts).await;
        let mut resolved = record.clone();
        resolved.resolve(&verdict, elapsed_ms(start))?;
        self.store.update(&resolved).await?;
        *record = resolved;
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
