use async_trait::async_trait;
use pactum_core::{ContractRecord, ContractStatus, HumanReview, RecordId};

use crate::StoreError;

/// Criteria for [`ContractStore::list`]; `None` matches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub status: Option<ContractStatus>,
    pub requires_review: Option<bool>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ContractRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self
                .requires_review
                .is_none_or(|r| record.requires_human_review == r)
    }
}

/// Newest first; ties broken by id so listings are stable.
pub(crate) fn sort_newest_first(records: &mut [ContractRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.0.cmp(&b.id.0))
    });
}

/// Persistence for contract records.
///
/// Each call replaces whole records, so readers only ever see the state
/// before or after a pipeline stage.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id is taken.
    async fn create(&self, record: &ContractRecord) -> Result<(), StoreError>;

    /// Replace an existing record.
    async fn update(&self, record: &ContractRecord) -> Result<(), StoreError>;

    async fn get(&self, id: &RecordId) -> Result<ContractRecord, StoreError>;

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<ContractRecord>, StoreError>;

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Apply a reviewer's decision and persist the result.
    async fn apply_review(
        &self,
        id: &RecordId,
        review: HumanReview,
    ) -> Result<ContractRecord, StoreError> {
        let mut record = self.get(id).await?;
        record.apply_review(review)?;
        self.update(&record).await?;
        Ok(record)
    }
}
