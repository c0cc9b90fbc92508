//! In-process store, mainly for tests and one-shot runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pactum_core::{ContractRecord, RecordId};

use crate::StoreError;
use crate::store::{ContractStore, RecordFilter, sort_newest_first};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<RecordId, ContractRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<RecordId, ContractRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ContractStore for MemoryStore {
    async fn create(&self, record: &ContractRecord) -> Result<(), StoreError> {
        let mut records = self.records();
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id.clone()));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &ContractRecord) -> Result<(), StoreError> {
        match self.records().get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id.clone())),
        }
    }

    async fn get(&self, id: &RecordId) -> Result<ContractRecord, StoreError> {
        self.records()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<ContractRecord>, StoreError> {
        let mut out: Vec<ContractRecord> = self
            .records()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.records()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use pactum_core::{ContractFacts, ContractStatus, HumanReview, ValidationVerdict};

    use super::*;

    fn resolved(name: &str, review: bool) -> ContractRecord {
        let mut record = ContractRecord::new(name, 10, "text/plain");
        record.begin_processing().unwrap();
        let mut verdict = ValidationVerdict::default();
        if review {
            verdict.push(pactum_core::Issue::system_error("x"), "reason".into());
        }
        record.resolve(&verdict, 5).unwrap();
        record
    }

    #[tokio::test]
    async fn create_get_update() {
        let store = MemoryStore::new();
        let mut record = ContractRecord::new("a.txt", 3, "text/plain");
        store.create(&record).await.unwrap();
        assert!(matches!(store.create(&record).await, Err(StoreError::Duplicate(_))));

        record.begin_processing().unwrap();
        store.update(&record).await.unwrap();
        let loaded = store.get(&record.id).await.unwrap();
        assert_eq!(loaded.status, ContractStatus::Processing);
    }

    #[tokio::test]
    async fn missing_records() {
        let store = MemoryStore::new();
        let ghost = ContractRecord::new("ghost.txt", 0, "text/plain");
        assert!(matches!(store.get(&ghost.id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.update(&ghost).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&ghost.id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_filters() {
        let store = MemoryStore::new();
        store.create(&resolved("ok.txt", false)).await.unwrap();
        store.create(&resolved("flagged.txt", true)).await.unwrap();
        store.create(&ContractRecord::new("new.txt", 1, "text/plain")).await.unwrap();

        assert_eq!(store.list(&RecordFilter::default()).await.unwrap().len(), 3);
        let flagged = store
            .list(&RecordFilter {
                requires_review: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].file_name, "flagged.txt");

        let pending = store
            .list(&RecordFilter {
                status: Some(ContractStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending[0].file_name, "new.txt");
    }

    #[tokio::test]
    async fn review_approves_flagged_record() {
        let store = MemoryStore::new();
        let record = resolved("flagged.txt", true);
        store.create(&record).await.unwrap();

        let review = HumanReview {
            facts: ContractFacts::default(),
            human_approved: true,
            reviewer_notes: Some("checked with legal".into()),
        };
        let updated = store.apply_review(&record.id, review).await.unwrap();
        assert_eq!(updated.status, ContractStatus::Approved);
        assert_eq!(store.get(&record.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn review_cannot_resurrect_rejected_record() {
        let store = MemoryStore::new();
        let mut record = ContractRecord::new("bad.txt", 0, "text/plain");
        record.begin_processing().unwrap();
        record.reject("empty document").unwrap();
        store.create(&record).await.unwrap();

        let review = HumanReview {
            facts: ContractFacts::default(),
            human_approved: true,
            reviewer_notes: None,
        };
        let err = store.apply_review(&record.id, review).await.unwrap_err();
        assert!(matches!(err, StoreError::Status(_)));
        assert_eq!(store.get(&record.id).await.unwrap().status, ContractStatus::Rejected);
    }
}
