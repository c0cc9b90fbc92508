use pactum_core::RecordId;
use pactum_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit failed; the record is persisted in `rejected`.
    #[error("contract {id} rejected: {message}")]
    Rejected { id: RecordId, message: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
