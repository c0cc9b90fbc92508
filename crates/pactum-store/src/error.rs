use pactum_core::{RecordId, StatusError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("contract not found: {0}")]
    NotFound(RecordId),

    #[error("contract already exists: {0}")]
    Duplicate(RecordId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Status(#[from] StatusError),
}
