//! Audit orchestration: drives a contract from intake through extraction
//! and rule evaluation to its final disposition.

mod error;
pub use error::AuditError;

pub mod auditor;
pub mod source;

pub use auditor::{AuditReport, Auditor, SampleOutcome};
pub use source::{PlainTextSource, SourceError, TextSource};
