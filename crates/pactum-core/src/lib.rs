pub mod config;
pub mod duration;
pub mod facts;
pub mod record;
pub mod verdict;

pub use config::RuleConfig;
pub use duration::DurationParse;
pub use facts::{ContractFacts, ExtractionOutcome, Party};
pub use record::{ContractRecord, ContractStatus, HumanReview, RecordId, StatusError};
pub use verdict::{Issue, Severity, ValidationVerdict};
