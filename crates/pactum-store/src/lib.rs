//! Storage layer: contract record persistence (in-memory and JSON files)
//! and the sample corpus loader.

mod error;
pub use error::StoreError;

pub mod corpus;
mod file;
mod memory;
mod store;

pub use corpus::{DirectoryCorpus, SampleContract, SampleCorpus};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{ContractStore, RecordFilter};
