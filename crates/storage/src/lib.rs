//! Storage Layer
//!
//! Record types for readings, rolling-average snapshots, per-unit
//! configuration and user accounts, plus the store interfaces the rest of
//! the pipeline is written against. Ships an in-memory implementation;
//! anything matching the traits (a document database client, say) can be
//! swapped in without touching the pipeline.

mod memory;
mod records;
mod store;

pub use memory::MemoryStore;
pub use records::{AggregateSnapshot, Reading, UnitConfig, UserRecord};
pub use store::{AggregateStore, ConfigStore, ReadingStore, UserStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store error: {0}")]
    Backend(String),
    #[error("Record not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    Duplicate(String),
}
