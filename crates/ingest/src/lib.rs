//! Ingestion Pipeline
//!
//! The write path for sensor hardware: every incoming sample is persisted,
//! stale history is evicted, the unit's rolling average is recomputed, and
//! the result is checked against the unit's alarm thresholds.

mod pipeline;

pub use pipeline::{IngestionPipeline, RawSample, RETAINED_READINGS};

use storage::StorageError;
use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
