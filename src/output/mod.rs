//! Output module for the training dataset
//!
//! This module handles:
//! - The append-only JSONL log that training records are flushed to
//! - The final deduplication pass over that log
//! - Harvest statistics for `--stats`

mod dataset;
mod dedup;
pub mod stats;

pub use dataset::{count_records, truncate, OutputLog};
pub use dedup::{deduplicate, DedupReport, DEDUP_KEY_CHARS};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use thiserror::Error;

/// Errors writing or reading the dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
