//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::crawler::FrontierState;
use crate::state::PageState;
use crate::storage::{CheckpointRecord, OutcomeRecord, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt checkpoint: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backend implementations
///
/// A checkpoint is committed as a whole: the frontier snapshot, the outcomes
/// buffered since the previous checkpoint and the record total either all
/// land or none do.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets a terminal status and the finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Checkpoints =====

    /// Atomically replaces the stored frontier and appends outcomes
    fn save_checkpoint(
        &mut self,
        run_id: i64,
        frontier: &FrontierState,
        outcomes: &[OutcomeRecord],
        records_total: u64,
    ) -> StorageResult<()>;

    /// Loads the stored frontier, or `None` if no checkpoint was ever saved
    fn load_frontier(&self) -> StorageResult<Option<FrontierState>>;

    /// Gets the most recent checkpoint
    fn latest_checkpoint(&self) -> StorageResult<Option<CheckpointRecord>>;

    /// Drops frontier, outcomes and checkpoints; run history is kept
    fn clear_checkpoint(&mut self) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts recorded outcomes per state
    fn count_outcomes_by_state(&self) -> StorageResult<HashMap<PageState, u64>>;

    /// Total records attributed to accepted URLs
    fn count_outcome_records(&self) -> StorageResult<u64>;
}
