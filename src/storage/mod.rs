//! Storage module for persisting crawl state
//!
//! This module handles the checkpoint database:
//! - SQLite database initialization and schema management
//! - Frontier snapshots and per-URL outcomes
//! - Run tracking and resumption support
//! - The checkpoint cadence that ties the database to the output log

mod checkpoint;
mod schema;
mod sqlite;
mod traits;

pub use checkpoint::CheckpointManager;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;

/// Opens or creates the checkpoint database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a harvest run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// A committed checkpoint
#[derive(Debug, Clone)]
pub struct CheckpointRecord {
    pub run_id: i64,
    pub saved_at: String,
    /// Records in the output log when the checkpoint was taken
    pub records_total: u64,
}

/// Terminal state of one dequeued URL, waiting for the next checkpoint
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub url: String,
    pub state: PageState,
    pub records: usize,
    /// Status code, transport error text, or content type
    pub detail: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(url: impl Into<String>, state: PageState) -> Self {
        Self {
            url: url.into(),
            state,
            records: 0,
            detail: None,
            processed_at: Utc::now(),
        }
    }

    pub fn with_records(mut self, records: usize) -> Self {
        self.records = records;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Status of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
