//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::FrontierState;
use crate::state::PageState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CheckpointRecord, OutcomeRecord, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite checkpoint backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the checkpoint database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Checkpoints =====

    fn save_checkpoint(
        &mut self,
        run_id: i64,
        frontier: &FrontierState,
        outcomes: &[OutcomeRecord],
        records_total: u64,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM frontier_queue", [])?;
        {
            let mut visited = tx.prepare("INSERT OR IGNORE INTO frontier_visited (url) VALUES (?1)")?;
            for url in &frontier.visited {
                visited.execute(params![url])?;
            }

            let mut queue =
                tx.prepare("INSERT OR IGNORE INTO frontier_queue (position, url) VALUES (?1, ?2)")?;
            for (position, url) in frontier.queue.iter().enumerate() {
                queue.execute(params![position as i64, url])?;
            }

            let mut outcome = tx.prepare(
                "INSERT INTO page_outcomes (run_id, url, state, records, detail, processed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in outcomes {
                outcome.execute(params![
                    run_id,
                    record.url,
                    record.state.to_db_string(),
                    record.records as i64,
                    record.detail,
                    record.processed_at.to_rfc3339(),
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO checkpoints (run_id, saved_at, records_total) VALUES (?1, ?2, ?3)",
            params![run_id, Utc::now().to_rfc3339(), records_total as i64],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn load_frontier(&self) -> StorageResult<Option<FrontierState>> {
        if self.latest_checkpoint()?.is_none() {
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT url FROM frontier_visited ORDER BY url")?;
        let visited = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT url FROM frontier_queue ORDER BY position")?;
        let queue = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(FrontierState { visited, queue }))
    }

    fn latest_checkpoint(&self) -> StorageResult<Option<CheckpointRecord>> {
        let checkpoint = self
            .conn
            .query_row(
                "SELECT run_id, saved_at, records_total FROM checkpoints ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(CheckpointRecord {
                        run_id: row.get(0)?,
                        saved_at: row.get(1)?,
                        records_total: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .optional()?;

        Ok(checkpoint)
    }

    fn clear_checkpoint(&mut self) -> StorageResult<()> {
        self.conn.execute_batch(
            "
            BEGIN;
            DELETE FROM frontier_visited;
            DELETE FROM frontier_queue;
            DELETE FROM page_outcomes;
            DELETE FROM checkpoints;
            COMMIT;
        ",
        )?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_outcomes_by_state(&self) -> StorageResult<HashMap<PageState, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT state, COUNT(*) FROM page_outcomes GROUP BY state")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (state_str, count) = row?;
            let state = PageState::from_db_string(&state_str)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown state '{}'", state_str)))?;
            counts.insert(state, count as u64);
        }

        Ok(counts)
    }

    fn count_outcome_records(&self) -> StorageResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(records), 0) FROM page_outcomes",
            [],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }
}
