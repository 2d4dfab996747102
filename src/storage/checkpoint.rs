//! Checkpoint cadence
//!
//! The manager buffers per-URL outcomes and decides when the next checkpoint
//! is due. A checkpoint first appends buffered records to the output log, then
//! commits the frontier snapshot and outcomes in one transaction.

use crate::crawler::Frontier;
use crate::output::OutputLog;
use crate::storage::{OutcomeRecord, RunStatus, Storage};

/// Owns the checkpoint database for the duration of a run
pub struct CheckpointManager<S: Storage> {
    storage: S,
    run_id: i64,
    interval: usize,
    records_since_checkpoint: usize,
    pending_outcomes: Vec<OutcomeRecord>,
}

impl<S: Storage> CheckpointManager<S> {
    /// `interval` is the number of accepted records between checkpoints
    pub fn new(storage: S, run_id: i64, interval: usize) -> Self {
        Self {
            storage,
            run_id,
            interval: interval.max(1),
            records_since_checkpoint: 0,
            pending_outcomes: Vec::new(),
        }
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Buffers the terminal state of a dequeued URL
    pub fn record_outcome(&mut self, outcome: OutcomeRecord) {
        self.records_since_checkpoint += outcome.records;
        self.pending_outcomes.push(outcome);
    }

    /// Returns true once enough records accumulated since the last checkpoint
    pub fn is_due(&self) -> bool {
        self.records_since_checkpoint >= self.interval
    }

    /// Outcomes not yet committed
    pub fn pending_outcomes(&self) -> usize {
        self.pending_outcomes.len()
    }

    /// Flushes the log and commits the frontier and buffered outcomes
    pub fn checkpoint(&mut self, frontier: &Frontier, log: &mut OutputLog) -> crate::Result<()> {
        let flushed = log.flush()?;

        self.storage.save_checkpoint(
            self.run_id,
            &frontier.snapshot(),
            &self.pending_outcomes,
            log.total(),
        )?;

        tracing::info!(
            "Checkpoint: {} records flushed ({} total), {} queued, {} visited",
            flushed,
            log.total(),
            frontier.len(),
            frontier.visited_len()
        );

        self.pending_outcomes.clear();
        self.records_since_checkpoint = 0;
        Ok(())
    }

    /// Takes a last checkpoint and records how the run ended
    ///
    /// The run status is written even if the checkpoint fails, in which case
    /// the run is marked failed and the checkpoint error is returned.
    pub fn finalize(
        &mut self,
        frontier: &Frontier,
        log: &mut OutputLog,
        status: RunStatus,
    ) -> crate::Result<()> {
        match self.checkpoint(frontier, log) {
            Ok(()) => {
                self.storage.finish_run(self.run_id, status)?;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Final checkpoint failed: {}", e);
                if let Err(status_err) = self.storage.finish_run(self.run_id, RunStatus::Failed) {
                    tracing::error!("Could not mark run {} failed: {}", self.run_id, status_err);
                }
                Err(e)
            }
        }
    }

    /// Gives the storage back, e.g. for statistics after the run
    pub fn into_storage(self) -> S {
        self.storage
    }
}
