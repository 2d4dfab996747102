//! Statistics from the checkpoint database and the dataset
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics for `--stats`.

use crate::output::count_records;
use crate::state::PageState;
use crate::storage::{CheckpointRecord, RunRecord, Storage};
use std::collections::HashMap;
use std::path::Path;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,

    /// Most recent checkpoint, if any
    pub latest_checkpoint: Option<CheckpointRecord>,

    /// URLs already processed
    pub visited: u64,

    /// URLs waiting in the frontier
    pub queued: u64,

    /// Count of processed URLs by terminal state
    pub outcomes_by_state: HashMap<PageState, u64>,

    /// Records attributed to accepted URLs
    pub records_synthesized: u64,

    /// Non-empty lines currently in the dataset
    pub records_in_dataset: u64,
}

impl HarvestStatistics {
    /// Total URLs with a recorded outcome
    pub fn total_outcomes(&self) -> u64 {
        self.outcomes_by_state.values().sum()
    }
}

/// Loads statistics from storage and the dataset file
pub fn load_statistics(
    storage: &dyn Storage,
    dataset_path: &Path,
) -> crate::Result<HarvestStatistics> {
    let (visited, queued) = match storage.load_frontier()? {
        Some(state) => (state.visited.len() as u64, state.queue.len() as u64),
        None => (0, 0),
    };

    Ok(HarvestStatistics {
        latest_run: storage.get_latest_run()?,
        latest_checkpoint: storage.latest_checkpoint()?,
        visited,
        queued,
        outcomes_by_state: storage.count_outcomes_by_state()?,
        records_synthesized: storage.count_outcome_records()?,
        records_in_dataset: count_records(dataset_path)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No runs recorded"),
    }
    if let Some(checkpoint) = &stats.latest_checkpoint {
        println!(
            "  Last checkpoint: {} ({} records)",
            checkpoint.saved_at, checkpoint.records_total
        );
    }
    println!();

    println!("Frontier:");
    println!("  Visited: {}", stats.visited);
    println!("  Queued: {}", stats.queued);
    println!();

    let total = stats.total_outcomes();
    println!("Outcomes by State:");
    let mut state_counts: Vec<_> = stats.outcomes_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.to_db_string().cmp(b.0.to_db_string())));

    for (state, count) in state_counts {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!("Records:");
    println!("  Synthesized: {}", stats.records_synthesized);
    println!("  In dataset: {}", stats.records_in_dataset);
    println!();

    let accepted = stats
        .outcomes_by_state
        .get(&PageState::Accepted)
        .copied()
        .unwrap_or(0);
    let acceptance_rate = if total > 0 {
        (accepted as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Acceptance Rate: {:.1}% ({} / {} URLs produced records)",
        acceptance_rate, accepted, total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FrontierState;
    use crate::storage::{OutcomeRecord, SqliteStorage};

    #[test]
    fn test_load_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("data.jsonl");
        std::fs::write(&dataset, "{}\n{}\n{}\n").unwrap();

        let mut storage = SqliteStorage::new(&dir.path().join("checkpoint.db")).unwrap();
        let run_id = storage.create_run("hash").unwrap();
        storage
            .save_checkpoint(
                run_id,
                &FrontierState {
                    visited: vec!["https://a.com/1".to_string(), "https://a.com/2".to_string()],
                    queue: vec!["https://a.com/3".to_string()],
                },
                &[
                    OutcomeRecord::new("https://a.com/1", PageState::Accepted).with_records(3),
                    OutcomeRecord::new("https://a.com/2", PageState::TooShort),
                ],
                3,
            )
            .unwrap();

        let stats = load_statistics(&storage, &dataset).unwrap();
        assert_eq!(stats.visited, 2);
        assert_eq!(stats.queued, 1);
        assert_eq!(stats.total_outcomes(), 2);
        assert_eq!(stats.records_synthesized, 3);
        assert_eq!(stats.records_in_dataset, 3);
        assert_eq!(stats.latest_run.map(|r| r.id), Some(run_id));
        assert_eq!(stats.latest_checkpoint.map(|c| c.records_total), Some(3));
    }

    #[test]
    fn test_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(&dir.path().join("checkpoint.db")).unwrap();

        let stats = load_statistics(&storage, &dir.path().join("missing.jsonl")).unwrap();
        assert!(stats.latest_run.is_none());
        assert_eq!(stats.visited, 0);
        assert_eq!(stats.total_outcomes(), 0);
        assert_eq!(stats.records_in_dataset, 0);
    }
}
