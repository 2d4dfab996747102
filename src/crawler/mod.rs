//! Crawler module for fetching and processing support pages
//!
//! This module contains the core crawling logic, including:
//! - The priority-ordered, deduplicated frontier
//! - The fetch gate between the crawl loop and the network
//! - HTML link discovery
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{Coordinator, RunSummary, StopReason};
pub use fetcher::{build_http_client, fetch_url, ContentKind, FetchGate, FetchOutcome, HttpFetchGate};
pub use frontier::{EnqueueOutcome, Frontier, FrontierState};
pub use parser::{parse_html, ParsedPage};

use crate::config::Config;
use std::future::Future;

/// Runs a complete harvest over HTTP
///
/// This is the main entry point for starting a run. It will:
/// 1. Open the checkpoint database and dataset
/// 2. Restore the frontier, or seed it
/// 3. Fetch, extract and synthesize until done or interrupted
/// 4. Write the final checkpoint and deduplicate the dataset
///
/// # Example
///
/// ```no_run
/// use repair_harvest::config::load_config_with_hash;
/// use repair_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("harvest.toml"))?;
/// let shutdown = async {
///     let _ = tokio::signal::ctrl_c().await;
/// };
/// let summary = run_harvest(config, &hash, false, shutdown).await?;
/// println!("{} records added", summary.records_added);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest<F>(
    config: Config,
    config_hash: &str,
    fresh: bool,
    shutdown: F,
) -> crate::Result<RunSummary>
where
    F: Future<Output = ()>,
{
    let gate = HttpFetchGate::from_config(&config.user_agent)?;
    let mut coordinator = Coordinator::new(config, config_hash, gate, fresh)?;
    coordinator.run(shutdown).await
}
