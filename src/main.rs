//! Repair-Harvest main entry point
//!
//! This is the command-line interface for the Repair-Harvest dataset builder.

use anyhow::Context;
use clap::Parser;
use repair_harvest::config::{load_config_with_hash, Config};
use repair_harvest::crawler::{run_harvest, StopReason};
use repair_harvest::url::{normalize_url, UrlClassifier};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Repair-Harvest: a resumable support-article harvester
///
/// Repair-Harvest crawls technical-support sites, extracts structured repair
/// information from each article, and writes question/response training
/// records to a JSONL dataset. Interrupted runs resume from the last checkpoint.
#[derive(Parser, Debug)]
#[command(name = "repair-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable support-article harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard the checkpoint and dataset and start from the seeds
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "dedup"])]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "dedup"])]
    dry_run: bool,

    /// Show statistics from the checkpoint database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "dedup"])]
    stats: bool,

    /// Deduplicate the dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    dedup: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.dedup {
        handle_dedup(&config)
    } else {
        handle_harvest(config, &config_hash, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("repair_harvest=info,warn"),
            1 => EnvFilter::new("repair_harvest=debug,info"),
            2 => EnvFilter::new("repair_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let classifier = UrlClassifier::from_config(&config.frontier)?;

    println!("=== Repair-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max queue size: {}", config.crawler.max_queue_size);
    println!("  Max links per page: {}", config.crawler.max_links_per_page);
    println!("  Checkpoint interval: {} records", config.crawler.checkpoint_interval);
    println!("  Max records: {}", config.crawler.max_records);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nContent:");
    println!("  Min text length: {}", config.content.min_text_length);
    println!("  Quality threshold: {}", config.content.quality_threshold);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\nAllowed Domains ({}):", config.frontier.allowed_domains.len());
    for domain in &config.frontier.allowed_domains {
        println!("  - {}", domain);
    }

    println!(
        "\nPatterns: {} skip, {} priority",
        config.frontier.skip_patterns.len(),
        config.frontier.priority_patterns.len()
    );

    println!("\nSeeds ({}):", config.frontier.seeds.len());
    for seed in &config.frontier.seeds {
        let canonical = normalize_url(seed)?;
        let priority = classifier.priority_of(canonical.as_str());
        let note = if classifier.accepts(canonical.as_str()) {
            ""
        } else {
            " (not accepted for discovered links)"
        };
        println!("  * {} [{:?}]{}", canonical, priority, note);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the checkpoint database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use repair_harvest::output::{load_statistics, print_statistics};
    use repair_harvest::storage::open_storage;

    println!("Checkpoint: {}", config.output.checkpoint_path);
    println!("Dataset: {}\n", config.output.dataset_path);

    let storage = open_storage(Path::new(&config.output.checkpoint_path))?;
    let stats = load_statistics(&storage, Path::new(&config.output.dataset_path))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --dedup mode: runs only the final deduplication pass
fn handle_dedup(config: &Config) -> anyhow::Result<()> {
    use repair_harvest::output::deduplicate;

    let report = deduplicate(Path::new(&config.output.dataset_path))?;

    println!("Dataset: {}", config.output.dataset_path);
    println!("  Kept: {}", report.kept);
    println!("  Dropped: {}", report.dropped);
    println!("  Malformed: {}", report.malformed);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: &str, fresh: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Allowed domains: {}, seeds: {}",
        config.frontier.allowed_domains.len(),
        config.frontier.seeds.len()
    );

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Could not listen for Ctrl-C; the run can only end on its own");
            std::future::pending::<()>().await;
        }
        tracing::info!("Interrupt received");
    };

    let summary = run_harvest(config, config_hash, fresh, shutdown)
        .await
        .context("harvest failed")?;

    match summary.stop_reason {
        StopReason::Exhausted => tracing::info!("Frontier exhausted"),
        StopReason::RecordLimit => tracing::info!("Record limit reached"),
        StopReason::Interrupted => tracing::info!(
            "Interrupted; {} URLs queued for the next run",
            summary.queued
        ),
    }
    tracing::info!(
        "Run {}: {} URLs processed, {} records added, {} unique records kept",
        summary.run_id,
        summary.processed,
        summary.records_added,
        summary.dedup.kept
    );

    Ok(())
}
