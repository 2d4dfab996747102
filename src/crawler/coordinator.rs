//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the single cooperative loop that drives a run:
//! - Restoring the frontier from the checkpoint database, or seeding it
//! - Fetching each dequeued URL through the fetch gate
//! - Normalizing, extracting, scoring and synthesizing records
//! - Feeding discovered links back into the frontier
//! - Checkpointing on cadence and unconditionally on the way out

use crate::config::Config;
use crate::content::{ContentNormalizer, Normalized};
use crate::crawler::{parse_html, ContentKind, EnqueueOutcome, FetchGate, FetchOutcome, Frontier};
use crate::extract::extract_fields;
use crate::output::{deduplicate, truncate, DedupReport, OutputLog};
use crate::quality::{quality_score, round_score};
use crate::state::PageState;
use crate::storage::{CheckpointManager, OutcomeRecord, RunStatus, SqliteStorage, Storage};
use crate::synth::{synthesize, SynthesisSettings};
use crate::url::{normalize_url, UrlClassifier};
use chrono::Utc;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Progress is logged every this many processed URLs
const PROGRESS_EVERY: usize = 25;

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No URL left in the frontier
    Exhausted,
    /// The dataset holds `max-records` records
    RecordLimit,
    /// The shutdown future resolved
    Interrupted,
}

impl StopReason {
    fn run_status(self) -> RunStatus {
        match self {
            Self::Exhausted | Self::RecordLimit => RunStatus::Completed,
            Self::Interrupted => RunStatus::Interrupted,
        }
    }
}

/// What a finished run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: i64,
    pub stop_reason: StopReason,
    /// URLs dequeued during this run
    pub processed: usize,
    /// Records synthesized during this run, before deduplication
    pub records_added: u64,
    pub dedup: DedupReport,
    /// URLs still waiting for a later run
    pub queued: usize,
}

/// Main harvest coordinator structure
pub struct Coordinator<G: FetchGate> {
    config: Arc<Config>,
    gate: G,
    classifier: Arc<UrlClassifier>,
    frontier: Frontier,
    normalizer: ContentNormalizer,
    synthesis: SynthesisSettings,
    log: OutputLog,
    checkpoints: CheckpointManager<SqliteStorage>,
    request_delay: Duration,
}

impl<G: FetchGate> Coordinator<G> {
    /// Opens the checkpoint database and output log and prepares the frontier
    ///
    /// With `fresh`, any stored frontier and outcomes are discarded and the
    /// dataset is truncated. Otherwise a stored frontier is restored, or the
    /// configured seeds are enqueued if none exists.
    pub fn new(config: Config, config_hash: &str, gate: G, fresh: bool) -> crate::Result<Self> {
        let classifier = Arc::new(UrlClassifier::from_config(&config.frontier)?);

        let dataset_path = Path::new(&config.output.dataset_path);
        let mut storage = SqliteStorage::new(Path::new(&config.output.checkpoint_path))?;

        if fresh {
            tracing::info!("Starting fresh: clearing checkpoint and dataset");
            storage.clear_checkpoint()?;
            truncate(dataset_path)?;
        }

        if let Some(previous) = storage.get_latest_run()? {
            if previous.status == RunStatus::Running {
                tracing::warn!(
                    "Run {} did not shut down cleanly; resuming from its last checkpoint",
                    previous.id
                );
                storage.finish_run(previous.id, RunStatus::Interrupted)?;
            }
            if !fresh && previous.config_hash != config_hash {
                tracing::warn!(
                    "Configuration changed since run {} (hash {} -> {})",
                    previous.id,
                    previous.config_hash,
                    config_hash
                );
            }
        }

        let max_queue_size = config.crawler.max_queue_size;
        let frontier = match storage.load_frontier()? {
            Some(state) => {
                let frontier = Frontier::restore(state, classifier.clone(), max_queue_size);
                tracing::info!(
                    "Resuming: {} URLs queued, {} already visited",
                    frontier.len(),
                    frontier.visited_len()
                );
                frontier
            }
            None => seed_frontier(&config, classifier.clone()),
        };

        let log = OutputLog::open(dataset_path)?;
        if log.total() > 0 {
            tracing::info!("Dataset already holds {} records", log.total());
        }

        let run_id = storage.create_run(config_hash)?;
        tracing::info!("Started run {}", run_id);

        Ok(Self {
            normalizer: ContentNormalizer::with_defaults(config.content.min_text_length),
            synthesis: SynthesisSettings::from(&config.content),
            checkpoints: CheckpointManager::new(
                storage,
                run_id,
                config.crawler.checkpoint_interval,
            ),
            request_delay: Duration::from_millis(config.crawler.request_delay_ms),
            config: Arc::new(config),
            gate,
            classifier,
            frontier,
            log,
        })
    }

    /// Replaces the content normalizer, e.g. to plug in a document backend
    pub fn with_normalizer(mut self, normalizer: ContentNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The frontier as it currently stands
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the harvest until the frontier is exhausted, the record limit is
    /// reached, or `shutdown` resolves
    ///
    /// Whatever ends the loop, buffered records and the frontier are written
    /// before this returns. The deduplication pass runs after every run that
    /// reached its final checkpoint.
    pub async fn run<F>(&mut self, shutdown: F) -> crate::Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let records_before = self.log.total();
        let mut processed = 0;

        let mut guard = FinalizeOnDrop::arm(self);
        let outcome = guard
            .coordinator
            .crawl_loop(shutdown.as_mut(), &mut processed)
            .await;
        guard.disarm();
        let this = &mut *guard.coordinator;

        let status = match &outcome {
            Ok(reason) => reason.run_status(),
            Err(_) => RunStatus::Failed,
        };
        let records_added = this.log.total().saturating_sub(records_before);

        tracing::info!("Run ending ({}), writing final checkpoint", status);
        let finalized = this.checkpoints.finalize(&this.frontier, &mut this.log, status);

        let stop_reason = outcome?;
        finalized?;

        let dedup = deduplicate(this.log.path())?;

        tracing::info!(
            "Run {} {}: {} URLs processed, {} records added, {} unique records in dataset",
            this.checkpoints.run_id(),
            status,
            processed,
            records_added,
            dedup.kept
        );

        Ok(RunSummary {
            run_id: this.checkpoints.run_id(),
            stop_reason,
            processed,
            records_added,
            dedup,
            queued: this.frontier.len(),
        })
    }

    async fn crawl_loop<F>(
        &mut self,
        mut shutdown: Pin<&mut F>,
        processed: &mut usize,
    ) -> crate::Result<StopReason>
    where
        F: Future<Output = ()>,
    {
        let max_records = self.config.crawler.max_records as u64;

        loop {
            if self.log.total() >= max_records {
                tracing::info!("Reached {} records, stopping", max_records);
                return Ok(StopReason::RecordLimit);
            }

            let Some(url) = self.frontier.peek().map(str::to_string) else {
                tracing::info!("Frontier exhausted");
                return Ok(StopReason::Exhausted);
            };

            // The URL stays queued until its fetch completes, so an interrupt
            // mid-fetch leaves it for the next run.
            let fetched = tokio::select! {
                biased;
                _ = &mut shutdown => return Ok(StopReason::Interrupted),
                outcome = self.gate.fetch(&url) => outcome,
            };

            let dequeued = self.frontier.next();
            debug_assert_eq!(dequeued.as_deref(), Some(url.as_str()));

            let outcome = self.process(&url, fetched);
            tracing::debug!(
                "{} -> {} ({} records)",
                outcome.url,
                outcome.state,
                outcome.records
            );
            self.checkpoints.record_outcome(outcome);
            *processed += 1;

            if *processed % PROGRESS_EVERY == 0 {
                tracing::info!(
                    "Progress: {} URLs processed, {} records, {} queued ({} priority)",
                    processed,
                    self.log.total(),
                    self.frontier.len(),
                    self.frontier.high_priority_len()
                );
            }

            if self.checkpoints.is_due() {
                self.checkpoints.checkpoint(&self.frontier, &mut self.log)?;
            }

            if !self.request_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => return Ok(StopReason::Interrupted),
                    _ = tokio::time::sleep(self.request_delay) => {}
                }
            }
        }
    }

    /// Turns one fetch outcome into the URL's terminal state
    fn process(&mut self, url: &str, fetched: FetchOutcome) -> OutcomeRecord {
        match fetched {
            FetchOutcome::NotFound => OutcomeRecord::new(url, PageState::NotFound),
            FetchOutcome::Blocked { status_code } => OutcomeRecord::new(url, PageState::Blocked)
                .with_detail(format!("HTTP {}", status_code)),
            FetchOutcome::TransportError { error } => {
                OutcomeRecord::new(url, PageState::TransportError).with_detail(error)
            }
            FetchOutcome::Skipped { content_type } => {
                OutcomeRecord::new(url, PageState::Skipped).with_detail(content_type)
            }
            FetchOutcome::Success {
                kind,
                body,
                final_url,
            } => self.process_document(url, kind, &body, &final_url),
        }
    }

    fn process_document(
        &mut self,
        url: &str,
        kind: ContentKind,
        body: &[u8],
        final_url: &str,
    ) -> OutcomeRecord {
        let source_url = match normalize_url(final_url) {
            Ok(canonical) => String::from(canonical),
            Err(_) => url.to_string(),
        };

        if source_url != url && !self.frontier.mark_visited(&source_url) {
            return OutcomeRecord::new(url, PageState::Duplicate)
                .with_detail(format!("redirected to {}", source_url));
        }

        let parsed = match kind {
            ContentKind::Html => {
                let base = Url::parse(&source_url).or_else(|_| Url::parse(url));
                base.ok()
                    .map(|base| parse_html(&String::from_utf8_lossy(body), &base))
            }
            ContentKind::Pdf => None,
        };

        let markup_title = parsed.as_ref().and_then(|p| p.title.clone());
        let outcome = match self.normalizer.normalize(kind, body, markup_title) {
            Normalized::Rejected(reason) => OutcomeRecord::new(url, reason.into()),
            Normalized::Text { text, title } => {
                let fields = extract_fields(&text, Some(&title));
                let records = synthesize(&text, &fields, &source_url, self.synthesis, Utc::now());

                if records.is_empty() {
                    let score = quality_score(&fields, text.chars().count());
                    OutcomeRecord::new(url, PageState::LowQuality)
                        .with_detail(format!("quality {:.2}", round_score(score)))
                } else {
                    let count = records.len();
                    self.log.extend(records);
                    OutcomeRecord::new(url, PageState::Accepted).with_records(count)
                }
            }
        };

        if let Some(parsed) = parsed {
            let queued = self.discover_links(&parsed.links);
            if queued > 0 {
                tracing::debug!("Queued {} new links from {}", queued, url);
            }
        }

        outcome
    }

    /// Offers discovered links to the frontier; returns how many were queued
    fn discover_links(&mut self, links: &[String]) -> usize {
        if self.log.total() >= self.config.crawler.max_records as u64 {
            return 0;
        }

        let max_links = self.config.crawler.max_links_per_page;
        let mut queued = 0;

        for link in links {
            if queued >= max_links {
                break;
            }

            let canonical = match normalize_url(link) {
                Ok(canonical) => String::from(canonical),
                Err(e) => {
                    tracing::trace!("Dropping link {}: {}", link, e);
                    continue;
                }
            };

            if !self.classifier.accepts(&canonical) {
                continue;
            }

            match self.frontier.enqueue(&canonical) {
                EnqueueOutcome::Queued(_) => queued += 1,
                EnqueueOutcome::QueueFull => {
                    tracing::debug!("Frontier full, dropping remaining links");
                    break;
                }
                EnqueueOutcome::AlreadyQueued | EnqueueOutcome::AlreadyVisited => {}
            }
        }

        queued
    }
}

/// Writes a last checkpoint if the crawl loop never returns normally
///
/// Covers a panic inside the loop and a `run` future dropped mid-crawl. The
/// run is then recorded as failed.
struct FinalizeOnDrop<'a, G: FetchGate> {
    coordinator: &'a mut Coordinator<G>,
    armed: bool,
}

impl<'a, G: FetchGate> FinalizeOnDrop<'a, G> {
    fn arm(coordinator: &'a mut Coordinator<G>) -> Self {
        Self {
            coordinator,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<G: FetchGate> Drop for FinalizeOnDrop<'_, G> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        tracing::error!("Crawl loop aborted, writing emergency checkpoint");
        let coordinator = &mut *self.coordinator;
        if let Err(e) = coordinator.checkpoints.finalize(
            &coordinator.frontier,
            &mut coordinator.log,
            RunStatus::Failed,
        ) {
            tracing::error!("Emergency checkpoint failed: {}", e);
        }
    }
}

/// Builds a frontier holding the configured seeds
fn seed_frontier(config: &Config, classifier: Arc<UrlClassifier>) -> Frontier {
    let mut frontier = Frontier::new(classifier, config.crawler.max_queue_size);

    for seed in &config.frontier.seeds {
        match normalize_url(seed) {
            Ok(canonical) => {
                frontier.enqueue(canonical.as_str());
            }
            Err(e) => tracing::warn!("Skipping seed {}: {}", seed, e),
        }
    }

    tracing::info!("Seeded frontier with {} URLs", frontier.len());
    frontier
}
