//! Interrupted runs resume without losing or duplicating work

use crate::common::{read_records, Site, Workspace};
use async_trait::async_trait;
use repair_harvest::crawler::{
    run_harvest, Coordinator, FetchGate, FetchOutcome, HttpFetchGate, StopReason,
};
use repair_harvest::state::PageState;
use repair_harvest::storage::{RunStatus, SqliteStorage, Storage};
use std::collections::BTreeSet;
use std::future::pending;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Fetches over HTTP and fires the shutdown signal after `limit` fetches
struct InterruptAfter {
    inner: HttpFetchGate,
    limit: usize,
    fetched: AtomicUsize,
    trigger: Mutex<Option<oneshot::Sender<()>>>,
}

impl InterruptAfter {
    fn new(inner: HttpFetchGate, limit: usize) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let gate = Self {
            inner,
            limit,
            fetched: AtomicUsize::new(0),
            trigger: Mutex::new(Some(tx)),
        };
        (gate, rx)
    }
}

#[async_trait]
impl FetchGate for InterruptAfter {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let outcome = self.inner.fetch(url).await;
        if self.fetched.fetch_add(1, Ordering::SeqCst) + 1 == self.limit {
            if let Some(tx) = self.trigger.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }
        outcome
    }
}

async fn interrupted_run(workspace: &Workspace, limit: usize) -> repair_harvest::crawler::RunSummary {
    let (config, hash) = workspace.config();
    let http = HttpFetchGate::from_config(&config.user_agent).unwrap();
    let (gate, signal) = InterruptAfter::new(http, limit);

    let mut coordinator = Coordinator::new(config, &hash, gate, false).unwrap();
    coordinator
        .run(async move {
            let _ = signal.await;
        })
        .await
        .unwrap()
}

fn questions(records: &[serde_json::Value]) -> BTreeSet<String> {
    records
        .iter()
        .map(|r| r["question"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_interrupt_then_resume() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);

    let first = interrupted_run(&workspace, 1).await;
    assert_eq!(first.stop_reason, StopReason::Interrupted);
    assert_eq!(first.processed, 1);
    assert_eq!(first.records_added, 0);
    assert_eq!(first.queued, 5);

    {
        let storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
        let run = storage.get_run(first.run_id).unwrap();
        assert_eq!(run.status, RunStatus::Interrupted);

        let state = storage.load_frontier().unwrap().unwrap();
        assert_eq!(state.visited, vec![site.url("/support/home")]);
        assert_eq!(state.queue.len(), 5);
        assert_eq!(state.queue[0], site.url("/support/kbdoc/1"));
    }

    let (config, hash) = workspace.config();
    let second = run_harvest(config, &hash, false, pending()).await.unwrap();

    assert_eq!(second.stop_reason, StopReason::Exhausted);
    assert_eq!(second.processed, 5);
    assert_eq!(second.records_added, 3);

    let storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
    let counts = storage.count_outcomes_by_state().unwrap();
    assert_eq!(counts.values().sum::<u64>(), 6);
    assert_eq!(counts.get(&PageState::Accepted), Some(&1));
}

#[tokio::test]
async fn test_resumed_dataset_matches_uninterrupted_run() {
    let site = Site::start().await;

    let resumed = Workspace::new(&site);
    interrupted_run(&resumed, 2).await;
    let (config, hash) = resumed.config();
    run_harvest(config, &hash, false, pending()).await.unwrap();

    let straight = Workspace::new(&site);
    let (config, hash) = straight.config();
    run_harvest(config, &hash, false, pending()).await.unwrap();

    let resumed_records = resumed.records();
    let straight_records = read_records(&straight.dataset_path());

    assert_eq!(resumed_records.len(), 3);
    assert_eq!(questions(&resumed_records), questions(&straight_records));
}

#[tokio::test]
async fn test_records_survive_interrupt() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);

    // Home page, then the article
    let summary = interrupted_run(&workspace, 2).await;

    assert_eq!(summary.stop_reason, StopReason::Interrupted);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.records_added, 3);
    assert_eq!(workspace.records().len(), 3);

    let storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
    let checkpoint = storage.latest_checkpoint().unwrap().unwrap();
    assert_eq!(checkpoint.records_total, 3);
}

#[tokio::test]
async fn test_stale_running_run_is_marked_interrupted() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);

    let stale_id = {
        let mut storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
        storage.create_run("stale").unwrap()
    };

    let (config, hash) = workspace.config();
    run_harvest(config, &hash, false, pending()).await.unwrap();

    let storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
    assert_eq!(
        storage.get_run(stale_id).unwrap().status,
        RunStatus::Interrupted
    );
}
