//! End-to-end harvest runs against a mock support site

use crate::common::{Site, Workspace};
use repair_harvest::content::{
    ContentNormalizer, DocumentTextExtractor, FallbackDocumentExtractor, NoDocumentSupport,
    ScraperTextExtractor,
};
use repair_harvest::crawler::{run_harvest, Coordinator, HttpFetchGate, StopReason};
use repair_harvest::output::{count_records, deduplicate};
use repair_harvest::state::PageState;
use repair_harvest::storage::{RunStatus, SqliteStorage, Storage};
use std::future::pending;

#[tokio::test]
async fn test_full_harvest() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (config, hash) = workspace.config();

    let summary = run_harvest(config, &hash, false, pending()).await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.processed, 6);
    assert_eq!(summary.records_added, 3);
    assert_eq!(summary.queued, 0);
    assert_eq!(summary.dedup.kept, 3);
    assert_eq!(summary.dedup.dropped, 0);

    let records = workspace.records();
    assert_eq!(records.len(), 3);

    let article = site.url("/support/kbdoc/1");
    for record in &records {
        assert!(!record["question"].as_str().unwrap().is_empty());
        assert!(!record["response"].as_str().unwrap().is_empty());
        assert_eq!(record["metadata"]["source_url"], article.as_str());
    }

    let content_types: Vec<&str> = records
        .iter()
        .map(|r| r["metadata"]["content_type"].as_str().unwrap())
        .collect();
    assert_eq!(content_types, vec!["full_article", "procedure", "tools_guide"]);
}

#[tokio::test]
async fn test_every_url_gets_one_outcome() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (config, hash) = workspace.config();

    run_harvest(config, &hash, false, pending()).await.unwrap();

    let storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
    let counts = storage.count_outcomes_by_state().unwrap();

    assert_eq!(counts.get(&PageState::TooShort), Some(&1));
    assert_eq!(counts.get(&PageState::Accepted), Some(&1));
    assert_eq!(counts.get(&PageState::Duplicate), Some(&1));
    assert_eq!(counts.get(&PageState::NotFound), Some(&1));
    assert_eq!(counts.get(&PageState::NoText), Some(&1));
    assert_eq!(counts.get(&PageState::ErrorPage), Some(&1));
    assert_eq!(counts.values().sum::<u64>(), 6);
    assert_eq!(storage.count_outcome_records().unwrap(), 3);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, hash);
}

#[tokio::test]
async fn test_skipped_links_never_requested() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (config, hash) = workspace.config();

    run_harvest(config, &hash, false, pending()).await.unwrap();

    let requested: Vec<String> = site
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();

    assert!(!requested.iter().any(|p| p == "/login"));
    assert!(!requested.iter().any(|p| p.ends_with(".png")));
    assert_eq!(
        requested.iter().filter(|p| *p == "/support/kbdoc/1").count(),
        2,
        "article fetched directly and once more through the redirect"
    );
}

#[tokio::test]
async fn test_priority_urls_served_first() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (config, hash) = workspace.config();

    run_harvest(config, &hash, false, pending()).await.unwrap();

    let requested: Vec<String> = site
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();

    let position = |path: &str| requested.iter().position(|p| p == path).unwrap();
    assert_eq!(position("/support/home"), 0);
    assert!(position("/support/kbdoc/gone") < position("/support/manual.pdf"));
    assert!(position("/support/kbdoc/gone") < position("/support/missing"));
}

#[tokio::test]
async fn test_rerun_after_completion_is_a_no_op() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);

    let (config, hash) = workspace.config();
    run_harvest(config, &hash, false, pending()).await.unwrap();

    let (config, hash) = workspace.config();
    let summary = run_harvest(config, &hash, false, pending()).await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.records_added, 0);
    assert_eq!(count_records(&workspace.dataset_path()).unwrap(), 3);
}

#[tokio::test]
async fn test_fresh_run_rebuilds_dataset() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);

    let (config, hash) = workspace.config();
    run_harvest(config, &hash, false, pending()).await.unwrap();

    let (config, hash) = workspace.config();
    let summary = run_harvest(config, &hash, true, pending()).await.unwrap();

    assert_eq!(summary.processed, 6);
    assert_eq!(summary.records_added, 3);
    assert_eq!(count_records(&workspace.dataset_path()).unwrap(), 3);
}

#[tokio::test]
async fn test_record_limit_stops_run() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (mut config, hash) = workspace.config();
    config.crawler.max_records = 1;

    let summary = run_harvest(config, &hash, false, pending()).await.unwrap();

    assert_eq!(summary.stop_reason, StopReason::RecordLimit);
    assert_eq!(summary.records_added, 3);
    assert!(summary.queued > 0);
    assert_eq!(count_records(&workspace.dataset_path()).unwrap(), 3);
}

#[tokio::test]
async fn test_dedup_after_duplicate_append() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (config, hash) = workspace.config();

    run_harvest(config, &hash, false, pending()).await.unwrap();

    // Simulate records written twice by a crash between flush and commit
    let path = workspace.dataset_path();
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, format!("{}{}", contents, contents)).unwrap();
    assert_eq!(count_records(&path).unwrap(), 6);

    let report = deduplicate(&path).unwrap();
    assert_eq!(report.kept, 3);
    assert_eq!(report.dropped, 3);
    assert_eq!(workspace.records().len(), 3);
}

/// Document backend that reads every PDF as the same repair manual
struct ManualText;

impl DocumentTextExtractor for ManualText {
    fn extract_text(&self, _bytes: &[u8]) -> Option<String> {
        Some(
            "Warning: disconnect power before replacing the battery on this Dell laptop. \
             Step 1: remove the back panel. Step 2: unscrew the battery with a screwdriver. \
             Step 3: lift the battery out of the chassis."
                .to_string(),
        )
    }
}

#[tokio::test]
async fn test_document_backend_turns_pdf_into_records() {
    let site = Site::start().await;
    let workspace = Workspace::new(&site);
    let (config, hash) = workspace.config();

    let gate = HttpFetchGate::from_config(&config.user_agent).unwrap();
    let documents = FallbackDocumentExtractor::new(vec![
        Box::new(NoDocumentSupport),
        Box::new(ManualText),
    ]);
    let normalizer = ContentNormalizer::new(
        Box::new(ScraperTextExtractor),
        Box::new(documents),
        config.content.min_text_length,
    );

    let mut coordinator = Coordinator::new(config, &hash, gate, false)
        .unwrap()
        .with_normalizer(normalizer);
    let summary = coordinator.run(pending()).await.unwrap();

    assert_eq!(summary.records_added, 6);
    assert_eq!(summary.dedup.kept + summary.dedup.dropped, 6);

    let storage = SqliteStorage::new(&workspace.checkpoint_path()).unwrap();
    let counts = storage.count_outcomes_by_state().unwrap();
    assert_eq!(counts.get(&PageState::Accepted), Some(&2));
    assert_eq!(counts.get(&PageState::NoText), None);

    let manual = site.url("/support/manual.pdf");
    assert!(workspace
        .records()
        .iter()
        .any(|r| r["metadata"]["source_url"] == manual.as_str()));
}
