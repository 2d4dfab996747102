//! Repair-Harvest: a resumable support-article harvester
//!
//! This crate crawls technical-support sites, turns each fetched document into
//! rule-extracted structured fields, and synthesizes question/response training
//! records from them. Crawl state is checkpointed so an interrupted run resumes
//! without losing or duplicating records.

pub mod config;
pub mod content;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod quality;
pub mod state;
pub mod storage;
pub mod synth;
pub mod url;

use thiserror::Error;

/// Main error type for Repair-Harvest operations
///
/// Only configuration and persistence problems surface here. Fetch failures,
/// rejected pages and extraction faults are ordinary outcomes of the crawl loop.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] output::DatasetError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Repair-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Frontier, FrontierState};
pub use extract::{extract_fields, StructuredFields};
pub use quality::quality_score;
pub use state::PageState;
pub use synth::{synthesize, ContentType, TrainingRecord};
pub use url::{normalize_url, Priority, UrlClassifier};
