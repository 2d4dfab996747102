//! Configuration module for Repair-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use repair_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Checkpoint every {} records", config.crawler.checkpoint_interval);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ContentConfig, CrawlerConfig, FrontierConfig, OutputConfig, UserAgentConfig,
};

#[cfg(test)]
pub(crate) use types::{default_priority_patterns, default_skip_patterns};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
