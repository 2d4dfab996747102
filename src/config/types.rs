use serde::Deserialize;

/// Main configuration structure for Repair-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub frontier: FrontierConfig,
}

/// Crawl loop limits and cadence
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pending URLs; further enqueues are dropped
    #[serde(rename = "max-queue-size", default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Maximum number of discovered links enqueued from a single page
    #[serde(rename = "max-links-per-page", default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    /// Number of accepted records between checkpoints
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Stop once this many records exist in the dataset
    #[serde(rename = "max-records", default = "default_max_records")]
    pub max_records: usize,

    /// Pause after every fetch (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_queue_size: default_max_queue_size(),
            max_links_per_page: default_max_links_per_page(),
            checkpoint_interval: default_checkpoint_interval(),
            max_records: default_max_records(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

/// Content acceptance thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Minimum normalized text length (characters)
    #[serde(rename = "min-text-length", default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Documents scoring below this are discarded before synthesis
    #[serde(rename = "quality-threshold", default = "default_quality_threshold")]
    pub quality_threshold: f64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            quality_threshold: default_quality_threshold(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSONL dataset (one training record per line)
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,

    /// Path to the SQLite checkpoint database
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}

/// Which URLs are crawled and in what order
#[derive(Debug, Clone, Deserialize)]
pub struct FrontierConfig {
    /// Hosts that may be crawled (a host matches itself and its subdomains)
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// URLs the first run starts from
    pub seeds: Vec<String>,

    /// Case-insensitive regexes; a matching URL is never enqueued
    #[serde(rename = "skip-patterns", default = "default_skip_patterns")]
    pub skip_patterns: Vec<String>,

    /// Case-insensitive regexes; a matching URL is served before all others
    #[serde(rename = "priority-patterns", default = "default_priority_patterns")]
    pub priority_patterns: Vec<String>,
}

fn default_max_queue_size() -> usize {
    10_000
}

fn default_max_links_per_page() -> usize {
    100
}

fn default_checkpoint_interval() -> usize {
    100
}

fn default_max_records() -> usize {
    25_000
}

fn default_request_delay_ms() -> u64 {
    1_500
}

fn default_min_text_length() -> usize {
    100
}

fn default_quality_threshold() -> f64 {
    0.3
}

pub(crate) fn default_skip_patterns() -> Vec<String> {
    [
        r"/search",
        r"/login",
        r"/register",
        r"/cart",
        r"/checkout",
        r"\.jpg$|\.png$|\.gif$|\.svg$",
        r"#",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

pub(crate) fn default_priority_patterns() -> Vec<String> {
    [
        r"/kbdoc/",
        r"/document/",
        r"/solutions/",
        r"/troubleshoot/",
        r"/Device/",
        r"/questions/",
        r"/threads/",
        r"/thread/",
        r"/answer/",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}
