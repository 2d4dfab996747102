//! Fetch gate: the boundary between the crawl loop and the network
//!
//! Every failure is turned into a [`FetchOutcome`] variant here. Nothing past
//! this boundary ever sees a `reqwest::Error`.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// What kind of document a successful fetch returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Pdf,
}

/// Result of fetching one URL
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Body retrieved
    Success {
        kind: ContentKind,
        body: Vec<u8>,
        /// URL after following redirects
        final_url: String,
    },

    /// HTTP 404 or 410
    NotFound,

    /// Any other HTTP status >= 400
    Blocked {
        status_code: u16,
    },

    /// Timeout, connection failure, or an interrupted body
    TransportError {
        error: String,
    },

    /// Fetched fine but not a document type we process
    Skipped {
        content_type: String,
    },
}

/// Anything that can turn a URL into a [`FetchOutcome`]
///
/// Implementations must never panic or return early with an error; every
/// failure is a variant of the outcome.
#[async_trait]
pub trait FetchGate: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use repair_harvest::config::UserAgentConfig;
/// use repair_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RepairHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`FetchGate`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetchGate {
    client: Client,
}

impl HttpFetchGate {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client for the configured user agent
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl FetchGate for HttpFetchGate {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies the response
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 404, 410 | `NotFound` |
/// | Other HTTP >= 400 | `Blocked` |
/// | Timeout, connection error, body read error | `TransportError` |
/// | `application/pdf` or a `.pdf` path | `Success { Pdf }` |
/// | HTML or missing Content-Type | `Success { Html }` |
/// | Anything else | `Skipped` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_transport_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return FetchOutcome::NotFound;
    }

    if status.is_client_error() || status.is_server_error() {
        return FetchOutcome::Blocked {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let Some(kind) = content_kind(&content_type, &final_url) else {
        return FetchOutcome::Skipped { content_type };
    };

    match response.bytes().await {
        Ok(body) => FetchOutcome::Success {
            kind,
            body: body.to_vec(),
            final_url,
        },
        Err(e) => classify_transport_error(&e),
    }
}

/// Decides how a response body is processed from its type and location
fn content_kind(content_type: &str, final_url: &str) -> Option<ContentKind> {
    let path_is_pdf = url::Url::parse(final_url)
        .map(|u| u.path().to_lowercase().ends_with(".pdf"))
        .unwrap_or(false);

    if content_type.contains("application/pdf") || path_is_pdf {
        Some(ContentKind::Pdf)
    } else if content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml")
    {
        Some(ContentKind::Html)
    } else {
        None
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchOutcome {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };

    FetchOutcome::TransportError { error }
}
