//! Content normalization: fetched bytes to clean plain text
//!
//! HTML goes through the not-found detector, then the markup extractor (with a
//! tag-stripping fallback), then cleaning. Binary documents go to the
//! [`DocumentTextExtractor`] collaborator. Every failure is a
//! [`Normalized::Rejected`] value, never an error.

mod document;
mod error_page;
mod text;

pub use document::{DocumentTextExtractor, FallbackDocumentExtractor, NoDocumentSupport};
pub use error_page::{is_error_markup, is_error_text};
pub use text::{clean_text, strip_tags, HtmlTextExtractor, ScraperTextExtractor};

use crate::crawler::ContentKind;
use crate::state::PageState;
use thiserror::Error;

/// Failures inside a text extraction collaborator
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("markup contains no visible text")]
    EmptyMarkup,

    #[error("extractor failed: {0}")]
    Backend(String),
}

/// Why a fetched document produced no text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Not-found boilerplate
    ErrorPage,
    /// Nothing could be extracted
    NoText,
    /// Cleaned text is shorter than the configured minimum
    TooShort,
}

impl From<RejectReason> for PageState {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::ErrorPage => PageState::ErrorPage,
            RejectReason::NoText => PageState::NoText,
            RejectReason::TooShort => PageState::TooShort,
        }
    }
}

/// Output of the content normalizer
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Text {
        /// Cleaned text: single spaces, allowed characters only, trimmed
        text: String,
        /// Markup title, or the first 200 characters of the text
        title: String,
    },
    Rejected(RejectReason),
}

/// Length of the title taken from the text when the markup has none
const FALLBACK_TITLE_CHARS: usize = 200;

/// Converts fetched bodies into clean text
pub struct ContentNormalizer {
    html: Box<dyn HtmlTextExtractor>,
    documents: Box<dyn DocumentTextExtractor>,
    min_text_length: usize,
}

impl ContentNormalizer {
    pub fn new(
        html: Box<dyn HtmlTextExtractor>,
        documents: Box<dyn DocumentTextExtractor>,
        min_text_length: usize,
    ) -> Self {
        Self {
            html,
            documents,
            min_text_length,
        }
    }

    /// Normalizer with the scraper extractor and no document backend
    pub fn with_defaults(min_text_length: usize) -> Self {
        Self::new(
            Box::new(ScraperTextExtractor),
            Box::new(NoDocumentSupport),
            min_text_length,
        )
    }

    /// Normalizes one successful fetch
    ///
    /// `markup_title` is the `<title>` already found during link discovery.
    pub fn normalize(
        &self,
        kind: ContentKind,
        body: &[u8],
        markup_title: Option<String>,
    ) -> Normalized {
        let raw = match kind {
            ContentKind::Pdf => match self.documents.extract_text(body) {
                Some(text) => text,
                None => return Normalized::Rejected(RejectReason::NoText),
            },
            ContentKind::Html => {
                let html = String::from_utf8_lossy(body);

                if is_error_markup(&html) {
                    return Normalized::Rejected(RejectReason::ErrorPage);
                }

                match self.html.extract(&html) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::debug!("Markup extraction failed ({}), stripping tags", e);
                        strip_tags(&html)
                    }
                }
            }
        };

        let text = clean_text(&raw);
        if text.is_empty() {
            return Normalized::Rejected(RejectReason::NoText);
        }

        if text.chars().count() < self.min_text_length {
            return Normalized::Rejected(RejectReason::TooShort);
        }

        if is_error_text(&text) {
            return Normalized::Rejected(RejectReason::ErrorPage);
        }

        let title = markup_title
            .map(|t| clean_text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| text.chars().take(FALLBACK_TITLE_CHARS).collect());

        Normalized::Text { text, title }
    }
}
