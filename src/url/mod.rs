//! URL handling module for Repair-Harvest
//!
//! This module provides URL canonicalization, allow-list domain matching,
//! and the classifier that decides whether and how urgently a URL is crawled.

mod matcher;
mod normalize;

use crate::config::FrontierConfig;
use crate::ConfigError;
use regex::{Regex, RegexBuilder};
use url::Url;

// Re-export main functions
pub use matcher::matches_domain;
pub use normalize::normalize_url;

/// Scheduling class of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Matches a priority pattern; always served before normal URLs
    High,
    /// Everything else
    Normal,
}

/// Compiles case-insensitive URL patterns, reporting the first bad one
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidRegex {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Decides whether a URL may be crawled and which priority class it has
///
/// All three predicates are total over URL strings and perform no I/O.
/// Strings that do not parse as URLs are simply not allowed.
///
/// # Examples
///
/// ```
/// use repair_harvest::url::{Priority, UrlClassifier};
///
/// let classifier = UrlClassifier::new(
///     vec!["dell.com".to_string()],
///     &[r"/login".to_string()],
///     &[r"/kbdoc/".to_string()],
/// )
/// .unwrap();
///
/// assert!(classifier.is_allowed_domain("https://www.dell.com/support"));
/// assert!(classifier.should_skip("https://www.dell.com/login"));
/// assert_eq!(classifier.priority_of("https://www.dell.com/support/kbdoc/000123"), Priority::High);
/// ```
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    allowed_domains: Vec<String>,
    skip_patterns: Vec<Regex>,
    priority_patterns: Vec<Regex>,
}

impl UrlClassifier {
    /// Builds a classifier from raw domain and pattern lists
    pub fn new(
        allowed_domains: Vec<String>,
        skip_patterns: &[String],
        priority_patterns: &[String],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            skip_patterns: compile_patterns(skip_patterns)?,
            priority_patterns: compile_patterns(priority_patterns)?,
        })
    }

    /// Builds a classifier from the `[frontier]` configuration section
    pub fn from_config(config: &FrontierConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.allowed_domains.clone(),
            &config.skip_patterns,
            &config.priority_patterns,
        )
    }

    /// Returns true if the URL's host is one of the allowed domains or below one
    pub fn is_allowed_domain(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        else {
            return false;
        };

        self.allowed_domains
            .iter()
            .any(|allowed| matches_domain(allowed, &host))
    }

    /// Returns true if the URL matches any skip pattern
    pub fn should_skip(&self, url: &str) -> bool {
        self.skip_patterns.iter().any(|p| p.is_match(url))
    }

    /// Returns the URL's scheduling class
    pub fn priority_of(&self, url: &str) -> Priority {
        if self.priority_patterns.iter().any(|p| p.is_match(url)) {
            Priority::High
        } else {
            Priority::Normal
        }
    }

    /// Returns true if a discovered link should be offered to the frontier
    pub fn accepts(&self, url: &str) -> bool {
        self.is_allowed_domain(url) && !self.should_skip(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrontierConfig;

    fn create_test_classifier() -> UrlClassifier {
        let config = FrontierConfig {
            allowed_domains: vec![
                "dell.com".to_string(),
                "support.hp.com".to_string(),
                "ifixit.com".to_string(),
            ],
            seeds: vec!["https://www.dell.com/support/kbdoc/en-us".to_string()],
            skip_patterns: crate::config::default_skip_patterns(),
            priority_patterns: crate::config::default_priority_patterns(),
        };
        UrlClassifier::from_config(&config).unwrap()
    }

    #[test]
    fn test_allowed_domain() {
        let classifier = create_test_classifier();
        assert!(classifier.is_allowed_domain("https://www.dell.com/support/home"));
        assert!(classifier.is_allowed_domain("https://support.hp.com/us-en/document/c1"));
        assert!(classifier.is_allowed_domain("https://WWW.IFIXIT.COM/Guide/1"));
    }

    #[test]
    fn test_disallowed_domain() {
        let classifier = create_test_classifier();
        assert!(!classifier.is_allowed_domain("https://www.hp.com/us-en/shop"));
        assert!(!classifier.is_allowed_domain("https://example.org/dell.com"));
        assert!(!classifier.is_allowed_domain("not a url"));
    }

    #[test]
    fn test_skip_patterns() {
        let classifier = create_test_classifier();
        assert!(classifier.should_skip("https://www.dell.com/search?q=battery"));
        assert!(classifier.should_skip("https://www.dell.com/LOGIN"));
        assert!(classifier.should_skip("https://www.ifixit.com/cart"));
        assert!(classifier.should_skip("https://www.ifixit.com/images/board.PNG"));
        assert!(classifier.should_skip("https://www.ifixit.com/Guide/1#comments"));
        assert!(!classifier.should_skip("https://www.ifixit.com/Guide/Battery+Replacement/1"));
    }

    #[test]
    fn test_priority_patterns() {
        let classifier = create_test_classifier();
        assert_eq!(
            classifier.priority_of("https://www.dell.com/support/kbdoc/en-us/000123"),
            Priority::High
        );
        assert_eq!(
            classifier.priority_of("https://www.ifixit.com/device/MacBook"),
            Priority::High
        );
        assert_eq!(
            classifier.priority_of("https://www.dell.com/support/home"),
            Priority::Normal
        );
    }

    #[test]
    fn test_accepts_combines_domain_and_skip() {
        let classifier = create_test_classifier();
        assert!(classifier.accepts("https://www.dell.com/support/kbdoc/1"));
        assert!(!classifier.accepts("https://www.dell.com/login"));
        assert!(!classifier.accepts("https://www.reddit.com/r/techsupport"));
    }
}
