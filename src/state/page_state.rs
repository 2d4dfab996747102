/// Terminal outcome definitions for dequeued URLs
use std::fmt;

/// What happened to a URL once it left the frontier
///
/// A URL reaches exactly one of these states and is never queued again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Success =====
    /// At least one training record was synthesized
    Accepted,

    // ===== Fetch Failures =====
    /// HTTP 404 or 410
    NotFound,

    /// Any other HTTP status >= 400
    Blocked,

    /// Timeout, connection error, or interrupted body
    TransportError,

    /// Content type we do not process
    Skipped,

    // ===== Content Rejections =====
    /// Not-found boilerplate detected in markup or text
    ErrorPage,

    /// No text could be extracted
    NoText,

    /// Cleaned text below the minimum length
    TooShort,

    /// Quality score below the threshold, or no record could be built
    LowQuality,

    /// Redirected onto a URL that was already visited
    Duplicate,
}

impl PageState {
    /// Returns true if the URL produced records
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns true if the fetch gate reported a failure
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::NotFound | Self::Blocked | Self::TransportError)
    }

    /// Returns true if the page was fetched but its content was rejected
    pub fn is_rejected_content(&self) -> bool {
        matches!(
            self,
            Self::Skipped
                | Self::ErrorPage
                | Self::NoText
                | Self::TooShort
                | Self::LowQuality
                | Self::Duplicate
        )
    }

    /// Converts the page state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::NotFound => "not_found",
            Self::Blocked => "blocked",
            Self::TransportError => "transport_error",
            Self::Skipped => "skipped",
            Self::ErrorPage => "error_page",
            Self::NoText => "no_text",
            Self::TooShort => "too_short",
            Self::LowQuality => "low_quality",
            Self::Duplicate => "duplicate",
        }
    }

    /// Parses a page state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(Self::Accepted),
            "not_found" => Some(Self::NotFound),
            "blocked" => Some(Self::Blocked),
            "transport_error" => Some(Self::TransportError),
            "skipped" => Some(Self::Skipped),
            "error_page" => Some(Self::ErrorPage),
            "no_text" => Some(Self::NoText),
            "too_short" => Some(Self::TooShort),
            "low_quality" => Some(Self::LowQuality),
            "duplicate" => Some(Self::Duplicate),
            _ => None,
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Accepted,
            Self::NotFound,
            Self::Blocked,
            Self::TransportError,
            Self::Skipped,
            Self::ErrorPage,
            Self::NoText,
            Self::TooShort,
            Self::LowQuality,
            Self::Duplicate,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_partition_states() {
        for state in PageState::all_states() {
            let categories = [
                state.is_success(),
                state.is_fetch_failure(),
                state.is_rejected_content(),
            ];
            assert_eq!(
                categories.iter().filter(|c| **c).count(),
                1,
                "{:?} must be in exactly one category",
                state
            );
        }
    }

    #[test]
    fn test_fetch_failures() {
        assert!(PageState::NotFound.is_fetch_failure());
        assert!(PageState::Blocked.is_fetch_failure());
        assert!(PageState::TransportError.is_fetch_failure());
        assert!(!PageState::ErrorPage.is_fetch_failure());
    }

    #[test]
    fn test_to_db_string() {
        assert_eq!(PageState::Accepted.to_db_string(), "accepted");
        assert_eq!(PageState::NotFound.to_db_string(), "not_found");
        assert_eq!(PageState::TransportError.to_db_string(), "transport_error");
        assert_eq!(PageState::LowQuality.to_db_string(), "low_quality");
    }

    #[test]
    fn test_roundtrip_db_string() {
        for state in PageState::all_states() {
            let db_str = state.to_db_string();
            let parsed = PageState::from_db_string(db_str);
            assert_eq!(Some(state), parsed, "Failed roundtrip for {:?}", state);
        }
        assert_eq!(PageState::from_db_string("invalid"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::ErrorPage), "error_page");
        assert_eq!(format!("{}", PageState::Duplicate), "duplicate");
    }

    #[test]
    fn test_all_states_complete() {
        let all = PageState::all_states();
        assert_eq!(all.len(), 10);

        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j], "Duplicate state found");
            }
        }
    }
}
