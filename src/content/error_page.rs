//! Not-found page detection
//!
//! Two independent checks. The markup check runs before text extraction and
//! needs two agreeing signals, so an article that mentions "404" once is not
//! thrown away. The text check runs after normalization and catches
//! boilerplate that survives extraction.

use crate::extract::ci;
use regex::Regex;
use std::sync::LazyLock;

/// Boilerplate phrase families of not-found pages
///
/// Each family counts once however many of its phrasings match, so a single
/// "Error 404 Page Not Found" is one signal. Two families reject the markup.
static NOT_FOUND_FAMILIES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b404\s*[-:|]?\s*(page\s+)?not\s+found|page\s+not\s+found|\berror\s+404\b",
        r"(we\s+)?(could\s*n['’]?t|could\s+not|can['’]?t|cannot)\s+find\s+(this|that|the)\s+page|sorry,?\s+(we\s+)?(can['’]?t|cannot|could\s*n['’]?t)\s+find",
        r"the\s+page\s+you\s+(are|were|['’]re)\s+looking\s+for|the\s+page\s+you\s+requested",
        r"page\s+(does\s*n['’]?t|does\s+not|no\s+longer)\s+exists?",
        r"(is|has been)\s+no\s+longer\s+available",
    ]
    .iter()
    .map(|p| ci(p))
    .collect()
});

/// The two canonical not-found phrases; both present rejects the markup
static CANONICAL_PAIR: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        ci(r"page\s+not\s+found"),
        ci(r"could\s*n['’]?t\s+find\s+this\s+page"),
    ]
});

/// Page-level phrases that mark a short text as a not-found page
const SHORT_TEXT_PHRASES: &[&str] = &[
    "page not found",
    "404 not found",
    "couldn't find this page",
    "couldn’t find this page",
    "could not find this page",
    "page you requested",
    "page you are looking for",
    "page does not exist",
    "page doesn't exist",
    "no longer available",
];

static TOKEN_404: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b404\b").unwrap());
static PAGE_NOT_FOUND: LazyLock<Regex> = LazyLock::new(|| ci(r"page\s+not\s+found"));

/// Texts shorter than this are checked for any not-found phrase
const SHORT_TEXT_CHARS: usize = 500;

/// Returns true if raw markup looks like a not-found page
///
/// ```
/// use repair_harvest::content::is_error_markup;
///
/// assert!(is_error_markup("<h2>404 - Page not found</h2><p>We couldn't find this page.</p>"));
/// assert!(!is_error_markup("<p>An HTTP 404 status means the server found nothing.</p>"));
/// assert!(!is_error_markup("<p>If the portal shows 404 Page Not Found, sign in again.</p>"));
/// ```
pub fn is_error_markup(html: &str) -> bool {
    let families = NOT_FOUND_FAMILIES
        .iter()
        .filter(|family| family.is_match(html))
        .count();

    families >= 2 || CANONICAL_PAIR.iter().all(|phrase| phrase.is_match(html))
}

/// Returns true if normalized text still reads as a not-found page
pub fn is_error_text(text: &str) -> bool {
    let lowered = text.to_lowercase();

    if lowered.chars().count() < SHORT_TEXT_CHARS
        && SHORT_TEXT_PHRASES.iter().any(|p| lowered.contains(p))
    {
        return true;
    }

    TOKEN_404.find_iter(&lowered).count() >= 2 || PAGE_NOT_FOUND.find_iter(&lowered).count() >= 2
}
