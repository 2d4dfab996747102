//! Markup-to-text conversion and text cleaning

use super::ExtractError;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Converts HTML markup into visible text
pub trait HtmlTextExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<String, ExtractError>;
}

/// Elements whose text is never visible
const IGNORE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// Elements that separate words when adjacent
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "td", "th", "table", "h1", "h2", "h3", "h4", "h5",
    "h6", "section", "article", "header", "footer", "nav", "aside", "main", "pre", "blockquote",
    "dd", "dt", "dl", "figcaption", "hr",
];

/// Walks the `<body>` of a parsed document and collects its text nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct ScraperTextExtractor;

impl HtmlTextExtractor for ScraperTextExtractor {
    fn extract(&self, html: &str) -> Result<String, ExtractError> {
        let document = Html::parse_document(html);

        let root = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next())
            .unwrap_or_else(|| document.root_element());

        let mut out = String::with_capacity(html.len() / 2);
        collect_text(root, &mut out);

        if out.trim().is_empty() {
            return Err(ExtractError::EmptyMarkup);
        }
        Ok(out)
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if IGNORE_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

static HIDDEN_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|template)\b[^>]*>.*?</(script|style|noscript|template)\s*>")
        .unwrap()
});
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,;:!?\-()\[\]"'/]"#).unwrap());

/// Naive tag stripper used when the markup parser yields nothing
///
/// Drops script/style blocks and comments, replaces every tag with a space and
/// decodes the handful of entities that matter for word boundaries.
pub fn strip_tags(html: &str) -> String {
    let without_hidden = HIDDEN_BLOCK_RE.replace_all(html, " ");
    let without_comments = COMMENT_RE.replace_all(&without_hidden, " ");
    let text = TAG_RE.replace_all(&without_comments, " ");

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Collapses whitespace, drops characters outside the allowed set, and trims
///
/// Word characters, whitespace and `. , ; : ! ? - ( ) [ ] " ' /` survive.
///
/// ```
/// use repair_harvest::content::clean_text;
///
/// assert_eq!(clean_text("  Replace   the\nbattery™ (CMOS)!  "), "Replace the battery (CMOS)!");
/// ```
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    DISALLOWED_CHARS_RE
        .replace_all(&collapsed, "")
        .trim()
        .to_string()
}
