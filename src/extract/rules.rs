//! Ordered rule tables for field extraction
//!
//! Table order is policy: for scalar fields the first rule that matches wins.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// A compiled pattern and the label it assigns
pub struct Rule {
    pub pattern: Regex,
    pub label: &'static str,
}

/// Compiles a built-in case-insensitive pattern
pub(crate) fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

fn table(rules: &[(&str, &'static str)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|&(pattern, label)| Rule {
            pattern: ci(pattern),
            label,
        })
        .collect()
}

fn patterns(list: &[&str]) -> Vec<Regex> {
    list.iter().map(|p| ci(p)).collect()
}

/// Returns the label of the first rule matching `text`
pub fn first_label(rules: &[Rule], text: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.label)
}

pub static BRAND_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    table(&[
        (r"\bdell\b", "dell"),
        (r"\b(hp|hewlett.?packard)\b", "hp"),
        (r"\blenovo\b", "lenovo"),
        (r"\b(apple|macbook|imac|ipad)\b", "apple"),
        (r"\bmicrosoft\b", "microsoft"),
        (r"\basus\b", "asus"),
        (r"\bacer\b", "acer"),
        (r"\bsamsung\b", "samsung"),
        (r"\btoshiba\b", "toshiba"),
    ])
});

pub static DEVICE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    table(&[
        (r"\b(laptop|notebook|ultrabook)\b", "laptop"),
        (r"\b(desktop|pc|computer)\b", "desktop"),
        (r"\b(tablet|ipad|surface)\b", "tablet"),
        (r"\b(server|workstation)\b", "server"),
    ])
});

pub static COMPONENT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    table(&[
        (r"\b(battery|power supply|charger)\b", "battery"),
        (r"\b(screen|display|monitor|lcd)\b", "display"),
        (r"\b(keyboard|keypad)\b", "keyboard"),
        (r"\b(touchpad|trackpad|mouse)\b", "input device"),
        (r"\b(motherboard|mainboard)\b", "motherboard"),
        (r"\b(hard drive|hdd|ssd|storage)\b", "storage"),
        (r"\b(ram|memory)\b", "memory"),
        (r"\b(cpu|processor)\b", "processor"),
        (r"\b(gpu|graphics card|video card)\b", "graphics"),
        (r"\b(wifi|wireless|network card)\b", "network"),
        (r"\b(fan|cooling|heatsink)\b", "cooling"),
        (r"\b(port|usb|hdmi|connector)\b", "ports"),
    ])
});

/// Product-line patterns; the matched text itself becomes the model
pub static MODEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"\b(latitude|inspiron|vostro|precision|xps|alienware)\s+m?\d{2,5}[a-z]?\b",
        r"\b(thinkpad|ideapad|thinkcentre|thinkbook|yoga|legion)\s+[a-z]?\d{1,4}[a-z]?\b",
        r"\b(elitebook|probook|pavilion|envy|spectre|omen|zbook)\s+[a-z]?\d{2,5}[a-z]?\b",
        r"\bmacbook\s+(pro|air)\b",
        r"\b(imac|mac\s+mini|mac\s+pro)\b",
        r"\bipad\s+(pro|air|mini)\b",
        r"\bsurface\s+(pro|laptop|book|go)(\s+\d{1,2})?\b",
        r"\b(zenbook|vivobook|rog\s+strix|tuf\s+gaming)\s+[a-z]{0,2}\d{2,5}[a-z]?\b",
        r"\b(aspire|swift|nitro|predator)\s+[a-z]?\d{1,4}\b",
        r"\bgalaxy\s+book\s*\d?\b",
        r"\b(satellite|tecra|portege)\s+[a-z]?\d{2,4}[a-z]?\b",
    ])
});

/// Symptom keywords in priority order; substring match on lower-cased text
pub const SYMPTOM_KEYWORDS: &[&str] = &[
    "won't boot",
    "not turning on",
    "black screen",
    "blue screen",
    "crash",
    "freeze",
    "slow",
    "overheating",
    "no power",
    "battery not charging",
    "keyboard not working",
    "touchpad not working",
    "wifi not working",
    "sound not working",
    "display issues",
    "error message",
];

/// Tool families; every alternative that matches is collected
pub static TOOL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"\b(screwdriver|phillips|flathead|torx|hex)\b",
        r"\b(multimeter|voltmeter|ohmmeter)\b",
        r"\b(thermal paste|thermal compound)\b",
        r"\b(spudger|pry tool|opening tool)\b",
        r"\b(soldering iron|solder)\b",
        r"\b(compressed air|air duster)\b",
        r"\b(antistatic|esd|wrist strap)\b",
        r"\b(tweezers|forceps)\b",
        r"\b(flashlight|torch)\b",
        r"\b(cleaning solution|isopropyl alcohol)\b",
    ])
});

/// Safety keywords; each hit contributes the first sentence containing it
pub const SAFETY_KEYWORDS: &[&str] = &[
    "warning",
    "caution",
    "danger",
    "hazard",
    "electrical shock",
    "battery explosion",
    "fire risk",
    "toxic",
    "disconnect power",
    "unplug",
    "discharge",
    "electrostatic",
    "esd",
    "high voltage",
];

/// Error-code families; the last capture group of each match is the code
///
/// The generic `error code: X` family only accepts a code containing a digit,
/// so "error: DISK" or "error number FAILED" yield nothing. Pages that name
/// errors only in words therefore score one point lower than under an
/// any-token capture.
pub static ERROR_CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"error\s+(code|number)?\s*:?\s*([A-Z0-9\-]*\d[A-Z0-9\-]*)",
        r"([A-Z]{2,}\d{4,})",
        r"(0x[0-9A-F]{4,})",
        r"(\d{4,})",
    ])
});

pub static BEGINNER_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| patterns(&[r"\bsimple\b", r"\beasy\b", r"\bquick\b", r"\bbasic\b"]));

pub static INTERMEDIATE_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| patterns(&[r"\bmoderate\b", r"\bstandard\b", r"\bnormal\b"]));

pub static EXPERT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"\badvanced\b",
        r"\bcomplex\b",
        r"\bdifficult\b",
        r"\brequires\s+experience\b",
        r"\bexpert\b",
        r"\bsoldering\b",
        r"\bcircuit\b",
    ])
});

pub static STEP_MARKER: LazyLock<Regex> = LazyLock::new(|| ci(r"step\s+\d+"));

/// Procedure-shaped fragments, each ending at the next sentence terminator
pub static PROCEDURE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"step\s+\d+[:\-]?\s*[^.!?\n]+",
        r"\d+[.)]\s*[^.!?\n]+",
        r"procedure[:\-]?\s*[^.!?\n]+",
        r"instructions?[:\-]?\s*[^.!?\n]+",
    ])
});
