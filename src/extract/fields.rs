use super::rules::{
    first_label, BEGINNER_PATTERNS, BRAND_RULES, COMPONENT_RULES, DEVICE_RULES,
    ERROR_CODE_PATTERNS, EXPERT_PATTERNS, INTERMEDIATE_PATTERNS, MODEL_PATTERNS,
    PROCEDURE_PATTERNS, SAFETY_KEYWORDS, STEP_MARKER, SYMPTOM_KEYWORDS, TOOL_PATTERNS,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_SAFETY_WARNINGS: usize = 3;
const MAX_ERROR_CODES: usize = 5;
const SAFETY_SENTENCE_CHARS: usize = 200;
const TITLE_CHARS: usize = 200;
const MATCHES_PER_PROCEDURE_PATTERN: usize = 5;
const MAX_PROCEDURE_LINES: usize = 10;
const MINUTES_PER_STEP: usize = 10;

/// How hard a repair looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-derived metadata of one document
///
/// A `None` field was not detected. Set-valued fields keep discovery order
/// and hold no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredFields {
    pub title: Option<String>,
    pub device_type: Option<String>,
    pub component: Option<String>,
    pub symptom: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub difficulty_level: Option<Difficulty>,
    pub estimated_time: Option<String>,
    pub procedure_text: Option<String>,
    pub tools_required: Vec<String>,
    pub safety_warnings: Vec<String>,
    pub error_codes: Vec<String>,
}

/// Runs every extraction rule over normalized text
///
/// `title` is the document title if one is known; otherwise the first 200
/// characters of the text are used.
///
/// ```
/// use repair_harvest::extract::{extract_fields, Difficulty};
///
/// let fields = extract_fields("Step 1: remove the Dell laptop battery with a screwdriver.", None);
/// assert_eq!(fields.brand.as_deref(), Some("dell"));
/// assert_eq!(fields.component.as_deref(), Some("battery"));
/// assert_eq!(fields.tools_required, vec!["screwdriver"]);
/// assert_eq!(fields.difficulty_level, Some(Difficulty::Beginner));
/// ```
pub fn extract_fields(text: &str, title: Option<&str>) -> StructuredFields {
    let lowered = text.to_lowercase();

    let tools_required = extract_tools(&lowered);
    let step_count = STEP_MARKER.find_iter(text).count();

    StructuredFields {
        title: title
            .map(str::to_string)
            .or_else(|| Some(text.chars().take(TITLE_CHARS).collect()))
            .filter(|t| !t.trim().is_empty()),
        device_type: first_label(&DEVICE_RULES, &lowered).map(str::to_string),
        component: first_label(&COMPONENT_RULES, &lowered).map(str::to_string),
        symptom: extract_symptom(&lowered),
        brand: first_label(&BRAND_RULES, &lowered).map(str::to_string),
        model: extract_model(&lowered),
        difficulty_level: Some(estimate_difficulty(&lowered, step_count, tools_required.len())),
        estimated_time: estimate_time(step_count),
        procedure_text: extract_procedure(text),
        safety_warnings: extract_safety_warnings(text, &lowered),
        error_codes: extract_error_codes(text),
        tools_required,
    }
}

fn extract_symptom(lowered: &str) -> Option<String> {
    SYMPTOM_KEYWORDS
        .iter()
        .find(|keyword| lowered.contains(*keyword))
        .map(|keyword| keyword.to_string())
}

fn extract_model(lowered: &str) -> Option<String> {
    MODEL_PATTERNS.iter().find_map(|pattern| {
        pattern
            .find(lowered)
            .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
    })
}

fn extract_tools(lowered: &str) -> Vec<String> {
    let mut tools: Vec<String> = Vec::new();

    for pattern in TOOL_PATTERNS.iter() {
        for caps in pattern.captures_iter(lowered) {
            if let Some(tool) = caps.get(1) {
                let tool = tool.as_str().to_lowercase();
                if !tools.contains(&tool) {
                    tools.push(tool);
                }
            }
        }
    }

    tools
}

fn extract_safety_warnings(text: &str, lowered: &str) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();

    for keyword in SAFETY_KEYWORDS {
        if warnings.len() >= MAX_SAFETY_WARNINGS {
            break;
        }
        if !lowered.contains(keyword) {
            continue;
        }

        let sentence = text
            .split('.')
            .find(|sentence| sentence.to_lowercase().contains(keyword));

        if let Some(sentence) = sentence {
            let warning: String = sentence.trim().chars().take(SAFETY_SENTENCE_CHARS).collect();
            if !warning.is_empty() && !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
    }

    warnings
}

fn extract_error_codes(text: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();

    for pattern in ERROR_CODE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(code) = caps.get(caps.len() - 1) else {
                continue;
            };
            let code = code.as_str().to_string();
            if !codes.contains(&code) {
                codes.push(code);
            }
            if codes.len() >= MAX_ERROR_CODES {
                return codes;
            }
        }
    }

    codes
}

/// Decision table over step count, keyword categories and tool count
fn estimate_difficulty(lowered: &str, step_count: usize, tool_count: usize) -> Difficulty {
    let hits = |patterns: &[Regex]| patterns.iter().filter(|p| p.is_match(lowered)).count();

    if step_count > 10 || hits(EXPERT_PATTERNS.as_slice()) > 0 {
        Difficulty::Expert
    } else if step_count > 5 || hits(INTERMEDIATE_PATTERNS.as_slice()) > 0 || tool_count > 3 {
        Difficulty::Intermediate
    } else if step_count > 0 || hits(BEGINNER_PATTERNS.as_slice()) > 0 {
        Difficulty::Beginner
    } else {
        Difficulty::Intermediate
    }
}

/// Ten minutes per explicit step, as "N minutes" or "Hh Mm"
fn estimate_time(step_count: usize) -> Option<String> {
    if step_count == 0 {
        return None;
    }

    let minutes = step_count * MINUTES_PER_STEP;
    if minutes < 60 {
        Some(format!("{} minutes", minutes))
    } else {
        Some(format!("{}h {}m", minutes / 60, minutes % 60))
    }
}

fn extract_procedure(text: &str) -> Option<String> {
    let lines: Vec<&str> = PROCEDURE_PATTERNS
        .iter()
        .flat_map(|pattern| {
            pattern
                .find_iter(text)
                .map(|m| m.as_str().trim())
                .take(MATCHES_PER_PROCEDURE_PATTERN)
        })
        .take(MAX_PROCEDURE_LINES)
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
