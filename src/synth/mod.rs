//! Training record synthesis
//!
//! One document yields up to four records, always in this order:
//! `full_article`, `symptom_specific`, `procedure`, `tools_guide`. Synthesis is
//! a pure function of its inputs; the timestamp is passed in.

mod question;
mod records;

pub use question::{article_question, question_for, QuestionKind};
pub use records::{ContentType, FieldSnapshot, RecordMetadata, TrainingRecord};

use crate::content::clean_text;
use crate::extract::StructuredFields;
use crate::quality::{passes_gate, quality_score, round_score};
use chrono::{DateTime, Utc};

/// Minimum length of a symptom excerpt worth emitting
const MIN_SYMPTOM_EXCERPT_CHARS: usize = 50;

/// Sentences after the symptom sentence included in the excerpt
const SYMPTOM_CONTEXT_SENTENCES: usize = 3;

/// Safety warnings repeated in the full-article response
const ARTICLE_SAFETY_WARNINGS: usize = 2;

/// Thresholds applied during synthesis
#[derive(Debug, Clone, Copy)]
pub struct SynthesisSettings {
    pub min_text_length: usize,
    pub quality_threshold: f64,
}

impl From<&crate::config::ContentConfig> for SynthesisSettings {
    fn from(config: &crate::config::ContentConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
            quality_threshold: config.quality_threshold,
        }
    }
}

/// Turns one document into its training records
///
/// Returns nothing if the quality score is below the threshold.
pub fn synthesize(
    text: &str,
    fields: &StructuredFields,
    source_url: &str,
    settings: SynthesisSettings,
    extracted_at: DateTime<Utc>,
) -> Vec<TrainingRecord> {
    let text_len = text.chars().count();
    let score = quality_score(fields, text_len);

    if !passes_gate(score, settings.quality_threshold) {
        return Vec::new();
    }

    let record = |question: String, response: String, snapshot: FieldSnapshot| TrainingRecord {
        question,
        response,
        metadata: RecordMetadata {
            source_url: source_url.to_string(),
            fields: snapshot,
            quality_score: round_score(score),
            extracted_at,
        },
    };

    let mut records = Vec::new();

    if text_len >= settings.min_text_length {
        records.push(record(
            article_question(fields),
            article_response(text, fields),
            FieldSnapshot::full_article(fields),
        ));
    }

    if let Some(symptom) = fields.symptom.as_deref() {
        if let Some(excerpt) = symptom_excerpt(text, symptom) {
            records.push(record(
                question_for(QuestionKind::Diagnosis, fields),
                excerpt,
                FieldSnapshot::symptom_specific(fields, symptom),
            ));
        }
    }

    if let Some(procedure) = fields.procedure_text.as_deref() {
        records.push(record(
            question_for(QuestionKind::Procedure, fields),
            procedure_response(procedure, fields),
            FieldSnapshot::procedure(fields),
        ));
    }

    if !fields.tools_required.is_empty() {
        records.push(record(
            question_for(QuestionKind::Tools, fields),
            tools_response(fields),
            FieldSnapshot::tools_guide(fields),
        ));
    }

    records
}

/// Text followed by tool, safety and error-code summaries
fn article_response(text: &str, fields: &StructuredFields) -> String {
    let mut response = text.to_string();

    if !fields.tools_required.is_empty() {
        response.push_str("\n\nTools required: ");
        response.push_str(&fields.tools_required.join(", "));
    }

    if !fields.safety_warnings.is_empty() {
        let shown = fields.safety_warnings.len().min(ARTICLE_SAFETY_WARNINGS);
        response.push_str("\n\nSafety warnings: ");
        response.push_str(&fields.safety_warnings[..shown].join(" | "));
    }

    if !fields.error_codes.is_empty() {
        response.push_str("\n\nError codes: ");
        response.push_str(&fields.error_codes.join(", "));
    }

    response
}

/// The first sentence mentioning the symptom plus a little context
fn symptom_excerpt(text: &str, symptom: &str) -> Option<String> {
    let symptom = symptom.to_lowercase();
    let sentences: Vec<&str> = text.split('.').collect();

    let start = sentences
        .iter()
        .position(|sentence| sentence.to_lowercase().contains(&symptom))?;

    let excerpt = std::iter::once(sentences[start].trim())
        .chain(
            sentences
                .iter()
                .skip(start + 1)
                .take(SYMPTOM_CONTEXT_SENTENCES)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty()),
        )
        .collect::<Vec<_>>()
        .join(". ");

    (excerpt.chars().count() >= MIN_SYMPTOM_EXCERPT_CHARS).then_some(excerpt)
}

fn procedure_response(procedure: &str, fields: &StructuredFields) -> String {
    let mut response = clean_text(procedure);

    if !fields.tools_required.is_empty() {
        response.push_str("\n\nTools needed: ");
        response.push_str(&fields.tools_required.join(", "));
    }

    if let Some(time) = fields.estimated_time.as_deref() {
        response.push_str("\n\nEstimated time: ");
        response.push_str(time);
    }

    response
}

fn tools_response(fields: &StructuredFields) -> String {
    let mut response = String::from("To fix this issue, you will need the following tools:\n\n");
    response.push_str(
        &fields
            .tools_required
            .iter()
            .map(|tool| format!("• {}", tool))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    if let Some(procedure) = fields.procedure_text.as_deref() {
        response.push_str("\n\nProcedure:\n");
        response.push_str(&clean_text(procedure));
    }

    response
}
