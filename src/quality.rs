//! Completeness scoring of extracted fields

use crate::extract::StructuredFields;

const MAX_POINTS: f64 = 10.0;

/// Scores how complete a document's fields are, in [0, 1]
///
/// Text length earns up to two points (>= 500 chars: 2, >= 200: 1.5,
/// >= 100: 1). Each of device type, component, symptom, procedure, tools,
/// safety warnings, error codes and difficulty earns one point.
///
/// ```
/// use repair_harvest::{quality_score, StructuredFields};
///
/// assert_eq!(quality_score(&StructuredFields::default(), 50), 0.0);
/// ```
pub fn quality_score(fields: &StructuredFields, text_len: usize) -> f64 {
    let length_points = if text_len >= 500 {
        2.0
    } else if text_len >= 200 {
        1.5
    } else if text_len >= 100 {
        1.0
    } else {
        0.0
    };

    let present = [
        fields.device_type.is_some(),
        fields.component.is_some(),
        fields.symptom.is_some(),
        fields.procedure_text.is_some(),
        !fields.tools_required.is_empty(),
        !fields.safety_warnings.is_empty(),
        !fields.error_codes.is_empty(),
        fields.difficulty_level.is_some(),
    ];
    let field_points = present.iter().filter(|p| **p).count() as f64;

    ((length_points + field_points) / MAX_POINTS).clamp(0.0, 1.0)
}

/// Returns true if a document with this score may produce records
pub fn passes_gate(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Rounds a score to two decimals for output
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
