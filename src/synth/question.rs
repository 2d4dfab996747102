//! Question templates

use crate::extract::StructuredFields;

/// Which question template to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Diagnosis,
    Repair,
    Tools,
    Procedure,
}

/// Fills a template, falling back to the title question when the fields it
/// needs were not detected
pub fn question_for(kind: QuestionKind, fields: &StructuredFields) -> String {
    template(kind, fields).unwrap_or_else(|| fallback_question(fields))
}

/// Question for the full-article record: diagnosis if a symptom is known,
/// otherwise repair if a component is known, otherwise the title question
pub fn article_question(fields: &StructuredFields) -> String {
    template(QuestionKind::Diagnosis, fields)
        .or_else(|| template(QuestionKind::Repair, fields))
        .unwrap_or_else(|| fallback_question(fields))
}

fn template(kind: QuestionKind, fields: &StructuredFields) -> Option<String> {
    let device = fields.device_type.as_deref().unwrap_or("device");
    let subject = match fields.brand.as_deref() {
        Some(brand) => format!("{} {}", brand, device),
        None => device.to_string(),
    };

    match kind {
        QuestionKind::Diagnosis => {
            let symptom = fields.symptom.as_deref()?;
            Some(match fields.component.as_deref() {
                Some(component) => format!(
                    "How do I diagnose {} on {} in a {}?",
                    symptom, component, subject
                ),
                None => format!("How do I diagnose {} on a {}?", symptom, subject),
            })
        }
        QuestionKind::Repair => {
            let component = fields.component.as_deref()?;
            Some(format!(
                "How do I repair or replace the {} on a {}?",
                component, subject
            ))
        }
        QuestionKind::Tools => {
            if fields.tools_required.is_empty() {
                return None;
            }
            Some(format!("What tools do I need to fix this {} issue?", device))
        }
        QuestionKind::Procedure => {
            fields.procedure_text.as_ref()?;
            Some("What is the step-by-step procedure to fix this issue?".to_string())
        }
    }
}

fn fallback_question(fields: &StructuredFields) -> String {
    let title = fields.title.as_deref().unwrap_or("this issue");
    format!("How do I fix {}?", title.to_lowercase())
}
