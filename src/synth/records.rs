use crate::extract::{Difficulty, StructuredFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of training record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    FullArticle,
    SymptomSpecific,
    Procedure,
    ToolsGuide,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::FullArticle => "full_article",
            ContentType::SymptomSpecific => "symptom_specific",
            ContentType::Procedure => "procedure",
            ContentType::ToolsGuide => "tools_guide",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured fields relevant to one content type
///
/// Serialized inline into the record metadata with a `content_type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum FieldSnapshot {
    FullArticle {
        device_type: Option<String>,
        component: Option<String>,
        symptom: Option<String>,
        brand: Option<String>,
        model: Option<String>,
        tools_required: Vec<String>,
        difficulty_level: Option<Difficulty>,
        safety_warnings: Vec<String>,
        error_codes: Vec<String>,
        estimated_time: Option<String>,
    },
    SymptomSpecific {
        device_type: Option<String>,
        component: Option<String>,
        symptom: String,
        brand: Option<String>,
        tools_required: Vec<String>,
        difficulty_level: Option<Difficulty>,
    },
    Procedure {
        device_type: Option<String>,
        component: Option<String>,
        brand: Option<String>,
        tools_required: Vec<String>,
        difficulty_level: Option<Difficulty>,
        estimated_time: Option<String>,
    },
    ToolsGuide {
        device_type: Option<String>,
        component: Option<String>,
        tools_required: Vec<String>,
        difficulty_level: Option<Difficulty>,
    },
}

impl FieldSnapshot {
    pub fn full_article(fields: &StructuredFields) -> Self {
        FieldSnapshot::FullArticle {
            device_type: fields.device_type.clone(),
            component: fields.component.clone(),
            symptom: fields.symptom.clone(),
            brand: fields.brand.clone(),
            model: fields.model.clone(),
            tools_required: fields.tools_required.clone(),
            difficulty_level: fields.difficulty_level,
            safety_warnings: fields.safety_warnings.clone(),
            error_codes: fields.error_codes.clone(),
            estimated_time: fields.estimated_time.clone(),
        }
    }

    pub fn symptom_specific(fields: &StructuredFields, symptom: &str) -> Self {
        FieldSnapshot::SymptomSpecific {
            device_type: fields.device_type.clone(),
            component: fields.component.clone(),
            symptom: symptom.to_string(),
            brand: fields.brand.clone(),
            tools_required: fields.tools_required.clone(),
            difficulty_level: fields.difficulty_level,
        }
    }

    pub fn procedure(fields: &StructuredFields) -> Self {
        FieldSnapshot::Procedure {
            device_type: fields.device_type.clone(),
            component: fields.component.clone(),
            brand: fields.brand.clone(),
            tools_required: fields.tools_required.clone(),
            difficulty_level: fields.difficulty_level,
            estimated_time: fields.estimated_time.clone(),
        }
    }

    pub fn tools_guide(fields: &StructuredFields) -> Self {
        FieldSnapshot::ToolsGuide {
            device_type: fields.device_type.clone(),
            component: fields.component.clone(),
            tools_required: fields.tools_required.clone(),
            difficulty_level: fields.difficulty_level,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            FieldSnapshot::FullArticle { .. } => ContentType::FullArticle,
            FieldSnapshot::SymptomSpecific { .. } => ContentType::SymptomSpecific,
            FieldSnapshot::Procedure { .. } => ContentType::Procedure,
            FieldSnapshot::ToolsGuide { .. } => ContentType::ToolsGuide,
        }
    }
}

/// Metadata attached to every training record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub source_url: String,
    #[serde(flatten)]
    pub fields: FieldSnapshot,
    /// Rounded to two decimals
    pub quality_score: f64,
    pub extracted_at: DateTime<Utc>,
}

/// One question/response pair with its metadata; one line of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub question: String,
    pub response: String,
    pub metadata: RecordMetadata,
}

impl TrainingRecord {
    pub fn content_type(&self) -> ContentType {
        self.metadata.fields.content_type()
    }
}
