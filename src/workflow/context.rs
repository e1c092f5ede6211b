//! Typed views over resolved upstream contexts.
//!
//! Stages flatten raw caller context into a [`Record`] and then read the
//! fields they need through these structs, so map access stays at the
//! normalizer/flattener boundary.

use serde_json::Value;

use super::record::{text_field, text_list, Record};

/// Persona used when the diagnosis context is unavailable.
pub const DEFAULT_PERSONA: &str = "Customers";

/// Condensed step 1 output carried into later stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosisContext {
    pub summary: String,
    pub keywords: Vec<String>,
    pub persona: String,
    pub perspectives: Value,
    pub brand_essence: String,
    pub emotional_core: String,
    pub differentiation_point: String,
}

impl DiagnosisContext {
    /// Read a resolved diagnosis context.
    ///
    /// Accepts both `core_keywords` and the caller-facing `keywords` key.
    pub fn from_record(record: &Record) -> Self {
        let keywords = match text_list(record, "core_keywords") {
            list if list.is_empty() => text_list(record, "keywords"),
            list => list,
        };

        Self {
            summary: text_field(record, "diagnosis_summary"),
            keywords,
            persona: text_field(record, "target_persona"),
            perspectives: record.get("perspectives").cloned().unwrap_or(Value::Null),
            brand_essence: text_field(record, "brand_essence"),
            emotional_core: text_field(record, "emotional_core"),
            differentiation_point: text_field(record, "differentiation_point"),
        }
    }

    /// Rebuild a minimal context from a stored diagnosis analysis.
    ///
    /// Only the summary, keywords, persona and perspectives survive.
    pub fn from_analysis(analysis: &Record) -> Self {
        Self {
            summary: text_field(analysis, "summary"),
            keywords: text_list(analysis, "keywords"),
            persona: text_field(analysis, "persona"),
            perspectives: analysis.get("perspectives").cloned().unwrap_or(Value::Null),
            ..Self::default()
        }
    }

    /// Canonical record form, as handed to the next stage.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("diagnosis_summary".into(), Value::from(self.summary.clone()));
        record.insert("core_keywords".into(), Value::from(self.keywords.clone()));
        record.insert("target_persona".into(), Value::from(self.persona.clone()));
        record.insert("perspectives".into(), self.perspectives.clone());
        record.insert("brand_essence".into(), Value::from(self.brand_essence.clone()));
        record.insert("emotional_core".into(), Value::from(self.emotional_core.clone()));
        record.insert(
            "differentiation_point".into(),
            Value::from(self.differentiation_point.clone()),
        );
        record
    }

    /// Persona for prompts, with the default applied.
    pub fn persona_or_default(&self) -> &str {
        if self.persona.is_empty() {
            DEFAULT_PERSONA
        } else {
            &self.persona
        }
    }
}

/// The brand name chosen at step 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingContext {
    pub brand_name: String,
    pub name_rationale: String,
}

impl NamingContext {
    pub fn from_record(record: &Record) -> Self {
        Self {
            brand_name: text_field(record, "brand_name"),
            name_rationale: text_field(record, "name_rationale"),
        }
    }
}

/// The concept chosen at step 3.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptContext {
    pub concept_statement: String,
    pub concept_rationale: String,
    pub brand_values: Vec<String>,
}

impl ConceptContext {
    pub fn from_record(record: &Record) -> Self {
        Self {
            concept_statement: text_field(record, "concept_statement"),
            concept_rationale: text_field(record, "concept_rationale"),
            brand_values: text_list(record, "brand_values"),
        }
    }
}

/// The story chosen at step 4.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryContext {
    pub brand_story: String,
    pub emotional_arc: String,
}

impl StoryContext {
    pub fn from_record(record: &Record) -> Self {
        Self {
            brand_story: text_field(record, "brand_story"),
            emotional_arc: text_field(record, "emotional_arc"),
        }
    }
}
