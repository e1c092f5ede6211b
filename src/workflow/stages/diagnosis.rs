//! Step 1: business diagnosis.

use serde_json::Value;

use crate::ai::Generator;
use crate::workflow::context::DiagnosisContext;
use crate::workflow::error::WorkflowError;
use crate::workflow::prompts;
use crate::workflow::record::{text_field, text_list, Record};
use crate::workflow::router::Stage;
use crate::workflow::state::{DiagnosisOutcome, StageOutcome, StageOutput, WorkflowState};

use super::require_qa;

/// Full diagnosis produced at step 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosisAnalysis {
    pub summary: String,
    pub keywords: Vec<String>,
    pub persona: String,
    pub perspectives: Value,
    pub brand_essence: String,
    pub emotional_core: String,
    pub differentiation_point: String,
}

impl DiagnosisAnalysis {
    /// Read a generated analysis, defaulting any missing field.
    pub fn from_record(record: &Record) -> Self {
        Self {
            summary: text_field(record, "summary"),
            keywords: text_list(record, "keywords"),
            persona: text_field(record, "persona"),
            perspectives: record
                .get("perspectives")
                .cloned()
                .unwrap_or_else(|| Value::Object(Record::new())),
            brand_essence: text_field(record, "brand_essence"),
            emotional_core: text_field(record, "emotional_core"),
            differentiation_point: text_field(record, "differentiation_point"),
        }
    }

    /// Analysis substituted when generation fails.
    pub fn fallback() -> Self {
        Self {
            summary: "Analysis failed (fallback)".to_string(),
            keywords: vec!["Error".to_string()],
            persona: "Unknown".to_string(),
            perspectives: Value::Object(Record::new()),
            ..Self::default()
        }
    }

    /// The condensed form handed to later stages.
    pub fn context(&self) -> DiagnosisContext {
        DiagnosisContext {
            summary: self.summary.clone(),
            keywords: self.keywords.clone(),
            persona: self.persona.clone(),
            perspectives: self.perspectives.clone(),
            brand_essence: self.brand_essence.clone(),
            emotional_core: self.emotional_core.clone(),
            differentiation_point: self.differentiation_point.clone(),
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("summary".into(), Value::from(self.summary.clone()));
        record.insert("keywords".into(), Value::from(self.keywords.clone()));
        record.insert("persona".into(), Value::from(self.persona.clone()));
        record.insert("perspectives".into(), self.perspectives.clone());
        record.insert("brand_essence".into(), Value::from(self.brand_essence.clone()));
        record.insert("emotional_core".into(), Value::from(self.emotional_core.clone()));
        record.insert(
            "differentiation_point".into(),
            Value::from(self.differentiation_point.clone()),
        );
        record
    }
}

pub(super) async fn run(
    state: &WorkflowState,
    generator: &dyn Generator,
) -> Result<StageOutcome, WorkflowError> {
    let qa = require_qa(state, Stage::Diagnosis)?;

    let analysis =
        match generator.generate(prompts::DIAGNOSIS_SYSTEM, &prompts::diagnosis_user(qa)).await {
            Ok(Value::Object(record)) => DiagnosisAnalysis::from_record(&record),
            Ok(_) => {
                tracing::warn!("Diagnosis reply is not a JSON object, using fallback analysis");
                DiagnosisAnalysis::fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Diagnosis generation failed, using fallback analysis");
                DiagnosisAnalysis::fallback()
            }
        };

    tracing::info!(keywords = ?analysis.keywords, persona = %analysis.persona, "Diagnosis complete");

    Ok(StageOutcome {
        stage: Stage::Diagnosis,
        current_step: Stage::Diagnosis.next_step(),
        output: StageOutput::Diagnosis(DiagnosisOutcome {
            qa: qa.clone(),
            context: analysis.context(),
            analysis,
        }),
    })
}
