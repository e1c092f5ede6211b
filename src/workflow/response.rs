//! Caller-facing response shaping.
//!
//! A [`StageOutcome`] is turned into what the caller shows (`result`) and
//! what it must send back as context on the next step (`state_context`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::candidate::CandidateSet;
use super::record::{copy_field, Record};
use super::router::Stage;
use super::state::{DiagnosisOutcome, StageOutcome, StageOutput};

/// Maximum length of the diagnosis `brand_direction` teaser, in characters.
const BRAND_DIRECTION_CHARS: usize = 100;

/// Number of keywords quoted in the diagnosis insight line.
const INSIGHT_KEYWORDS: usize = 3;

/// Detail fields shared by every dependent stage.
const QA_FIELDS: [&str; 2] = ["qa_analysis_summary", "qa_keywords"];

/// Detail fields that default to an empty list rather than an empty string.
const LIST_FIELDS: [&str; 3] = ["brand_values", "color_palette", "qa_keywords"];

/// Response to one workflow invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResponse {
    /// Identifier grouping this brand's results
    pub output_id: String,

    /// Stage that ran
    pub stage: Stage,

    /// Step the caller should invoke next
    pub current_step: u8,

    /// Display result
    pub result: Value,

    /// Context to pass forward on the next step
    pub state_context: Value,
}

impl StageResponse {
    /// Shape a stage outcome for the caller.
    pub fn from_outcome(outcome: &StageOutcome, output_id: &str) -> Self {
        let (result, state_context) = match &outcome.output {
            StageOutput::Diagnosis(diagnosis) => diagnosis_response(diagnosis, output_id),
            StageOutput::Candidates(set) => candidates_response(outcome.stage, set),
        };

        Self {
            output_id: output_id.to_string(),
            stage: outcome.stage,
            current_step: outcome.current_step,
            result,
            state_context,
        }
    }
}

fn diagnosis_response(diagnosis: &DiagnosisOutcome, output_id: &str) -> (Value, Value) {
    let analysis = &diagnosis.analysis;
    let context = &diagnosis.context;
    let insight_keywords: Vec<&str> =
        analysis.keywords.iter().take(INSIGHT_KEYWORDS).map(String::as_str).collect();

    let result = json!({
        "summary": analysis.summary,
        "analysis": "Brand direction analysis complete",
        "key_insights": format!("Core keywords: {}", insight_keywords.join(", ")),
    });

    let state_context = json!({
        "output_id": output_id,
        "brand_direction": analysis.summary.chars().take(BRAND_DIRECTION_CHARS).collect::<String>(),
        "tone": context.emotional_core,
        "keywords": analysis.keywords,
        "perspectives": analysis.perspectives,
        "brand_essence": context.brand_essence,
        "emotional_core": context.emotional_core,
        "differentiation_point": context.differentiation_point,
        "target_persona": analysis.persona,
        "diagnosis_summary": analysis.summary,
    });

    (result, state_context)
}

/// Display key for a 1-based slot.
fn display_key(stage: Stage, slot: usize) -> String {
    match stage {
        Stage::Naming => format!("name{slot}"),
        Stage::Concept => format!("concept{slot}"),
        Stage::Story => format!("story{slot}"),
        Stage::Logo | Stage::Diagnosis => format!("logo{slot}_url"),
    }
}

/// The field shown to the user, then the stage-specific detail fields.
fn detail_fields(stage: Stage) -> &'static [&'static str] {
    match stage {
        Stage::Naming => &["brand_name", "name_rationale"],
        Stage::Concept => &["concept_statement", "concept_rationale", "brand_values"],
        Stage::Story => &["brand_story", "story_rationale", "emotional_arc"],
        Stage::Logo | Stage::Diagnosis => {
            &["logo_image_url", "logo_concept", "logo_rationale", "color_palette"]
        }
    }
}

fn empty_value(key: &str) -> Value {
    if LIST_FIELDS.contains(&key) {
        Value::Array(Vec::new())
    } else {
        Value::from("")
    }
}

fn candidates_response(stage: Stage, set: &CandidateSet) -> (Value, Value) {
    let fields = detail_fields(stage);

    let mut result = Record::new();
    let mut candidates = Vec::with_capacity(set.len());
    for candidate in set {
        let output = &candidate.output;
        let display = output.get(fields[0]).cloned().unwrap_or(Value::Null);
        result.insert(display_key(stage, candidate.candidate_id + 1), display);

        let mut detail = Record::new();
        detail.insert("id".into(), Value::from(candidate.candidate_id));
        for key in fields.iter().chain(QA_FIELDS.iter()) {
            copy_field(&mut detail, output, key, empty_value(key));
        }
        candidates.push(Value::Object(detail));
    }

    (Value::Object(result), json!({ "candidates": candidates }))
}
