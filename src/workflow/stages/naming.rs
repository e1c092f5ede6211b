//! Step 2: brand name candidates.

use crate::ai::Generator;
use crate::workflow::context::DiagnosisContext;
use crate::workflow::error::WorkflowError;
use crate::workflow::prompts;
use crate::workflow::record::Record;
use crate::workflow::router::Stage;
use crate::workflow::state::{StageOutcome, WorkflowState};

use super::{candidates_or_placeholders, candidates_outcome, require_qa, resolve, text_record};

fn filler(slot: usize) -> Record {
    text_record([
        ("brand_name", format!("Option {} (auto-added)", slot + 1)),
        ("name_rationale", "Placeholder added because too few names were generated".to_string()),
    ])
}

fn error_placeholder(slot: usize, reason: &str) -> Record {
    text_record([
        ("brand_name", format!("Error {}", slot + 1)),
        ("name_rationale", format!("Generation failed: {reason}")),
    ])
}

/// The diagnosis context, rebuilt from a prior result when the caller sent none.
///
/// A context holding only the output id counts as none.
fn diagnosis_context(state: &WorkflowState, qa: &Record) -> Result<DiagnosisContext, WorkflowError> {
    let resolved = resolve(state, Stage::Diagnosis, qa);
    if resolved.keys().any(|key| key != "output_id") {
        return Ok(DiagnosisContext::from_record(&resolved));
    }

    match state.prior_analysis() {
        Some(analysis) => {
            tracing::warn!(output_id = %state.output_id, "Diagnosis context missing, rebuilt from prior result");
            Ok(DiagnosisContext::from_analysis(analysis))
        }
        None => Err(WorkflowError::MissingContext(
            "diagnosis context (complete step 1 first)".to_string(),
        )),
    }
}

pub(super) async fn run(
    state: &WorkflowState,
    generator: &dyn Generator,
) -> Result<StageOutcome, WorkflowError> {
    let qa = require_qa(state, Stage::Naming)?;
    let diagnosis = diagnosis_context(state, qa)?;

    let set = candidates_or_placeholders(
        Stage::Naming,
        generator,
        prompts::NAMING_SYSTEM,
        &prompts::naming_user(&diagnosis, qa),
        filler,
        error_placeholder,
    )
    .await;

    Ok(candidates_outcome(Stage::Naming, set))
}
