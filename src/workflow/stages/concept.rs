//! Step 3: concept candidates for the chosen name.

use crate::ai::Generator;
use crate::workflow::context::{DiagnosisContext, NamingContext};
use crate::workflow::error::WorkflowError;
use crate::workflow::prompts;
use crate::workflow::record::Record;
use crate::workflow::router::Stage;
use crate::workflow::state::{StageOutcome, WorkflowState};

use super::{candidates_or_placeholders, candidates_outcome, require_context, require_qa, resolve, text_record};

fn filler(slot: usize) -> Record {
    text_record([
        ("concept_statement", format!("Concept {}", slot + 1)),
        ("concept_rationale", "Generated as filler".to_string()),
    ])
}

fn error_placeholder(_slot: usize, reason: &str) -> Record {
    text_record([
        ("concept_statement", "Error".to_string()),
        ("concept_rationale", format!("Generation failed: {reason}")),
    ])
}

pub(super) async fn run(
    state: &WorkflowState,
    generator: &dyn Generator,
) -> Result<StageOutcome, WorkflowError> {
    let qa = require_qa(state, Stage::Concept)?;

    let diagnosis = DiagnosisContext::from_record(&require_context(state, Stage::Diagnosis, qa)?);
    let naming = NamingContext::from_record(&resolve(state, Stage::Naming, qa));
    if naming.brand_name.is_empty() {
        return Err(WorkflowError::MissingContext("naming context with a brand_name".to_string()));
    }
    tracing::debug!(brand_name = %naming.brand_name, "Resolved naming context");

    let set = candidates_or_placeholders(
        Stage::Concept,
        generator,
        prompts::CONCEPT_SYSTEM,
        &prompts::concept_user(&diagnosis, &naming, qa),
        filler,
        error_placeholder,
    )
    .await;

    Ok(candidates_outcome(Stage::Concept, set))
}
