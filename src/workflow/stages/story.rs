//! Step 4: brand story candidates.

use crate::ai::Generator;
use crate::workflow::context::{ConceptContext, DiagnosisContext, NamingContext};
use crate::workflow::error::WorkflowError;
use crate::workflow::prompts;
use crate::workflow::record::Record;
use crate::workflow::router::Stage;
use crate::workflow::state::{StageOutcome, WorkflowState};

use super::{candidates_or_placeholders, candidates_outcome, require_context, require_qa, resolve, text_record};

fn filler(slot: usize) -> Record {
    text_record([
        ("brand_story", format!("Story Option {} (placeholder)", slot + 1)),
        ("story_rationale", "Added automatically because too few stories were generated".to_string()),
    ])
}

fn error_placeholder(_slot: usize, reason: &str) -> Record {
    text_record([
        ("brand_story", "Error: story generation failed".to_string()),
        ("story_rationale", format!("Generation failed: {reason}")),
    ])
}

pub(super) async fn run(
    state: &WorkflowState,
    generator: &dyn Generator,
) -> Result<StageOutcome, WorkflowError> {
    let qa = require_qa(state, Stage::Story)?;

    let naming = NamingContext::from_record(&require_context(state, Stage::Naming, qa)?);
    let concept = ConceptContext::from_record(&require_context(state, Stage::Concept, qa)?);
    // Only the persona is read; a missing diagnosis falls back to the default.
    let diagnosis = DiagnosisContext::from_record(&resolve(state, Stage::Diagnosis, qa));

    let set = candidates_or_placeholders(
        Stage::Story,
        generator,
        prompts::STORY_SYSTEM,
        &prompts::story_user(&diagnosis, &naming, &concept, qa),
        filler,
        error_placeholder,
    )
    .await;

    Ok(candidates_outcome(Stage::Story, set))
}
