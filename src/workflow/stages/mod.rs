//! Stage executors.
//!
//! Each stage reads an immutable [`WorkflowState`], makes at most one
//! generation call and returns a [`StageOutcome`]. Dependent stages always
//! return exactly three candidates or a fatal [`WorkflowError`].

mod concept;
mod diagnosis;
mod logo;
mod naming;
mod story;

pub use diagnosis::DiagnosisAnalysis;
pub use logo::wordmark_prompt;

use serde_json::Value;

use super::candidate::CandidateSet;
use super::error::WorkflowError;
use super::flatten::flatten_context;
use super::record::Record;
use super::router::Stage;
use super::state::{StageOutcome, StageOutput, WorkflowState};
use crate::ai::{AIError, Generator, LogoRenderer};

/// Run the executor for `stage`.
pub async fn run_stage(
    stage: Stage,
    state: &WorkflowState,
    generator: &dyn Generator,
    renderer: &dyn LogoRenderer,
) -> Result<StageOutcome, WorkflowError> {
    tracing::info!(stage = %stage, output_id = %state.output_id, "Running stage");
    match stage {
        Stage::Diagnosis => diagnosis::run(state, generator).await,
        Stage::Naming => naming::run(state, generator).await,
        Stage::Concept => concept::run(state, generator).await,
        Stage::Story => story::run(state, generator).await,
        Stage::Logo => logo::run(state, generator, renderer).await,
    }
}

/// The current stage's non-empty answers.
fn require_qa(state: &WorkflowState, stage: Stage) -> Result<&Record, WorkflowError> {
    state.qa(stage).ok_or(WorkflowError::MissingInput { step: stage.step() })
}

/// Resolve an upstream context using the current answers as selection source.
///
/// An absent context resolves to an empty record.
fn resolve(state: &WorkflowState, upstream: Stage, answers: &Record) -> Record {
    state.context(upstream).map(|ctx| flatten_context(ctx, Some(answers))).unwrap_or_default()
}

/// Resolve a context the stage cannot run without.
fn require_context(
    state: &WorkflowState,
    upstream: Stage,
    answers: &Record,
) -> Result<Record, WorkflowError> {
    let resolved = resolve(state, upstream, answers);
    if resolved.is_empty() {
        return Err(WorkflowError::MissingContext(format!("{upstream} context")));
    }
    Ok(resolved)
}

/// Pull the `options` list out of a generation reply.
fn extract_options(reply: Value) -> Result<Vec<Value>, AIError> {
    let Value::Object(mut fields) = reply else {
        return Err(AIError::MalformedReply("reply is not a JSON object".to_string()));
    };
    match fields.remove("options") {
        Some(Value::Array(options)) => Ok(options),
        Some(_) => Err(AIError::MalformedReply("`options` is not a list".to_string())),
        None => Err(AIError::MalformedReply("reply has no `options`".to_string())),
    }
}

/// Ask for options and shape them into a candidate set.
///
/// Returns the failure reason when the call fails or the reply is malformed.
async fn generate_candidates(
    stage: Stage,
    generator: &dyn Generator,
    system: &str,
    user: &str,
    filler: impl Fn(usize) -> Record,
) -> Result<CandidateSet, String> {
    let reply = generator.generate(system, user).await.map_err(|e| e.to_string())?;
    let options = extract_options(reply).map_err(|e| e.to_string())?;
    tracing::debug!(stage = %stage, options = options.len(), "Received options");
    Ok(CandidateSet::from_options(options, filler))
}

/// Candidates for naming/concept/story, degrading to error placeholders.
async fn candidates_or_placeholders(
    stage: Stage,
    generator: &dyn Generator,
    system: &str,
    user: &str,
    filler: impl Fn(usize) -> Record,
    on_error: impl Fn(usize, &str) -> Record,
) -> CandidateSet {
    match generate_candidates(stage, generator, system, user, filler).await {
        Ok(set) => set,
        Err(reason) => {
            tracing::warn!(stage = %stage, error = %reason, "Generation failed, using placeholders");
            CandidateSet::uniform(|slot| on_error(slot, &reason))
        }
    }
}

fn candidates_outcome(stage: Stage, set: CandidateSet) -> StageOutcome {
    StageOutcome { stage, current_step: stage.next_step(), output: StageOutput::Candidates(set) }
}

/// Build a record from string pairs.
fn text_record<const N: usize>(pairs: [(&str, String); N]) -> Record {
    pairs.into_iter().map(|(key, value)| (key.to_string(), Value::String(value))).collect()
}
