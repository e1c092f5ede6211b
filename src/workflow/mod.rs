//! Staged brand-consulting workflow.
//!
//! Five stages run one per request, strictly in order:
//!
//! 1. `diagnosis` - analyse the business from the interview answers
//! 2. `naming` - three brand name candidates
//! 3. `concept` - three concepts for the chosen name
//! 4. `story` - three brand stories
//! 5. `logo` - three logo directions with rendered artwork
//!
//! The caller carries all continuity. Each response includes a
//! `state_context` that must be sent back as context on the next step,
//! together with the answers for that step. Candidate lists in that context
//! are resolved to the user's pick by [`flatten_context`].

mod candidate;
mod context;
mod error;
mod flatten;
mod normalize;
mod prompts;
mod record;
mod response;
mod router;
mod runner;
mod stages;
mod state;

pub use candidate::{Candidate, CandidateSet, CANDIDATE_COUNT};
pub use context::{ConceptContext, DiagnosisContext, NamingContext, StoryContext, DEFAULT_PERSONA};
pub use error::WorkflowError;
pub use flatten::{flatten_context, selection_hint, CandidateRecord, DISPLAY_FIELDS};
pub use normalize::{normalize_context, normalize_request, NormalizedRequest};
pub use record::{is_present, Record};
pub use response::StageResponse;
pub use router::{route, Stage};
pub use runner::WorkflowRunner;
pub use stages::{run_stage, wordmark_prompt, DiagnosisAnalysis};
pub use state::{DiagnosisOutcome, StageOutcome, StageOutput, WorkflowState};
