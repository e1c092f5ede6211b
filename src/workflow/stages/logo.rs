//! Step 5: logo candidates and their rendered artwork.
//!
//! Unlike the earlier stages, a failed generation call is fatal here: there
//! is no useful placeholder for a logo direction. Rendering failures are not
//! fatal and only leave that candidate without an image.

use futures::future::join_all;
use serde_json::Value;

use crate::ai::{Generator, LogoRenderer};
use crate::workflow::candidate::CandidateSet;
use crate::workflow::context::{ConceptContext, DiagnosisContext, NamingContext, StoryContext};
use crate::workflow::error::WorkflowError;
use crate::workflow::prompts;
use crate::workflow::record::{copy_field, text_field, text_list, Record};
use crate::workflow::router::Stage;
use crate::workflow::state::{StageOutcome, WorkflowState};

use super::{candidates_outcome, generate_candidates, require_context, require_qa, resolve};

fn filler(slot: usize) -> Record {
    let mut record = Record::new();
    record.insert("logo_concept".into(), Value::from(format!("Logo {}", slot + 1)));
    record.insert("dalle_prompt".into(), Value::from("Create a modern logo"));
    record.insert("color_palette".into(), Value::Array(Vec::new()));
    record
}

/// Build the image prompt for one logo direction.
///
/// The layout directive comes from `layout_type`; unknown layouts get a plain
/// horizontal arrangement.
pub fn wordmark_prompt(brand_name: &str, option: &Record) -> String {
    let layout = match text_field(option, "layout_type").as_str() {
        "" | "Horizontal" => "LAYOUT: Small geometric symbol on LEFT, brand name text on RIGHT.",
        "Integrated" => "LAYOUT: Text itself becomes symbol by modifying one letter.",
        "Stacked" => "LAYOUT: Small symbol ABOVE, brand name BELOW.",
        _ => "LAYOUT: Clean horizontal.",
    };

    let colors = match text_list(option, "color_palette") {
        palette if palette.is_empty() => "Black".to_string(),
        palette => palette.join(", "),
    };
    let benchmark = match text_field(option, "benchmark_brand") {
        b if b.is_empty() => "Apple".to_string(),
        b => b,
    };
    let instruction = match text_field(option, "visual_instruction") {
        i if i.is_empty() => format!(
            "The brand name '{brand_name}' written in bold sans-serif font. \
             A small dot accent in the brand color."
        ),
        i => i,
    };

    format!(
        "{layout}\n\n{instruction}\n\n\
         Create a GLOBAL CORPORATE LOGOTYPE logo.\n\n\
         STYLE: minimal, flat vector, custom sans-serif typography, inspired by {benchmark}.\n\
         TEXT: \"{brand_name}\" only.\n\
         SYMBOL: one simple geometric shape (dot, square, line, triangle or circle).\n\
         COLOR: solid {colors}.\n\
         BACKGROUND: white.\n\
         FORBIDDEN: mockups, shadows, 3D, gradients, extra text."
    )
}

/// The caller-facing fields of a logo candidate.
fn logo_output(option: &Record, image_url: Option<String>) -> Record {
    let mut output = Record::new();
    copy_field(&mut output, option, "logo_concept", Value::from(""));
    output.insert("logo_image_url".into(), image_url.map_or(Value::Null, Value::String));
    copy_field(&mut output, option, "logo_rationale", Value::from(""));
    copy_field(&mut output, option, "qa_analysis_summary", Value::from(""));
    copy_field(&mut output, option, "qa_keywords", Value::Array(Vec::new()));
    copy_field(&mut output, option, "color_palette", Value::Array(Vec::new()));
    output
}

pub(super) async fn run(
    state: &WorkflowState,
    generator: &dyn Generator,
    renderer: &dyn LogoRenderer,
) -> Result<StageOutcome, WorkflowError> {
    let qa = require_qa(state, Stage::Logo)?;

    let naming = NamingContext::from_record(&require_context(state, Stage::Naming, qa)?);
    let concept = ConceptContext::from_record(&require_context(state, Stage::Concept, qa)?);
    let story = StoryContext::from_record(&require_context(state, Stage::Story, qa)?);
    let diagnosis = DiagnosisContext::from_record(&resolve(state, Stage::Diagnosis, qa));

    let directions = generate_candidates(
        Stage::Logo,
        generator,
        prompts::LOGO_SYSTEM,
        &prompts::logo_user(&diagnosis, &naming, &concept, &story, qa),
        filler,
    )
    .await
    .map_err(WorkflowError::GenerationFailed)?;

    let brand_name = if naming.brand_name.is_empty() { "Brand" } else { &naming.brand_name };
    let renders = directions.iter().map(|candidate| {
        let prompt = wordmark_prompt(brand_name, &candidate.output);
        async move {
            match renderer.render(&prompt, &state.output_id, candidate.candidate_id).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(
                        slot = candidate.candidate_id,
                        error = %e,
                        "Logo render failed, leaving image empty"
                    );
                    None
                }
            }
        }
    });
    let urls = join_all(renders).await;

    let outputs = directions
        .iter()
        .zip(urls)
        .map(|(candidate, url)| Value::Object(logo_output(&candidate.output, url)))
        .collect();

    Ok(candidates_outcome(Stage::Logo, CandidateSet::from_options(outputs, filler)))
}
