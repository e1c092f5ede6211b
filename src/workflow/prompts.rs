//! Prompt text for each stage.
//!
//! Every stage sends a fixed system prompt and a user prompt built from the
//! resolved upstream context plus the raw answers for the current step.

use super::context::{ConceptContext, DiagnosisContext, NamingContext, StoryContext};
use super::record::Record;

pub const DIAGNOSIS_SYSTEM: &str = "\
You are a senior brand strategist. Diagnose the business described in the \
interview answers from three perspectives: business, user and market. \
Reply with a JSON object with the keys: summary, keywords (3 items), persona, \
perspectives (business_perspective, user_perspective, market_perspective), \
brand_essence, emotional_core, differentiation_point.";

pub const NAMING_SYSTEM: &str = "\
You are a brand naming expert. Propose exactly 3 distinct brand names. \
Reply with a JSON object {\"options\": [...]} where each option has: \
brand_name, name_rationale, qa_analysis_summary, qa_keywords (3 items).";

pub const CONCEPT_SYSTEM: &str = "\
You are a brand concept strategist. Propose exactly 3 brand concepts for the \
chosen name. Reply with a JSON object {\"options\": [...]} where each option \
has: concept_statement, concept_rationale, brand_values (3 items), \
qa_analysis_summary, qa_keywords (3 items).";

pub const STORY_SYSTEM: &str = "\
You are a brand storyteller. Write exactly 3 brand stories, each with a \
different tone (emotional, functional, visionary). Reply with a JSON object \
{\"options\": [...]} where each option has: brand_story, story_rationale, \
emotional_arc, qa_analysis_summary, qa_keywords (3 items).";

pub const LOGO_SYSTEM: &str = "\
You are a logo art director. Propose exactly 3 wordmark logo directions, one \
per layout type: Horizontal, Integrated and Stacked. Reply with a JSON object \
{\"options\": [...]} where each option has: layout_type, style_keywords, \
color_palette (hex codes), benchmark_brand, logo_concept, logo_rationale, \
qa_analysis_summary, qa_keywords (3 items), visual_instruction.";

/// Pretty-print answers for embedding in a prompt.
fn answers_json(qa: &Record) -> String {
    serde_json::to_string_pretty(qa).unwrap_or_default()
}

pub fn diagnosis_user(qa: &Record) -> String {
    format!("Interview answers:\n{}\n", answers_json(qa))
}

pub fn naming_user(diagnosis: &DiagnosisContext, qa: &Record) -> String {
    format!(
        "Diagnosis summary: {}\nCore keywords: {:?}\nTarget persona: {}\n\nNaming answers:\n{}\n",
        diagnosis.summary,
        diagnosis.keywords,
        diagnosis.persona,
        answers_json(qa),
    )
}

pub fn concept_user(diagnosis: &DiagnosisContext, naming: &NamingContext, qa: &Record) -> String {
    let summary =
        if diagnosis.summary.is_empty() { "No diagnosis summary" } else { &diagnosis.summary };
    format!(
        "Diagnosis summary: {}\nbrand_name={}\nName rationale: {}\n\nConcept answers:\n{}\n",
        summary,
        naming.brand_name,
        naming.name_rationale,
        answers_json(qa),
    )
}

pub fn story_user(
    diagnosis: &DiagnosisContext,
    naming: &NamingContext,
    concept: &ConceptContext,
    qa: &Record,
) -> String {
    format!(
        "brand_name={}\nConcept: {}\nTarget persona: {}\n\nStory answers:\n{}\n",
        naming.brand_name,
        concept.concept_statement,
        diagnosis.persona_or_default(),
        answers_json(qa),
    )
}

pub fn logo_user(
    diagnosis: &DiagnosisContext,
    naming: &NamingContext,
    concept: &ConceptContext,
    story: &StoryContext,
    qa: &Record,
) -> String {
    format!(
        "brand_name={}\nConcept: {}\nStory: {}\nCore keywords: {:?}\n\nLogo answers:\n{}\n",
        naming.brand_name,
        concept.concept_statement,
        story.brand_story,
        diagnosis.keywords,
        answers_json(qa),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concept_prompt_carries_brand_name() {
        let naming = NamingContext { brand_name: "Zed".into(), name_rationale: String::new() };
        let qa = json!({"s3_q1": "calm"}).as_object().cloned().unwrap();
        let prompt = concept_user(&DiagnosisContext::default(), &naming, &qa);
        assert!(prompt.contains("brand_name=Zed"));
        assert!(prompt.contains("No diagnosis summary"));
        assert!(prompt.contains("s3_q1"));
    }

    #[test]
    fn test_story_prompt_defaults_persona() {
        let prompt = story_user(
            &DiagnosisContext::default(),
            &NamingContext::default(),
            &ConceptContext::default(),
            &Record::new(),
        );
        assert!(prompt.contains("Target persona: Customers"));
    }
}
