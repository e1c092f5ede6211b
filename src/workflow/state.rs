//! Per-request workflow input and per-stage output.
//!
//! A [`WorkflowState`] is assembled fresh for every request from what the
//! caller sent and is only ever read by the stage that runs. The stage hands
//! back a [`StageOutcome`]; nothing is written back into the state.

use std::collections::BTreeMap;

use serde_json::Value;

use super::candidate::CandidateSet;
use super::context::DiagnosisContext;
use super::record::Record;
use super::router::Stage;
use super::stages::DiagnosisAnalysis;

/// Everything one stage invocation may read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    /// Identifier the caller uses to group one brand's results
    pub output_id: String,

    /// Declared step (1-5)
    pub current_step: u8,

    /// Raw Q&A answers keyed by step number
    pub step_qa: BTreeMap<u8, Record>,

    /// Raw upstream contexts, unresolved
    pub diagnosis_context: Option<Value>,
    pub naming_context: Option<Value>,
    pub concept_context: Option<Value>,
    pub story_context: Option<Value>,

    /// A prior step 1 result (`{ qa, analysis }`), used for recovery
    pub diagnosis_result: Option<Value>,
}

impl WorkflowState {
    /// Create a state positioned at `stage`.
    pub fn new(output_id: impl Into<String>, stage: Stage) -> Self {
        Self { output_id: output_id.into(), current_step: stage.step(), ..Self::default() }
    }

    /// Attach the raw answers for a stage.
    pub fn with_qa(mut self, stage: Stage, qa: Record) -> Self {
        self.step_qa.insert(stage.step(), qa);
        self
    }

    /// Attach the raw context produced by an upstream stage.
    ///
    /// Logo has no downstream consumer, so its context is ignored.
    pub fn with_context(mut self, stage: Stage, context: Value) -> Self {
        match stage {
            Stage::Diagnosis => self.diagnosis_context = Some(context),
            Stage::Naming => self.naming_context = Some(context),
            Stage::Concept => self.concept_context = Some(context),
            Stage::Story => self.story_context = Some(context),
            Stage::Logo => {}
        }
        self
    }

    /// Attach a prior diagnosis result.
    pub fn with_diagnosis_result(mut self, result: Value) -> Self {
        self.diagnosis_result = Some(result);
        self
    }

    /// Non-empty raw answers for a stage.
    pub fn qa(&self, stage: Stage) -> Option<&Record> {
        self.step_qa.get(&stage.step()).filter(|qa| !qa.is_empty())
    }

    /// The raw context an upstream stage produced.
    pub fn context(&self, stage: Stage) -> Option<&Value> {
        match stage {
            Stage::Diagnosis => self.diagnosis_context.as_ref(),
            Stage::Naming => self.naming_context.as_ref(),
            Stage::Concept => self.concept_context.as_ref(),
            Stage::Story => self.story_context.as_ref(),
            Stage::Logo => None,
        }
    }

    /// The `analysis` record of a prior diagnosis result, if any.
    pub fn prior_analysis(&self) -> Option<&Record> {
        self.diagnosis_result.as_ref()?.get("analysis")?.as_object()
    }
}

/// Result of one successful stage invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    /// Stage that ran
    pub stage: Stage,

    /// Step the caller should invoke next
    pub current_step: u8,

    /// Stage-specific output
    pub output: StageOutput,
}

/// What a stage produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// Step 1 produces a single analysis, not candidates.
    Diagnosis(DiagnosisOutcome),

    /// Steps 2-5 produce exactly three candidates.
    Candidates(CandidateSet),
}

impl StageOutcome {
    /// The candidate list, for dependent stages.
    pub fn candidates(&self) -> Option<&CandidateSet> {
        match &self.output {
            StageOutput::Candidates(set) => Some(set),
            StageOutput::Diagnosis(_) => None,
        }
    }

    /// The diagnosis output, for step 1.
    pub fn diagnosis(&self) -> Option<&DiagnosisOutcome> {
        match &self.output {
            StageOutput::Diagnosis(outcome) => Some(outcome),
            StageOutput::Candidates(_) => None,
        }
    }
}

/// Step 1 output: the full result plus the condensed downstream context.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisOutcome {
    /// The answers the analysis was based on
    pub qa: Record,

    /// Full analysis
    pub analysis: DiagnosisAnalysis,

    /// Subset handed to later stages
    pub context: DiagnosisContext,
}

impl DiagnosisOutcome {
    /// The stored `{ qa, analysis }` form.
    pub fn result_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("qa".into(), Value::Object(self.qa.clone()));
        record.insert("analysis".into(), Value::Object(self.analysis.to_record()));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let qa = json!({"q": "a"}).as_object().cloned().unwrap();
        let state = WorkflowState::new("output_01", Stage::Concept)
            .with_qa(Stage::Concept, qa.clone())
            .with_context(Stage::Naming, json!({"brand_name": "Zed"}))
            .with_context(Stage::Logo, json!({"ignored": true}));

        assert_eq!(state.current_step, 3);
        assert_eq!(state.qa(Stage::Concept), Some(&qa));
        assert!(state.qa(Stage::Naming).is_none());
        assert_eq!(state.context(Stage::Naming), Some(&json!({"brand_name": "Zed"})));
        assert!(state.context(Stage::Logo).is_none());
    }

    #[test]
    fn test_empty_qa_is_absent() {
        let state = WorkflowState::new("x", Stage::Diagnosis).with_qa(Stage::Diagnosis, Record::new());
        assert!(state.qa(Stage::Diagnosis).is_none());
    }

    #[test]
    fn test_prior_analysis() {
        let state = WorkflowState::new("x", Stage::Naming)
            .with_diagnosis_result(json!({"qa": {}, "analysis": {"summary": "s"}}));
        assert_eq!(state.prior_analysis().unwrap()["summary"], json!("s"));

        let state = WorkflowState::new("x", Stage::Naming).with_diagnosis_result(json!({"qa": {}}));
        assert!(state.prior_analysis().is_none());
    }
}
