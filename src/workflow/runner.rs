//! Single-invocation workflow runner.
//!
//! The runner holds no per-brand state between calls. Each [`invoke`]
//! normalizes the request body, builds a fresh [`WorkflowState`], runs the
//! routed stage and shapes the response. Results are saved on a best-effort
//! basis.
//!
//! [`invoke`]: WorkflowRunner::invoke

use std::sync::Arc;

use serde_json::Value;

use super::error::WorkflowError;
use super::normalize::{normalize_request, NormalizedRequest};
use super::response::StageResponse;
use super::router::{route, Stage};
use super::stages::run_stage;
use super::state::{StageOutput, WorkflowState};
use crate::ai::{DisabledRenderer, Generator, LogoRenderer};
use crate::core::{result_key, ResultStore};

/// Context keys accepted for each upstream stage, in lookup order.
const CONTEXT_KEYS: [(Stage, &[&str]); 4] = [
    (Stage::Diagnosis, &["interview", "diagnosis"]),
    (Stage::Naming, &["naming"]),
    (Stage::Concept, &["concept"]),
    (Stage::Story, &["story"]),
];

/// Runs one workflow stage per call.
pub struct WorkflowRunner {
    generator: Arc<dyn Generator>,
    renderer: Arc<dyn LogoRenderer>,
    store: Arc<dyn ResultStore>,
}

impl WorkflowRunner {
    /// Create a runner. Logo rendering is disabled until a renderer is set.
    pub fn new(generator: Arc<dyn Generator>, store: Arc<dyn ResultStore>) -> Self {
        Self { generator, renderer: Arc::new(DisabledRenderer), store }
    }

    /// Use a logo renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn LogoRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Run the stage for `current_step` against a raw request body.
    pub async fn invoke(
        &self,
        current_step: i64,
        body: &Value,
    ) -> Result<StageResponse, WorkflowError> {
        let stage = route(current_step);
        let request = normalize_request(body);
        let output_id = self.output_id(&request);
        let state = self.build_state(stage, output_id, request);

        let outcome = run_stage(stage, &state, self.generator.as_ref(), self.renderer.as_ref())
            .await
            .map_err(|e| {
                tracing::warn!(stage = %stage, output_id = %state.output_id, error = %e, "Stage failed");
                e
            })?;

        let response = StageResponse::from_outcome(&outcome, &state.output_id);

        let stored = match &outcome.output {
            StageOutput::Diagnosis(diagnosis) => Value::Object(diagnosis.result_record()),
            StageOutput::Candidates(_) => response.result.clone(),
        };
        if let Err(e) = self.store.save(&state.output_id, stage, &stored) {
            tracing::warn!(stage = %stage, output_id = %state.output_id, error = %e, "Failed to save stage result");
        }

        tracing::info!(
            stage = %stage,
            output_id = %state.output_id,
            next_step = outcome.current_step,
            "Stage complete"
        );
        Ok(response)
    }

    /// Assemble the per-request state for `stage`.
    pub fn build_state(
        &self,
        stage: Stage,
        output_id: String,
        request: NormalizedRequest,
    ) -> WorkflowState {
        let mut state = WorkflowState::new(output_id, stage);

        if let Some(answers) = request.user_input.clone() {
            state = state.with_qa(stage, answers);
        }

        for (upstream, keys) in CONTEXT_KEYS {
            let found = keys
                .iter()
                .find_map(|key| request.context_value(key))
                .filter(|v| !v.is_null());
            if let Some(context) = found {
                state = state.with_context(upstream, context.clone());
            }
        }

        if let Some(result) = request.context_value("diagnosis_result").filter(|v| !v.is_null()) {
            state = state.with_diagnosis_result(result.clone());
        } else if stage == Stage::Naming
            && !state.diagnosis_context.as_ref().is_some_and(carries_fields)
        {
            if let Some(result) = self.stored_diagnosis(&state.output_id) {
                state = state.with_diagnosis_result(result);
            }
        }

        state
    }

    /// The output id carried by the diagnosis context, else a fresh one.
    fn output_id(&self, request: &NormalizedRequest) -> String {
        let carried = ["interview", "diagnosis"]
            .iter()
            .filter_map(|key| request.context_value(key))
            .find_map(|ctx| ctx.get("output_id").and_then(Value::as_str))
            .filter(|id| !id.is_empty());
        if let Some(id) = carried {
            return id.to_string();
        }

        self.store.next_output_id().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not allocate an output id, using a random one");
            format!("output_{}", uuid::Uuid::new_v4().simple())
        })
    }

    /// A previously saved step 1 result for this output id.
    fn stored_diagnosis(&self, output_id: &str) -> Option<Value> {
        match self.store.load(output_id, Stage::Diagnosis.step()) {
            Ok(mut results) => results.remove(&result_key(Stage::Diagnosis)),
            Err(e) => {
                tracing::warn!(output_id, error = %e, "Failed to load stored diagnosis");
                None
            }
        }
    }
}

/// Whether a context value holds more than the output id naming the run.
fn carries_fields(context: &Value) -> bool {
    match context {
        Value::Null => false,
        Value::Object(fields) => fields.keys().any(|key| key != "output_id"),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GenerationManager;
    use crate::core::MemoryStore;
    use serde_json::json;

    fn runner(store: Arc<MemoryStore>) -> WorkflowRunner {
        WorkflowRunner::new(Arc::new(GenerationManager::disabled()), store)
    }

    #[test]
    fn test_build_state_reads_aliases() {
        let runner = runner(Arc::new(MemoryStore::new()));
        let request = normalize_request(&json!({
            "user_input": {"s3_q1": "x"},
            "context": {
                "Diagnosis": {"diagnosis_summary": "s"},
                "naming": {"brand_name": "Zed"},
                "story": null
            }
        }));

        let state = runner.build_state(Stage::Concept, "output_01".into(), request);
        assert_eq!(state.current_step, 3);
        assert!(state.qa(Stage::Concept).is_some());
        assert_eq!(state.diagnosis_context, Some(json!({"diagnosis_summary": "s"})));
        assert_eq!(state.naming_context, Some(json!({"brand_name": "Zed"})));
        assert!(state.story_context.is_none());
    }

    #[test]
    fn test_output_id_sources() {
        let store = Arc::new(MemoryStore::new());
        let runner = runner(store.clone());

        let carried = normalize_request(&json!({"context": {"interview": {"output_id": "output_42"}}}));
        assert_eq!(runner.output_id(&carried), "output_42");

        store.save("output_02", Stage::Diagnosis, &json!({})).unwrap();
        assert_eq!(runner.output_id(&NormalizedRequest::default()), "output_03");
    }

    #[test]
    fn test_naming_recovers_stored_diagnosis() {
        let store = Arc::new(MemoryStore::new());
        store
            .save("output_05", Stage::Diagnosis, &json!({"qa": {}, "analysis": {"summary": "stored"}}))
            .unwrap();
        let runner = runner(store);

        // An id-only interview context names the run without carrying a diagnosis.
        let request = normalize_request(&json!({
            "user_input": {"q": "a"},
            "context": {"interview": {"output_id": "output_05"}}
        }));
        let state = runner.build_state(Stage::Naming, "output_05".into(), request);
        assert_eq!(state.diagnosis_context, Some(json!({"output_id": "output_05"})));
        assert_eq!(state.prior_analysis().unwrap()["summary"], json!("stored"));

        let request = normalize_request(&json!({
            "user_input": {"q": "a"},
            "context": {"interview": {"output_id": "output_05", "diagnosis_summary": "sent"}}
        }));
        let state = runner.build_state(Stage::Naming, "output_05".into(), request);
        assert!(state.diagnosis_result.is_none());
        assert!(state.diagnosis_context.is_some());
    }

    #[test]
    fn test_carries_fields() {
        assert!(!carries_fields(&json!(null)));
        assert!(!carries_fields(&json!({"output_id": "output_01"})));
        assert!(carries_fields(&json!({"output_id": "output_01", "brand_name": "Zed"})));
        assert!(carries_fields(&json!("Zed")));
    }

    #[test]
    fn test_id_only_context_is_attached_for_later_stages() {
        let store = Arc::new(MemoryStore::new());
        store
            .save("output_01", Stage::Diagnosis, &json!({"qa": {}, "analysis": {"summary": "stored"}}))
            .unwrap();
        let runner = runner(store);

        let request = normalize_request(&json!({
            "user_input": {"s3_q1": "x"},
            "context": {"interview": {"output_id": "output_01"}, "naming": {"brand_name": "Zed"}}
        }));
        let state = runner.build_state(Stage::Concept, "output_01".into(), request);
        assert_eq!(state.diagnosis_context, Some(json!({"output_id": "output_01"})));
        assert!(state.diagnosis_result.is_none());
    }
}
