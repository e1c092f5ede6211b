//! Fatal workflow errors.
//!
//! Only failures that stop an invocation live here. Generation problems the
//! stages recover from (placeholders, fallback analysis) never surface as
//! errors, and neither do persistence failures.

use serde_json::{json, Value};

/// A failure that ends one workflow invocation without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Step {step} Q&A data is missing")]
    MissingInput { step: u8 },

    #[error("Required upstream data is missing: {0}")]
    MissingContext(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl WorkflowError {
    /// Whether the caller supplied incomplete input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingInput { .. } | Self::MissingContext(_))
    }

    /// The failure body returned to callers.
    pub fn to_json(&self) -> Value {
        json!({ "error_occurred": true, "error_message": self.to_string() })
    }
}
