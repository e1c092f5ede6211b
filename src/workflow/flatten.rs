//! Candidate-list context flattening.
//!
//! A dependent stage receives upstream context either already resolved to
//! one record, or as the `{ "candidates": [...] }` list the previous stage
//! returned. Flattening picks one candidate (by the user's selection hint,
//! else the first) and lifts its fields onto the context.

use serde_json::Value;

use super::record::{is_present, Record};

/// Fields checked, in order, to find a candidate's display value.
pub const DISPLAY_FIELDS: [&str; 4] =
    ["brand_name", "concept_statement", "brand_story", "logo_image_url"];

/// Internal bookkeeping keys dropped from unwrapped candidates.
const INTERNAL_KEYS: [&str; 2] = ["id", "candidate_id"];

/// One entry of a candidate list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateRecord<'a> {
    /// `{ "output": { ... } }` as produced inside the workflow.
    Wrapped { output: &'a Record },

    /// `{ "id": 0, "brand_name": ... }` as echoed back by callers.
    Flat { fields: &'a Record },
}

impl<'a> CandidateRecord<'a> {
    /// Classify a candidate entry. Non-map entries are not candidates.
    pub fn classify(value: &'a Value) -> Option<Self> {
        let fields = value.as_object()?;
        match fields.get("output") {
            Some(Value::Object(output)) => Some(Self::Wrapped { output }),
            _ => Some(Self::Flat { fields }),
        }
    }

    /// The fields this candidate contributes to the flattened context.
    pub fn into_record(self) -> Record {
        match self {
            Self::Wrapped { output } => output.clone(),
            Self::Flat { fields } => {
                let mut record = fields.clone();
                for key in INTERNAL_KEYS {
                    record.remove(key);
                }
                record
            }
        }
    }

    /// The value a user would have seen and selected.
    pub fn display_value(self) -> Option<&'a Value> {
        let source = match self {
            Self::Wrapped { output } => output,
            Self::Flat { fields } => fields,
        };
        DISPLAY_FIELDS.iter().filter_map(|key| source.get(*key)).find(|value| is_present(value))
    }
}

/// Find the selection hint in the current stage's answers.
///
/// Matches any key ending in `current_name` or equal to `selected_name`
/// whose value is non-empty. Keys are scanned in map order, which is sorted
/// and therefore deterministic.
pub fn selection_hint(answers: &Record) -> Option<&Value> {
    answers
        .iter()
        .find(|(key, value)| {
            (key.ends_with("current_name") || key.as_str() == "selected_name") && is_present(value)
        })
        .map(|(_, value)| value)
}

/// Resolve a stage context to a single flat record.
///
/// Never fails: empty or non-map input gives an empty record, and any shape
/// it cannot resolve is returned unchanged.
pub fn flatten_context(context: &Value, answers: Option<&Record>) -> Record {
    let Some(fields) = context.as_object() else {
        return Record::new();
    };

    let Some(Value::Array(candidates)) = fields.get("candidates") else {
        return fields.clone();
    };

    let hint = answers.and_then(selection_hint);
    let selected = hint
        .and_then(|hint| {
            candidates
                .iter()
                .filter_map(CandidateRecord::classify)
                .find(|candidate| candidate.display_value() == Some(hint))
        })
        .or_else(|| {
            let first = candidates.first().and_then(CandidateRecord::classify);
            if first.is_some() {
                tracing::warn!(
                    hint = ?hint,
                    "No candidate matched the selection hint, falling back to the first"
                );
            }
            first
        });

    let Some(selected) = selected else {
        return fields.clone();
    };

    let mut flattened = fields.clone();
    flattened.remove("candidates");
    flattened.extend(selected.into_record());
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn naming_candidates() -> Value {
        json!({
            "stage_note": "kept",
            "candidates": [
                {"id": 0, "brand_name": "Nova", "name_rationale": "bright"},
                {"id": 1, "brand_name": "Zed", "name_rationale": "sharp"}
            ]
        })
    }

    #[test]
    fn test_flat_context_is_unchanged() {
        let context = json!({"brand_name": "Nova", "rationale": "x"});
        let answers = record(json!({"s3_current_name": "Zed"}));
        assert_eq!(flatten_context(&context, Some(&answers)), record(context.clone()));
        assert_eq!(flatten_context(&context, None), record(context));
    }

    #[test]
    fn test_empty_and_non_map_inputs() {
        assert!(flatten_context(&json!({}), None).is_empty());
        assert!(flatten_context(&Value::Null, None).is_empty());
        assert!(flatten_context(&json!("Nova"), None).is_empty());
        assert!(flatten_context(&json!([1, 2]), None).is_empty());
    }

    #[test]
    fn test_hint_selects_matching_candidate() {
        let answers = record(json!({"s3_current_name": "Zed"}));
        let flat = flatten_context(&naming_candidates(), Some(&answers));
        assert_eq!(flat["brand_name"], json!("Zed"));
        assert_eq!(flat["name_rationale"], json!("sharp"));
        assert_eq!(flat["stage_note"], json!("kept"));
        assert!(!flat.contains_key("candidates"));
        assert!(!flat.contains_key("id"));
    }

    #[test]
    fn test_selected_name_key() {
        let answers = record(json!({"selected_name": "Zed"}));
        let flat = flatten_context(&naming_candidates(), Some(&answers));
        assert_eq!(flat["brand_name"], json!("Zed"));
    }

    #[test]
    fn test_unmatched_hint_falls_back_to_first() {
        let answers = record(json!({"s3_current_name": "Nobody"}));
        let flat = flatten_context(&naming_candidates(), Some(&answers));
        assert_eq!(flat["brand_name"], json!("Nova"));

        let flat = flatten_context(&naming_candidates(), None);
        assert_eq!(flat["brand_name"], json!("Nova"));
    }

    #[test]
    fn test_empty_hint_is_ignored() {
        let answers = record(json!({"a_current_name": "", "selected_name": "Zed"}));
        let flat = flatten_context(&naming_candidates(), Some(&answers));
        assert_eq!(flat["brand_name"], json!("Zed"));
    }

    #[test]
    fn test_wrapped_candidates() {
        let context = json!({
            "candidates": [
                {"candidate_id": 0, "output": {"concept_statement": "Calm mornings"}},
                {"candidate_id": 1, "output": {"concept_statement": "Loud nights", "brand_values": ["bold"]}}
            ]
        });
        let answers = record(json!({"s4_current_name": "Loud nights"}));
        let flat = flatten_context(&context, Some(&answers));
        assert_eq!(flat, record(json!({"concept_statement": "Loud nights", "brand_values": ["bold"]})));
    }

    #[test]
    fn test_display_value_skips_empty_fields() {
        let context = json!({
            "candidates": [
                {"brand_name": "", "brand_story": "Once upon a time"},
                {"brand_name": "", "brand_story": "Another tale"}
            ]
        });
        let answers = record(json!({"selected_name": "Another tale"}));
        let flat = flatten_context(&context, Some(&answers));
        assert_eq!(flat["brand_story"], json!("Another tale"));
    }

    #[test]
    fn test_empty_candidate_list_returns_context() {
        let context = json!({"candidates": [], "brand_name": "Solo"});
        assert_eq!(flatten_context(&context, None), record(context));
    }

    #[test]
    fn test_non_list_candidates_returns_context() {
        let context = json!({"candidates": "Nova"});
        assert_eq!(flatten_context(&context, None), record(context));
    }

    #[test]
    fn test_non_map_first_candidate_returns_context() {
        let context = json!({"candidates": ["Nova", "Zed"]});
        assert_eq!(flatten_context(&context, None), record(context));
    }

    #[test]
    fn test_overlay_wins_on_collision() {
        let context = json!({"brand_name": "Old", "candidates": [{"brand_name": "New"}]});
        assert_eq!(flatten_context(&context, None)["brand_name"], json!("New"));
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let answers = record(json!({"s3_current_name": "Zed"}));
        let once = flatten_context(&naming_candidates(), Some(&answers));
        let twice = flatten_context(&Value::Object(once.clone()), Some(&answers));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_classify() {
        let wrapped = json!({"output": {"brand_name": "A"}});
        let flat = json!({"output": "text", "brand_name": "B"});
        assert!(matches!(CandidateRecord::classify(&wrapped), Some(CandidateRecord::Wrapped { .. })));
        assert!(matches!(CandidateRecord::classify(&flat), Some(CandidateRecord::Flat { .. })));
        assert!(CandidateRecord::classify(&json!(3)).is_none());
    }
}
