//! Inbound payload normalization.
//!
//! Callers send request bodies in several shapes: the canonical
//! `{ user_input, context }` form, the older `{ qa_answers, context }` form,
//! and fully flattened bodies where answers sit at the top level. Context
//! values sometimes arrive as JSON-encoded strings with upper-cased keys.
//! [`normalize_request`] folds all of these into one [`NormalizedRequest`].

use serde_json::Value;

use super::record::Record;

/// A request body in canonical shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRequest {
    /// Current stage answers, absent when the body carried none.
    pub user_input: Option<Record>,

    /// Upstream contexts keyed by lower-cased stage name.
    pub context: Record,
}

impl NormalizedRequest {
    /// Look up an upstream context by (lower-case) key.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

/// Normalize an arbitrary inbound request body.
///
/// Never fails. A body that is not a JSON object yields an empty request.
pub fn normalize_request(body: &Value) -> NormalizedRequest {
    let Some(fields) = body.as_object() else {
        return NormalizedRequest::default();
    };

    let user_input = match fields.get("user_input") {
        Some(value) => as_record(value),
        None => match fields.get("qa_answers") {
            Some(value) => as_record(value),
            None => {
                let collected: Record = fields
                    .iter()
                    .filter(|(key, _)| key.as_str() != "context")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                (!collected.is_empty()).then_some(collected)
            }
        },
    };

    let context = fields.get("context").map(normalize_context).unwrap_or_default();

    NormalizedRequest { user_input, context }
}

/// Lower-case context keys and decode embedded JSON strings.
///
/// Key collisions after lower-casing keep the value seen last.
pub fn normalize_context(context: &Value) -> Record {
    let Some(entries) = context.as_object() else {
        return Record::new();
    };

    entries
        .iter()
        .map(|(key, value)| (key.to_lowercase(), decode_embedded_json(value)))
        .collect()
}

/// Parse a string that looks like a JSON object or array.
///
/// Anything that fails to parse is returned unchanged.
fn decode_embedded_json(value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };

    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return value.clone();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "Context value looked like JSON but did not parse");
            value.clone()
        }
    }
}

fn as_record(value: &Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_body() {
        let body = json!({
            "user_input": {"q1": "coffee"},
            "context": {"interview": {"diagnosis_summary": "ok"}}
        });
        let request = normalize_request(&body);
        assert_eq!(request.user_input, json!({"q1": "coffee"}).as_object().cloned());
        assert_eq!(request.context_value("interview"), Some(&json!({"diagnosis_summary": "ok"})));
    }

    #[test]
    fn test_qa_answers_alias() {
        let body = json!({"qa_answers": {"q1": "tea"}, "context": {}});
        let request = normalize_request(&body);
        assert_eq!(request.user_input, json!({"q1": "tea"}).as_object().cloned());
    }

    #[test]
    fn test_legacy_flattened_body() {
        let body = json!({"q1": "a", "q2": ["b"], "context": {"NAMING": {}}});
        let request = normalize_request(&body);
        assert_eq!(request.user_input, json!({"q1": "a", "q2": ["b"]}).as_object().cloned());
        assert!(request.context.contains_key("naming"));
    }

    #[test]
    fn test_context_only_body_has_no_user_input() {
        let body = json!({"context": {"naming": {}}});
        assert!(normalize_request(&body).user_input.is_none());
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(normalize_request(&json!({})), NormalizedRequest::default());
        assert_eq!(normalize_request(&json!("not a map")), NormalizedRequest::default());
    }

    #[test]
    fn test_context_string_decoding() {
        let body = json!({
            "user_input": {},
            "context": {
                "Naming": "  {\"brand_name\": \"Nova\"}",
                "STORY": "[1, 2]",
                "concept": "{not json",
                "note": "plain text"
            }
        });
        let request = normalize_request(&body);
        assert_eq!(request.context["naming"], json!({"brand_name": "Nova"}));
        assert_eq!(request.context["story"], json!([1, 2]));
        assert_eq!(request.context["concept"], json!("{not json"));
        assert_eq!(request.context["note"], json!("plain text"));
    }

    #[test]
    fn test_lowercase_collision_keeps_last_key() {
        // Keys are visited in sorted order, so "Naming" comes before "naming".
        let body = json!({
            "user_input": {"a": 1},
            "context": {"naming": {"brand_name": "Lower"}, "Naming": {"brand_name": "Upper"}}
        });
        let request = normalize_request(&body);
        assert_eq!(request.context.len(), 1);
        assert_eq!(request.context["naming"], json!({"brand_name": "Lower"}));
    }

    #[test]
    fn test_non_object_context_is_dropped() {
        let body = json!({"user_input": {"a": 1}, "context": "nope"});
        assert!(normalize_request(&body).context.is_empty());
    }
}
