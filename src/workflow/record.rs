//! Open record type shared by the normalizer, flattener and stages.
//!
//! Caller payloads are dynamic, so records stay as JSON maps at the boundary.
//! Stages convert the fields they need into typed structs right after
//! context resolution (see [`super::context`]).

use serde_json::{Map, Value};

/// A string-keyed JSON record.
pub type Record = Map<String, Value>;

/// Whether a value carries content.
///
/// Null, `false`, zero, empty strings, empty lists and empty maps are all
/// considered empty.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Read a field as display text.
///
/// Strings are returned as-is, numbers and booleans are formatted, anything
/// else (including a missing key) yields an empty string.
pub fn text_field(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Read a field as a list of strings.
///
/// A single string becomes a one-element list. Non-string list items are
/// rendered as JSON text.
pub fn text_list(record: &Record, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Copy a field into `target`, substituting `default` when it is absent.
pub fn copy_field(target: &mut Record, source: &Record, key: &str, default: Value) {
    let value = source.get(key).cloned().unwrap_or(default);
    target.insert(key.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_present() {
        assert!(!is_present(&Value::Null));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!({})));
        assert!(!is_present(&json!(0)));
        assert!(is_present(&json!("Zed")));
        assert!(is_present(&json!(7)));
        assert!(is_present(&json!(["a"])));
    }

    #[test]
    fn test_text_field() {
        let record = json!({"name": "Nova", "count": 3, "nested": {"a": 1}});
        let record = record.as_object().unwrap();
        assert_eq!(text_field(record, "name"), "Nova");
        assert_eq!(text_field(record, "count"), "3");
        assert_eq!(text_field(record, "nested"), "");
        assert_eq!(text_field(record, "missing"), "");
    }

    #[test]
    fn test_text_list() {
        let record = json!({"keywords": ["calm", 2], "single": "solo", "empty": ""});
        let record = record.as_object().unwrap();
        assert_eq!(text_list(record, "keywords"), vec!["calm", "2"]);
        assert_eq!(text_list(record, "single"), vec!["solo"]);
        assert!(text_list(record, "empty").is_empty());
        assert!(text_list(record, "missing").is_empty());
    }
}
