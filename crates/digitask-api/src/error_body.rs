//! Reduces backend error bodies to one readable line.
//!
//! The backend answers failures with a handful of JSON shapes:
//! `{"detail": "..."}`, a bare list of strings, or per-field error lists
//! such as `{"content": ["This field may not be blank."]}`.

use serde_json::Value;

/// Extract a readable message from an error response body, if it has one.
pub fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    message_from_value(&value)
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(message_from_value).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(message_from_value) {
                return Some(detail);
            }
            if let Some(message) = map.get("message").and_then(message_from_value) {
                return Some(message);
            }
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(field, v)| {
                    let text = message_from_value(v)?;
                    if field == "non_field_errors" {
                        Some(text)
                    } else {
                        Some(format!("{field}: {text}"))
                    }
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}
