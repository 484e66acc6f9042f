//! JSON column normalization.
//!
//! JSON-valued columns (lead metadata/conversation, chat transcripts,
//! event payloads, widget property info) are stored as TEXT. Drivers
//! differ in what they hand back: raw text, or an already-parsed value.
//! `normalize` folds both shapes into the structured form, and applying
//! it twice yields the same value.

use serde_json::Value;

/// Default for object-valued columns.
pub fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Default for array-valued columns.
pub fn empty_array() -> Value {
    Value::Array(Vec::new())
}

/// Normalize a JSON column value read from a backend.
///
/// - `Null` becomes the column default (these columns are never null at
///   the store boundary).
/// - A string that looks like serialized JSON (`{...}` / `[...]`) is
///   parsed; unparseable or non-JSON text falls back to the default.
/// - Structured values pass through untouched, which is what makes the
///   operation idempotent.
pub fn normalize(value: Value, default: &Value) -> Value {
    match value {
        Value::Null => default.clone(),
        Value::String(s) => {
            let trimmed = s.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                serde_json::from_str(&s).unwrap_or_else(|_| default.clone())
            } else {
                default.clone()
            }
        }
        other => other,
    }
}

/// Normalize a raw TEXT column (the `sqlx::Any` read path).
pub fn normalize_text(text: Option<&str>, default: &Value) -> Value {
    match text {
        Some(s) => normalize(Value::String(s.to_string()), default),
        None => default.clone(),
    }
}

/// Serialize a JSON column for storage, substituting the column default
/// for an absent or null value.
pub fn to_db_text(value: Option<&Value>, default: &Value) -> String {
    let value = match value {
        Some(Value::Null) | None => default,
        Some(v) => v,
    };
    serde_json::to_string(value).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        for v in [
            json!({"a": 1, "b": [true, null]}),
            json!([{"role": "user", "text": "hi"}]),
            json!({}),
            json!([]),
        ] {
            let text = to_db_text(Some(&v), &empty_object());
            let back = normalize_text(Some(&text), &empty_object());
            assert_eq!(back, v);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let cases = [
            Value::Null,
            Value::String(r#"{"x":1}"#.to_string()),
            Value::String("[1,2,3]".to_string()),
            Value::String("not json".to_string()),
            json!({"x": 1}),
            json!([1, 2, 3]),
        ];
        for v in cases {
            let once = normalize(v.clone(), &empty_object());
            let twice = normalize(once.clone(), &empty_object());
            assert_eq!(once, twice, "normalize not idempotent for {v:?}");
        }
    }

    #[test]
    fn test_null_becomes_default() {
        assert_eq!(normalize(Value::Null, &empty_array()), json!([]));
        assert_eq!(normalize_text(None, &empty_object()), json!({}));
    }

    #[test]
    fn test_malformed_text_becomes_default() {
        assert_eq!(
            normalize_text(Some("{broken"), &empty_object()),
            empty_object()
        );
    }

    #[test]
    fn test_to_db_text_applies_default() {
        assert_eq!(to_db_text(None, &empty_array()), "[]");
        assert_eq!(to_db_text(Some(&Value::Null), &empty_object()), "{}");
    }
}
