//! Conversion of cells and computed statistics into JSON-safe values.

use serde_json::{Number, Value as JsonValue};

use crate::data::Value;

/// Converts a cell into a JSON primitive. Never fails: lists are converted
/// element by element, missing markers (including NaN) become `null`, and
/// timestamps are rendered as ISO-8601 strings.
pub fn coerce(value: &Value) -> JsonValue {
    if let Value::List(items) = value {
        return JsonValue::Array(items.iter().map(coerce).collect());
    }
    if value.is_missing() {
        return JsonValue::Null;
    }
    match value {
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => coerce_float(*f),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Timestamp(ts) => JsonValue::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Missing | Value::List(_) => JsonValue::Null,
    }
}

/// JSON has no NaN or infinity; both become `null`.
pub fn coerce_float(value: f64) -> JsonValue {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

pub fn coerce_optional(value: Option<f64>) -> JsonValue {
    value.map(coerce_float).unwrap_or(JsonValue::Null)
}
