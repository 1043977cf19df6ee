//! Helpers for reading and writing typed resource state
//!
//! Terraform hands every attribute over as a [`Value`]: known, null or not
//! yet known. Resources mostly care whether a value is known and non-zero,
//! which is what these helpers answer.

use tf_provider::value::Value;

/// The value, when it is known.
pub fn known<T>(value: &Value<T>) -> Option<&T> {
    match value {
        Value::Value(v) => Some(v),
        Value::Null | Value::Unknown => None,
    }
}

/// Known string, or `""`.
pub fn string(value: &Value<String>) -> &str {
    known(value).map_or("", String::as_str)
}

/// Known number, or `0`.
pub fn int(value: &Value<i64>) -> i64 {
    known(value).copied().unwrap_or(0)
}

pub fn flag(value: &Value<bool>, default: bool) -> bool {
    known(value).copied().unwrap_or(default)
}

/// Known and non-empty
pub fn is_set(value: &Value<String>) -> bool {
    !string(value).is_empty()
}

/// Known and non-zero
pub fn is_set_int(value: &Value<i64>) -> bool {
    int(value) != 0
}

pub fn set<T>(value: T) -> Value<T> {
    Value::Value(value)
}

/// Null becomes unknown, so the value can be filled in by apply.
pub fn computed<T>(value: Value<T>) -> Value<T> {
    match value {
        Value::Null => Value::Unknown,
        other => other,
    }
}

/// Null becomes `default`.
pub fn with_default<T>(value: Value<T>, default: T) -> Value<T> {
    match value {
        Value::Null => Value::Value(default),
        other => other,
    }
}

/// Overwrite `field` with `remote` only when the field is already tracked.
///
/// The API echoes billing settings back even when they were never configured.
pub fn update_value(field: &mut Value<String>, remote: &str) {
    if is_set(field) {
        *field = Value::Value(remote.to_string());
    }
}

/// Whether the value differs. Null and unknown only equal themselves.
pub fn changed<T: PartialEq>(prior: &Value<T>, proposed: &Value<T>) -> bool {
    match (prior, proposed) {
        (Value::Value(a), Value::Value(b)) => a != b,
        (Value::Null, Value::Null) | (Value::Unknown, Value::Unknown) => false,
        _ => true,
    }
}
