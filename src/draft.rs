//! Helpers for reading values out of a caller-owned listing draft.
//!
//! A draft is a flat JSON object from field name to value. It is only ever
//! borrowed; nothing here fills defaults or normalizes input.

use serde_json::{Map, Value};

pub type Draft = Map<String, Value>;

/// Null, blank strings, and empty arrays or objects count as not provided.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// The field's value when it is present and not blank.
pub fn provided<'a>(draft: &'a Draft, field: &str) -> Option<&'a Value> {
    draft.get(field).filter(|value| !is_blank(value))
}

/// Identifier carried by an id-typed field: a string as written, or a
/// non-negative integer rendered in decimal.
pub fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => number.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

/// Scalar or list value flattened into identifiers. Entries that are not ids
/// are dropped.
pub fn ids_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(id_of).collect(),
        other => id_of(other).into_iter().collect(),
    }
}

/// Short rendering of a value for messages.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
