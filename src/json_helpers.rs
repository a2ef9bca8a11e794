/// JSON field access helpers
///
/// Records are never validated against a schema, so every extractor reads
/// fields through these lenient accessors: a missing or oddly-typed field
/// becomes `None` instead of an error.
use crate::types::JsonObject;
use serde_json::Value;

/// Render a scalar JSON value as a string; containers and null yield None
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a scalar field as a string
pub fn get_string(object: &JsonObject, key: &str) -> Option<String> {
    object.get(key).and_then(scalar_string)
}

/// Read an integer field, accepting numeric strings such as "1500000000000"
pub fn get_i64(object: &JsonObject, key: &str) -> Option<i64> {
    match object.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn get_object<'a>(object: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    object.get(key).and_then(|v| v.as_object())
}

pub fn get_array<'a>(object: &'a JsonObject, key: &str) -> Option<&'a Vec<Value>> {
    object.get(key).and_then(|v| v.as_array())
}

/// Read an array of scalars as strings, dropping null and container entries
pub fn get_string_list(object: &JsonObject, key: &str) -> Option<Vec<String>> {
    get_array(object, key).map(|items| items.iter().filter_map(scalar_string).collect())
}

/// Short description of an object for log messages: its top-level keys
pub fn describe_keys(object: &JsonObject) -> String {
    let keys: Vec<&str> = object.keys().take(5).map(|k| k.as_str()).collect();
    let more = if object.len() > 5 { ", ..." } else { "" };
    format!("{{{}{}}}", keys.join(", "), more)
}
