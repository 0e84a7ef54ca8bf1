//! Safe traversal over untyped registry JSON.
//!
//! Registry payloads are schemaless by contract: any key may be absent, any
//! value may be null or of an unexpected shape. Every extractor and renderer
//! in this crate goes through the helpers here instead of indexing into
//! [`serde_json::Value`] directly, so a broken path always degrades to a
//! caller-supplied default and never to a panic or error.

use serde_json::Value;

/// Walk a chain of object keys from `root`.
///
/// Returns `None` if at any step the current value is not an object, the key
/// is missing, or the value reached is JSON null. An empty path returns the
/// root itself (unless it is null).
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Read a string at `path`, or `default` when the path is broken.
///
/// Non-string scalars (numbers, booleans) are stringified, since registries
/// are inconsistent about whether counts and flags arrive quoted.
pub fn str_or(root: &Value, path: &[&str], default: &str) -> String {
    match lookup(root, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

/// Read an array at `path`, or an empty list when the path is broken or the
/// value is not an array.
pub fn list<'a>(root: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    match lookup(root, path) {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// Read an array of scalars at `path`, stringifying each element.
///
/// Non-scalar elements are skipped rather than rendered as raw JSON.
pub fn string_list(root: &Value, path: &[&str]) -> Vec<String> {
    list(root, path)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

/// Read a boolean at `path`, or `default` when the path is broken.
pub fn bool_or(root: &Value, path: &[&str], default: bool) -> bool {
    match lookup(root, path) {
        Some(Value::Bool(b)) => *b,
        _ => default,
    }
}

/// Read an unsigned integer at `path`, or `default` when the path is broken.
pub fn u64_or(root: &Value, path: &[&str], default: u64) -> u64 {
    match lookup(root, path) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
        _ => default,
    }
}
