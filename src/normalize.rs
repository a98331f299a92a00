//! Response key normalization
//!
//! Upstream documents arrive with camelCase keys; the facade serves
//! snake_case. `snake_case_keys` rewrites every mapping key recursively
//! and leaves scalar values and array ordering untouched. The transform
//! is total (never fails) and idempotent: applying it to an already
//! normalized document is a no-op.

use serde_json::Value;

/// Convert a single key from camelCase to snake_case
///
/// An underscore is inserted before every uppercase character except at
/// position 0, then the whole key is lowercased. Keys without uppercase
/// characters pass through unchanged, which is what makes the document
/// transform idempotent.
pub fn snake_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively rewrite all mapping keys in a JSON document to snake_case
pub fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (snake_case_key(&key), snake_case_keys(inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        other => other,
    }
}
