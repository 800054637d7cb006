//! Key normalization: hyphen-case keys → snake_case keys
//!
//! Only mapping keys are rewritten. String values, sequence order and
//! scalar types are left untouched, so normalizing twice is the same as
//! normalizing once.
//!
//! Two sibling keys that differ only in `-` vs `_` (`b-file` and `b_file`)
//! collapse into one key, and the later value wins. The pipeline rejects
//! such documents up front with [`find_key_collision`].

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Rewrite a single key (`store-name` → `store_name`)
pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

/// Recursively normalize every mapping key in `value`
pub fn normalize_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (normalize_key(k), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalize_keys).collect()),
        other => other.clone(),
    }
}

/// Owned variant: avoids cloning leaves when the caller no longer needs the input
pub fn into_normalized(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), into_normalized(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(into_normalized).collect()),
        other => other,
    }
}

/// Two sibling keys that normalize to the same key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    /// Locator of the mapping holding both keys, e.g. `config.inputs[0].paths`
    pub path: String,
    pub first: String,
    pub second: String,
}

/// First key collision in document order, if any
pub fn find_key_collision(value: &Value, root: &str) -> Option<KeyCollision> {
    let mut path = String::from(root);
    collision_in(value, &mut path)
}

fn collision_in(value: &Value, path: &mut String) -> Option<KeyCollision> {
    match value {
        Value::Object(map) => {
            let mut seen: HashMap<String, &str> = HashMap::with_capacity(map.len());
            for key in map.keys() {
                if let Some(first) = seen.insert(normalize_key(key), key) {
                    return Some(KeyCollision {
                        path: path.clone(),
                        first: first.to_string(),
                        second: key.clone(),
                    });
                }
            }
            map.iter().find_map(|(key, child)| {
                let mark = path.len();
                path.push('.');
                path.push_str(key);
                let found = collision_in(child, path);
                path.truncate(mark);
                found
            })
        }
        Value::Array(items) => items.iter().enumerate().find_map(|(idx, child)| {
            let mark = path.len();
            path.push_str(&format!("[{idx}]"));
            let found = collision_in(child, path);
            path.truncate(mark);
            found
        }),
        _ => None,
    }
}
