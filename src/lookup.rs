//! Name index: first-match lookup of inputs, outputs and stores by name
//!
//! Names are expected to be unique within a collection but this is not
//! enforced here; the first declared match wins.

use serde_json::Value;

use crate::store::Store;

/// Anything addressable by its declared name
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Store {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Linear scan, first match wins
pub fn find_by_name<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    items.iter().find(|item| item.name() == name)
}

/// Same lookup on a resolved document: `section` is `inputs` or `outputs`
pub fn find_resolved<'a>(document: &'a Value, section: &str, name: &str) -> Option<&'a Value> {
    document
        .get(section)?
        .as_array()?
        .iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
}
