//! Attribute bag for `{ATTR:name}` substitution

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Ordered `name → value` attributes, immutable once the config is built
///
/// Original JSON values are kept for serialization. `null` is an explicitly
/// absent value: it is listed by [`Attributes::names`] but never substitutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes {
    values: IndexMap<String, Value>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a decoded `attributes:` object
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(ConfigError::malformed(
                    "attributes",
                    format!("expected an object, got {}", value_kind(other)),
                ))
            }
        };

        Ok(Self {
            values: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }

    /// Substitutable text of `name`; `None` if missing or null
    pub fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        self.values.get(name).and_then(scalar_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Attributes::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Text form of an attribute value (strings verbatim, other values as compact JSON)
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
