//! Placeholder substitution: `{ATTR:name}` and `{ENV:name}`
//!
//! Walks every string in a JSON structure and replaces placeholders:
//! - `{ATTR:name}` → value of attribute `name`
//! - `{ENV:name}`  → value of variable `name` in the environment snapshot
//!
//! Resolution is single-pass per occurrence: substituted text is never
//! scanned again, so a value that itself looks like a placeholder stays
//! literal. Unresolved references are collected across the whole traversal
//! (document order) and reported together.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::attributes::Attributes;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};

/// Locator prefix for the document root
pub const ROOT_PATH: &str = "config";

/// Pre-compiled regex for `{ATTR:name}` / `{ENV:name}`
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(ATTR|ENV):([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex is valid")
});

/// Placeholder source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaceholderKind {
    Attr,
    Env,
}

impl PlaceholderKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "ATTR" => PlaceholderKind::Attr,
            _ => PlaceholderKind::Env,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderKind::Attr => "ATTR",
            PlaceholderKind::Env => "ENV",
        }
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unresolved placeholder occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MissingRef {
    pub kind: PlaceholderKind,
    pub name: String,
    /// Dotted/bracketed locator, e.g. `config.outputs[2].paths.hdf_output`
    pub path: String,
}

impl fmt::Display for MissingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} at {}", self.kind, self.name, self.path)
    }
}

/// Does `text` contain at least one well-formed placeholder?
pub fn has_placeholders(text: &str) -> bool {
    text.contains('{') && PLACEHOLDER_RE.is_match(text)
}

/// Resolves placeholders against one attribute bag and one environment snapshot
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    attributes: &'a Attributes,
    environment: &'a Environment,
}

impl<'a> Resolver<'a> {
    pub fn new(attributes: &'a Attributes, environment: &'a Environment) -> Self {
        Self {
            attributes,
            environment,
        }
    }

    /// Substitute placeholders in one string, recording misses under `path`
    ///
    /// Returns `Cow::Borrowed` when the string holds no placeholders.
    /// Missing references keep their literal placeholder text.
    pub fn substitute_str<'s>(
        &self,
        text: &'s str,
        path: &str,
        missing: &mut Vec<MissingRef>,
    ) -> Cow<'s, str> {
        if !has_placeholders(text) {
            return Cow::Borrowed(text);
        }

        let mut result = String::with_capacity(text.len() + 32);
        let mut last_end = 0;

        for cap in PLACEHOLDER_RE.captures_iter(text) {
            let Some(m) = cap.get(0) else { continue };
            let kind = PlaceholderKind::from_tag(&cap[1]);
            let name = &cap[2];

            result.push_str(&text[last_end..m.start()]);

            let value = match kind {
                PlaceholderKind::Attr => self.attributes.get(name),
                PlaceholderKind::Env => self.environment.get(name).map(Cow::Borrowed),
            };

            match value {
                Some(v) => result.push_str(&v),
                None => {
                    missing.push(MissingRef {
                        kind,
                        name: name.to_string(),
                        path: path.to_string(),
                    });
                    result.push_str(m.as_str());
                }
            }

            last_end = m.end();
        }

        result.push_str(&text[last_end..]);
        Cow::Owned(result)
    }

    /// Resolve every string in `structure`, failing with all misses at once
    pub fn resolve(&self, structure: &Value, root: &str) -> Result<Value> {
        let mut missing = Vec::new();
        let mut path = String::from(root);
        let resolved = self.walk(structure, &mut path, &mut missing);

        if missing.is_empty() {
            debug!(root, "placeholders resolved");
            Ok(resolved)
        } else {
            warn!(count = missing.len(), "unresolved placeholders");
            Err(ConfigError::UnresolvedPlaceholders { missing })
        }
    }

    fn walk(&self, value: &Value, path: &mut String, missing: &mut Vec<MissingRef>) -> Value {
        match value {
            Value::String(s) => {
                Value::String(self.substitute_str(s, path, missing).into_owned())
            }
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    let mark = path.len();
                    path.push('.');
                    path.push_str(key);
                    out.insert(key.clone(), self.walk(child, path, missing));
                    path.truncate(mark);
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, child) in items.iter().enumerate() {
                    let mark = path.len();
                    path.push('[');
                    path.push_str(&idx.to_string());
                    path.push(']');
                    out.push(self.walk(child, path, missing));
                    path.truncate(mark);
                }
                Value::Array(out)
            }
            other => other.clone(),
        }
    }
}

/// Resolve a whole structure rooted at [`ROOT_PATH`]
pub fn resolve(structure: &Value, attributes: &Attributes, environment: &Environment) -> Result<Value> {
    Resolver::new(attributes, environment).resolve(structure, ROOT_PATH)
}

/// Resolve a single string, reporting misses at `path`
pub fn resolve_str(
    text: &str,
    path: &str,
    attributes: &Attributes,
    environment: &Environment,
) -> Result<String> {
    let mut missing = Vec::new();
    let resolved = Resolver::new(attributes, environment).substitute_str(text, path, &mut missing);
    if missing.is_empty() {
        Ok(resolved.into_owned())
    } else {
        Err(ConfigError::UnresolvedPlaceholders { missing })
    }
}
