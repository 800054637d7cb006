//! Staged construction: normalize → parse → register → bind
//!
//! Each stage is its own type and returns a `Result`, so a failure is tied
//! to the stage that produced it and later stages never run.
//!
//! ```text
//! raw Value ──normalize──▶ Normalized ──parse──▶ Parsed ──register──▶ Registered ──bind──▶ Config
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::attributes::{value_kind, Attributes};
use crate::binding::bind_section;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::normalize::{find_key_collision, into_normalized};
use crate::substitute::ROOT_PATH;
use crate::paths::PathFields;
use crate::store::{Store, StoreRegistry};

/// Entry point of the pipeline; owns the raw document
pub struct ConfigBuilder {
    raw: Value,
}

impl ConfigBuilder {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Rewrite hyphenated keys; the document root must be an object
    ///
    /// Keys that would collapse into one (`b-file` next to `b_file`) are
    /// rejected rather than silently merged.
    pub fn normalize(self) -> Result<Normalized> {
        if let Some(collision) = find_key_collision(&self.raw, ROOT_PATH) {
            return Err(collision.into());
        }

        match into_normalized(self.raw) {
            Value::Object(document) => Ok(Normalized { document }),
            other => Err(ConfigError::malformed(
                "config",
                format!("expected an object, got {}", value_kind(&other)),
            )),
        }
    }

    /// Run every stage
    pub fn build<IP: PathFields, OP: PathFields>(self) -> Result<Config<IP, OP>> {
        self.normalize()?.parse()?.register()?.bind()
    }
}

/// Key-normalized document
#[derive(Debug, Clone)]
pub struct Normalized {
    document: Map<String, Value>,
}

impl Normalized {
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Split the document into its typed top-level parts
    pub fn parse(mut self) -> Result<Parsed> {
        let name = take_string(&mut self.document, "name")?;
        let job_type = take_string(&mut self.document, "type")?;

        let attributes = match self.document.shift_remove("attributes") {
            Some(value) => Attributes::from_value(&value)?,
            None => Attributes::new(),
        };

        let inputs = take_array(&mut self.document, "inputs")?;
        let outputs = take_array(&mut self.document, "outputs")?;
        let stores = take_array(&mut self.document, "stores")?
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                Store::deserialize(raw)
                    .map_err(|e| ConfigError::malformed(format!("stores[{idx}]"), e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            config = %name,
            inputs = inputs.len(),
            outputs = outputs.len(),
            stores = stores.len(),
            "parsed configuration"
        );

        Ok(Parsed {
            name,
            job_type,
            attributes,
            inputs,
            outputs,
            stores,
            extra: self.document,
        })
    }
}

/// Top-level parts; inputs/outputs are still raw
#[derive(Debug, Clone)]
pub struct Parsed {
    name: String,
    job_type: String,
    attributes: Attributes,
    inputs: Vec<Value>,
    outputs: Vec<Value>,
    stores: Vec<Store>,
    extra: Map<String, Value>,
}

impl Parsed {
    /// Build the store registry
    pub fn register(self) -> Result<Registered> {
        let registry = StoreRegistry::from_stores(self.stores)?;
        Ok(Registered {
            name: self.name,
            job_type: self.job_type,
            attributes: self.attributes,
            inputs: self.inputs,
            outputs: self.outputs,
            registry,
            extra: self.extra,
        })
    }
}

/// Parsed document with its store registry
#[derive(Debug, Clone)]
pub struct Registered {
    name: String,
    job_type: String,
    attributes: Attributes,
    inputs: Vec<Value>,
    outputs: Vec<Value>,
    registry: StoreRegistry,
    extra: Map<String, Value>,
}

impl Registered {
    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Bind inputs and outputs to their stores
    pub fn bind<IP: PathFields, OP: PathFields>(self) -> Result<Config<IP, OP>> {
        let inputs = bind_section::<IP>(&self.inputs, &self.registry, "inputs")?;
        let outputs = bind_section::<OP>(&self.outputs, &self.registry, "outputs")?;

        Ok(Config::from_parts(
            self.name,
            self.job_type,
            self.attributes,
            inputs,
            outputs,
            self.registry,
            self.extra,
        ))
    }
}

fn take_string(document: &mut Map<String, Value>, field: &str) -> Result<String> {
    match document.shift_remove(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ConfigError::malformed(
            field,
            format!("expected a string, got {}", value_kind(&other)),
        )),
        None => Err(ConfigError::malformed(field, "missing required field")),
    }
}

/// Absent or null sections are empty
fn take_array(document: &mut Map<String, Value>, field: &str) -> Result<Vec<Value>> {
    match document.shift_remove(field) {
        Some(Value::Array(items)) => Ok(items),
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(other) => Err(ConfigError::malformed(
            field,
            format!("expected an array, got {}", value_kind(&other)),
        )),
    }
}
