//! Bound job configuration
//!
//! A [`Config`] is built once by the staged pipeline and is read-only after
//! that. [`Config::resolve`] returns a new, fully substituted document; the
//! bound config itself is never rewritten.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::attributes::Attributes;
use crate::binding::{Input, Output};
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::lookup::find_by_name;
use crate::paths::{GenericPaths, PathFields, UnsteadyInputPaths, UnsteadyOutputPaths};
use crate::pipeline::ConfigBuilder;
use crate::store::{Store, StoreRegistry};
use crate::substitute;

/// Bound configuration, generic over the input and output path bags
#[derive(Debug, Clone)]
pub struct Config<IP = GenericPaths, OP = GenericPaths> {
    name: String,
    job_type: String,
    attributes: Attributes,
    inputs: Vec<Input<IP>>,
    outputs: Vec<Output<OP>>,
    stores: StoreRegistry,
    /// Unrecognized top-level fields, carried through resolution
    extra: Map<String, Value>,
}

/// Open-ended paths on both sides
pub type JobConfig = Config<GenericPaths, GenericPaths>;

/// Fixed paths used by the unsteady simulation runner
pub type UnsteadyConfig = Config<UnsteadyInputPaths, UnsteadyOutputPaths>;

impl<IP: PathFields, OP: PathFields> Config<IP, OP> {
    /// Build from a decoded document
    pub fn from_value(raw: &Value) -> Result<Self> {
        Self::from_owned(raw.clone())
    }

    /// Build from a document the caller no longer needs
    pub fn from_owned(raw: Value) -> Result<Self> {
        ConfigBuilder::new(raw).build()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_owned(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_owned(serde_yaml::from_str(text)?)
    }

    pub(crate) fn from_parts(
        name: String,
        job_type: String,
        attributes: Attributes,
        inputs: Vec<Input<IP>>,
        outputs: Vec<Output<OP>>,
        stores: StoreRegistry,
        extra: Map<String, Value>,
    ) -> Self {
        Self {
            name,
            job_type,
            attributes,
            inputs,
            outputs,
            stores,
            extra,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn inputs(&self) -> &[Input<IP>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output<OP>] {
        &self.outputs
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    pub fn input(&self, name: &str) -> Option<&Input<IP>> {
        find_by_name(&self.inputs, name)
    }

    pub fn output(&self, name: &str) -> Option<&Output<OP>> {
        find_by_name(&self.outputs, name)
    }

    pub fn store(&self, name: &str) -> Option<&Store> {
        self.stores.get(name)
    }

    /// Bound document before substitution
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(ConfigError::Encode)
    }

    /// Substitute every `{ATTR:..}` / `{ENV:..}` in the document
    pub fn resolve(&self, environment: &Environment) -> Result<Value> {
        debug!(config = %self.name, "resolving placeholders");
        substitute::resolve(&self.to_value()?, &self.attributes, environment)
    }

    /// Resolve, then rebuild a typed config from the resolved document
    pub fn resolved(&self, environment: &Environment) -> Result<Self> {
        Self::from_owned(self.resolve(environment)?)
    }
}

impl<IP: Serialize, OP: Serialize> Serialize for Config<IP, OP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6 + self.extra.len()))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.job_type)?;
        map.serialize_entry("attributes", &self.attributes)?;
        map.serialize_entry("inputs", &self.inputs)?;
        map.serialize_entry("outputs", &self.outputs)?;
        map.serialize_entry("stores", &self.stores.iter().collect::<Vec<_>>())?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<IP: PathFields, OP: PathFields> TryFrom<&Value> for Config<IP, OP> {
    type Error = ConfigError;

    fn try_from(raw: &Value) -> Result<Self> {
        Self::from_value(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn unsteady_doc() -> Value {
        json!({
            "name": "ras-unsteady",
            "type": "simulation",
            "attributes": { "geom": "01", "plan": "04", "modelPrefix": "Muncie" },
            "inputs": [{
                "name": "ras_model_files",
                "store_name": "s3primary",
                "paths": {
                    "b_file": "models/{ATTR:modelPrefix}.b{ATTR:plan}",
                    "x_file": "models/{ATTR:modelPrefix}.x{ATTR:geom}"
                }
            }],
            "outputs": [{
                "name": "ras_results",
                "store_name": "s3primary",
                "paths": { "hdf_output": "results/{ATTR:modelPrefix}.p{ATTR:plan}.hdf" }
            }],
            "stores": [{ "name": "s3primary", "store_type": "S3", "params": { "root": "ffrd-bucket" } }]
        })
    }

    #[test]
    fn typed_unsteady_config_binds_and_resolves() {
        let config = UnsteadyConfig::from_value(&unsteady_doc()).unwrap();
        assert_eq!(config.job_type(), "simulation");

        let resolved = config.resolved(&Environment::new()).unwrap();
        let input = resolved.input("ras_model_files").unwrap();
        assert_eq!(input.paths.b_file.as_deref(), Some("models/Muncie.b04"));
        assert_eq!(input.paths.x_file.as_deref(), Some("models/Muncie.x01"));
        assert_eq!(input.store_kind, StoreKind::S3);

        let output = resolved.output("ras_results").unwrap();
        assert_eq!(output.paths.hdf_output.as_deref(), Some("results/Muncie.p04.hdf"));
    }

    #[test]
    fn resolve_leaves_bound_config_untouched() {
        let config = JobConfig::from_value(&unsteady_doc()).unwrap();
        let before = config.to_value().unwrap();

        config.resolve(&Environment::new()).unwrap();

        assert_eq!(config.to_value().unwrap(), before);
        assert_eq!(
            config.input("ras_model_files").unwrap().paths.get("b_file"),
            Some("models/{ATTR:modelPrefix}.b{ATTR:plan}")
        );
    }

    #[test]
    fn bound_document_carries_store_fields() {
        let config = JobConfig::from_value(&unsteady_doc()).unwrap();
        let doc = config.to_value().unwrap();

        assert_eq!(doc["inputs"][0]["store_root"], "ffrd-bucket");
        assert_eq!(doc["inputs"][0]["store_type"], "S3");
        assert_eq!(doc["stores"][0]["params"]["root"], "ffrd-bucket");

        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "type", "attributes", "inputs", "outputs", "stores"]);
    }

    #[test]
    fn extra_top_level_fields_are_resolved_too() {
        let mut doc = unsteady_doc();
        doc["description"] = json!("plan {ATTR:plan}");

        let config = JobConfig::from_value(&doc).unwrap();
        let resolved = config.resolve(&Environment::new()).unwrap();
        assert_eq!(resolved["description"], "plan 04");
    }

    #[test]
    fn yaml_and_json_agree() {
        let yaml = r#"
name: job
type: sim
attributes:
  geom: "01"
inputs:
  - name: m
    store-name: fs
    paths:
      x-file: "g.x{ATTR:geom}"
outputs: []
stores:
  - name: fs
    store-type: FS
    params:
      root: /data
"#;
        let from_yaml = JobConfig::from_yaml_str(yaml).unwrap();
        let from_json = JobConfig::from_json_str(
            r#"{"name":"job","type":"sim","attributes":{"geom":"01"},
                "inputs":[{"name":"m","store_name":"fs","paths":{"x_file":"g.x{ATTR:geom}"}}],
                "outputs":[],
                "stores":[{"name":"fs","store_type":"FS","params":{"root":"/data"}}]}"#,
        )
        .unwrap();

        assert_eq!(from_yaml.to_value().unwrap(), from_json.to_value().unwrap());
    }
}
