//! Store registry: store name → (root, kind)
//!
//! Built once from the declared `stores:` list and read-only afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Storage backend kind
///
/// Unknown kinds are kept verbatim so new backends pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKind {
    S3,
    Filesystem,
    Other(String),
}

impl StoreKind {
    /// Parse the wire name (`store_type`), case-insensitive for known kinds
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "S3" => StoreKind::S3,
            "FS" | "FILESYSTEM" | "LOCAL" => StoreKind::Filesystem,
            _ => StoreKind::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StoreKind::S3 => "S3",
            StoreKind::Filesystem => "FILESYSTEM",
            StoreKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StoreKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StoreKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(StoreKind::from_wire(&raw))
    }
}

/// Store parameters (`params:` block)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreParams {
    pub root: String,
    /// Backend-specific extras, carried through unchanged
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A named storage backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    #[serde(rename = "store_type")]
    pub kind: StoreKind,
    pub params: StoreParams,
}

impl Store {
    pub fn new(name: impl Into<String>, kind: StoreKind, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            params: StoreParams {
                root: root.into(),
                extra: IndexMap::new(),
            },
        }
    }

    pub fn root(&self) -> &str {
        &self.params.root
    }
}

/// Name-indexed, declaration-ordered store lookup
#[derive(Debug, Clone, Default)]
pub struct StoreRegistry {
    stores: IndexMap<String, Store>,
}

impl StoreRegistry {
    /// Build the registry, rejecting duplicate store names
    pub fn from_stores(stores: impl IntoIterator<Item = Store>) -> Result<Self> {
        let mut registry = IndexMap::new();
        for store in stores {
            if registry.contains_key(&store.name) {
                return Err(ConfigError::DuplicateStore { name: store.name });
            }
            debug!(store = %store.name, kind = %store.kind, "registered store");
            registry.insert(store.name.clone(), store);
        }
        Ok(Self { stores: registry })
    }

    pub fn get(&self, name: &str) -> Option<&Store> {
        self.stores.get(name)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Stores in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Store> {
        self.stores.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.stores.keys().map(String::as_str).collect()
    }
}
