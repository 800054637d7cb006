//! Binding resolver: attach store root/kind to inputs and outputs
//!
//! Each declared item names its store through `store_name`. Binding looks the
//! name up in the [`StoreRegistry`] and copies the store's root and kind onto
//! the item. A dangling reference or an empty root fails immediately, before
//! any placeholder is substituted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::local_paths;
use crate::lookup::Named;
use crate::normalize::{find_key_collision, normalize_keys};
use crate::paths::{GenericPaths, PathFields};
use crate::store::{StoreKind, StoreRegistry};
use crate::transfer;

/// An input or output bound to its store
///
/// `store_root` and `store_kind` are derived from the registry, never taken
/// from the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundItem<P> {
    pub name: String,
    pub paths: P,
    pub store_name: String,
    pub store_root: String,
    #[serde(rename = "store_type")]
    pub store_kind: StoreKind,
}

/// Declared input
pub type Input<P = GenericPaths> = BoundItem<P>;

/// Declared output
pub type Output<P = GenericPaths> = BoundItem<P>;

/// Fields read before the store lookup
#[derive(Deserialize)]
struct ItemHeader {
    name: String,
    store_name: String,
}

impl<P: PathFields> BoundItem<P> {
    /// Remote location of `field`, e.g. `s3://bucket/models/plan.b01`
    pub fn remote_uri(&self, field: &str) -> Option<String> {
        let relative = self.paths.get(field).filter(|p| !p.is_empty())?;
        Some(transfer::remote_uri(&self.store_kind, &self.store_root, relative))
    }

    /// Working copy whose path fields point at their local counterparts
    ///
    /// The bound item itself is left untouched.
    pub fn localized(&self, local_root: &str, local_prefix: Option<&str>) -> Result<Self> {
        let mut copy = self.clone();
        for (field, local) in local_paths::derive_local_paths(&self.paths, local_root, local_prefix) {
            copy.paths.set(&field, Some(local))?;
        }
        Ok(copy)
    }
}

impl<P> Named for BoundItem<P> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Bind one raw item; `locator` names it in errors (e.g. `outputs[2]`)
pub fn bind_item<P: PathFields>(raw: &Value, registry: &StoreRegistry, locator: &str) -> Result<BoundItem<P>> {
    if let Some(collision) = find_key_collision(raw, locator) {
        return Err(collision.into());
    }
    let item = normalize_keys(raw);

    let header = ItemHeader::deserialize(&item)
        .map_err(|e| ConfigError::malformed(locator, e.to_string()))?;

    let store = registry
        .get(&header.store_name)
        .ok_or_else(|| ConfigError::UnresolvedStoreReference {
            name: header.store_name.clone(),
            item: header.name.clone(),
        })?;

    if store.root().is_empty() {
        return Err(ConfigError::EmptyStoreRoot {
            store: store.name.clone(),
            item: header.name,
        });
    }

    let paths_value = item
        .get("paths")
        .ok_or_else(|| ConfigError::malformed(locator, "missing field `paths`"))?;
    let paths = P::deserialize(paths_value)
        .map_err(|e| ConfigError::malformed(format!("{locator}.paths"), e.to_string()))?;

    debug!(item = %header.name, store = %store.name, kind = %store.kind, "bound item");

    Ok(BoundItem {
        name: header.name,
        paths,
        store_name: header.store_name,
        store_root: store.root().to_string(),
        store_kind: store.kind.clone(),
    })
}

/// Bind every item of a section (`inputs` / `outputs`), stopping at the first failure
pub fn bind_section<P: PathFields>(
    raws: &[Value],
    registry: &StoreRegistry,
    section: &str,
) -> Result<Vec<BoundItem<P>>> {
    raws.iter()
        .enumerate()
        .map(|(idx, raw)| bind_item(raw, registry, &format!("{section}[{idx}]")))
        .collect()
}
