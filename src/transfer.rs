//! Transfer planning for the runner's download/upload commands
//!
//! The engine only computes `(name, source, destination)` triples for
//! downloads, uploads and local copies. Running them is the caller's job.
//! Existence checks take a caller-supplied predicate so nothing here does I/O.

use serde::Serialize;

use crate::binding::BoundItem;
use crate::error::{ConfigError, Result};
use crate::local_paths::{basename, join, local_path_for};
use crate::paths::PathFields;
use crate::store::StoreKind;

/// Remote location of `relative` inside a store
///
/// S3 stores get an `s3://` scheme (added once, even if the root already
/// carries it); every other kind is a plain joined path.
pub fn remote_uri(kind: &StoreKind, root: &str, relative: &str) -> String {
    match kind {
        StoreKind::S3 => {
            let bucket_path = root.strip_prefix("s3://").unwrap_or(root);
            format!("s3://{}", join(bucket_path, relative))
        }
        StoreKind::Filesystem | StoreKind::Other(_) => join(root, relative),
    }
}

/// One transfer command: logical name plus source and destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub name: String,
    pub source: String,
    pub destination: String,
}

/// Ordered list of transfers for one input or output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransferPlan {
    transfers: Vec<Transfer>,
}

impl TransferPlan {
    /// Downloads for an input: remote file → `local_root/<relative path>`
    ///
    /// The relative layout is kept so model files that reference each other
    /// by relative path still line up locally.
    pub fn download<P: PathFields>(item: &BoundItem<P>, local_root: &str) -> Self {
        let transfers = item
            .paths
            .present()
            .into_iter()
            .map(|(field, relative)| Transfer {
                name: field.to_string(),
                source: remote_uri(&item.store_kind, &item.store_root, relative),
                destination: join(local_root, relative),
            })
            .collect();
        Self { transfers }
    }

    /// Uploads for an output: `local_root[/prefix]/<basename>` → remote file
    pub fn upload<P: PathFields>(item: &BoundItem<P>, local_root: &str, local_prefix: Option<&str>) -> Self {
        let transfers = item
            .paths
            .present()
            .into_iter()
            .map(|(field, relative)| Transfer {
                name: field.to_string(),
                source: local_path_for(relative, local_root, local_prefix),
                destination: remote_uri(&item.store_kind, &item.store_root, relative),
            })
            .collect();
        Self { transfers }
    }

    /// Local copies for an output: `local_root[/prefix]/<basename>` → `destination_dir/<basename>`
    pub fn copy<P: PathFields>(
        item: &BoundItem<P>,
        local_root: &str,
        local_prefix: Option<&str>,
        destination_dir: &str,
    ) -> Self {
        let transfers = item
            .paths
            .present()
            .into_iter()
            .map(|(field, relative)| Transfer {
                name: field.to_string(),
                source: local_path_for(relative, local_root, local_prefix),
                destination: join(destination_dir, basename(relative)),
            })
            .collect();
        Self { transfers }
    }

    /// Fail with `LocalFileMissing` for the first source `exists` rejects
    ///
    /// Used before uploads and copies.
    pub fn check_sources(&self, exists: impl Fn(&str) -> bool) -> Result<()> {
        first_missing(self.transfers.iter().map(|t| (t, t.source.as_str())), exists)
    }

    /// Fail with `LocalFileMissing` for the first destination `exists` rejects
    ///
    /// Used after downloads, to confirm every input landed locally.
    pub fn check_destinations(&self, exists: impl Fn(&str) -> bool) -> Result<()> {
        first_missing(self.transfers.iter().map(|t| (t, t.destination.as_str())), exists)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

fn first_missing<'a>(
    mut candidates: impl Iterator<Item = (&'a Transfer, &'a str)>,
    exists: impl Fn(&str) -> bool,
) -> Result<()> {
    match candidates.find(|(_, path)| !exists(path)) {
        Some((t, path)) => Err(ConfigError::LocalFileMissing {
            name: t.name.clone(),
            path: path.to_string(),
        }),
        None => Ok(()),
    }
}
