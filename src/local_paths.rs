//! Local path derivation
//!
//! Maps every non-empty path field to `local_root[/local_prefix]/<basename>`.
//! Pure string computation: nothing here touches the filesystem.

use indexmap::IndexMap;

use crate::paths::PathFields;

/// Final segment of a `/`-separated path, ignoring trailing slashes
///
/// `"models/geo/plan.b01"` → `"plan.b01"`, `"dir/"` → `"dir"`.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, name)) => name,
        None => trimmed,
    }
}

/// Join two segments with exactly one `/` between them
///
/// The separator is always written, so an empty `base` yields `/rest`.
pub fn join(base: &str, rest: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        rest.trim_start_matches('/')
    )
}

/// Local path for one remote-relative path
pub fn local_path_for(remote: &str, local_root: &str, local_prefix: Option<&str>) -> String {
    let name = basename(remote);
    match local_prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => join(&join(local_root, prefix), name),
        None => join(local_root, name),
    }
}

/// Derive `field → local path` for every non-empty field, in field order
pub fn derive_local_paths<P: PathFields>(
    paths: &P,
    local_root: &str,
    local_prefix: Option<&str>,
) -> IndexMap<String, String> {
    paths
        .present()
        .into_iter()
        .map(|(field, remote)| {
            (field.to_string(), local_path_for(remote, local_root, local_prefix))
        })
        .collect()
}
