//! Environment snapshot for `{ENV:name}` substitution
//!
//! The engine never reads the process environment on its own: callers take
//! a snapshot once (usually [`Environment::from_process`]) and pass it in.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_lookup() {
        let env = Environment::new().with("PROJ_ROOT", "/data").with("EMPTY", "");
        assert_eq!(env.get("PROJ_ROOT"), Some("/data"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get("MISSING"), None);
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn process_snapshot_sees_path() {
        // PATH is set in every test harness we run under
        let env = Environment::from_process();
        assert_eq!(env.get("PATH").map(str::to_string), std::env::var("PATH").ok());
    }
}
