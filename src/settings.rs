//! Runner settings
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Command-line flags
//! 2. Environment variables (`JOBCONF_LOCAL_ROOT`, `JOBCONF_LOCAL_PREFIX`)
//! 3. Settings file (`--settings <file>`, TOML)
//! 4. Defaults

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::{ConfigError, Result};

pub const LOCAL_ROOT_ENV: &str = "JOBCONF_LOCAL_ROOT";
pub const LOCAL_PREFIX_ENV: &str = "JOBCONF_LOCAL_PREFIX";

/// Default local working directory, matching the runner container layout
pub const DEFAULT_LOCAL_ROOT: &str = "/mnt";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory files are downloaded to and uploaded from
    pub local_root: String,

    /// Optional sub-directory under `local_root` for derived output paths
    pub local_prefix: Option<String>,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            local_root: DEFAULT_LOCAL_ROOT.to_string(),
            local_prefix: None,
            pretty: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConfigError::Settings {
            reason: format!("Failed to parse settings: {}", e),
        })
    }

    /// Load settings from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Settings {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;

        Self::from_toml_str(&content)
    }

    /// Apply overrides from the environment snapshot
    pub fn with_env(mut self, environment: &Environment) -> Self {
        if let Some(root) = environment.get(LOCAL_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.local_root = root.to_string();
        }
        if let Some(prefix) = environment.get(LOCAL_PREFIX_ENV).filter(|v| !v.is_empty()) {
            self.local_prefix = Some(prefix.to_string());
        }
        self
    }

    pub fn local_prefix(&self) -> Option<&str> {
        self.local_prefix.as_deref()
    }
}
