//! Path bags: the named, optional path fields of one input or output
//!
//! Two shapes share the [`PathFields`] capability:
//! - [`GenericPaths`]: open-ended, ordered `field → path` container
//! - [`UnsteadyInputPaths`] / [`UnsteadyOutputPaths`]: fixed field sets used
//!   by the unsteady simulation runner
//!
//! Values are paths relative to the owning store's root.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Field access shared by every path bag
pub trait PathFields: Clone + std::fmt::Debug + Serialize + DeserializeOwned {
    /// Human-readable variant name used in errors
    const VARIANT: &'static str;

    /// Value of `name`, `None` if unset or unknown
    fn get(&self, name: &str) -> Option<&str>;

    /// Set (or clear with `None`) the value of `name`
    fn set(&mut self, name: &str, value: Option<String>) -> Result<()>;

    /// All fields in declaration order, including unset ones
    fn fields(&self) -> Vec<(&str, Option<&str>)>;

    /// Fields holding a non-empty path
    fn present(&self) -> Vec<(&str, &str)> {
        self.fields()
            .into_iter()
            .filter_map(|(name, value)| match value {
                Some(v) if !v.is_empty() => Some((name, v)),
                _ => None,
            })
            .collect()
    }
}

/// Open path bag: any field name is accepted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericPaths {
    entries: IndexMap<String, Option<String>>,
}

impl GenericPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GenericPaths {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

impl PathFields for GenericPaths {
    const VARIANT: &'static str = "generic paths";

    fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|v| v.as_deref())
    }

    fn set(&mut self, name: &str, value: Option<String>) -> Result<()> {
        self.entries.insert(name.to_string(), value);
        Ok(())
    }

    fn fields(&self) -> Vec<(&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
            .collect()
    }
}

/// Generates a fixed-field path bag with `PathFields` dispatch over its fields.
macro_rules! fixed_paths {
    (
        $(#[$meta:meta])*
        $name:ident, $variant:literal {
            $( $(#[$fmeta:meta])* $field:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(default)]
                pub $field: Option<String>,
            )+
        }

        impl PathFields for $name {
            const VARIANT: &'static str = $variant;

            fn get(&self, name: &str) -> Option<&str> {
                match name {
                    $( stringify!($field) => self.$field.as_deref(), )+
                    _ => None,
                }
            }

            fn set(&mut self, name: &str, value: Option<String>) -> Result<()> {
                match name {
                    $( stringify!($field) => self.$field = value, )+
                    _ => {
                        return Err(ConfigError::UnknownPathField {
                            field: name.to_string(),
                            variant: $variant,
                        })
                    }
                }
                Ok(())
            }

            fn fields(&self) -> Vec<(&str, Option<&str>)> {
                vec![ $( (stringify!($field), self.$field.as_deref()), )+ ]
            }
        }
    };
}

fixed_paths! {
    /// Model files consumed by an unsteady simulation run
    UnsteadyInputPaths, "unsteady input paths" {
        b_file,
        o_file,
        tmp_hdf,
        x_file,
    }
}

fixed_paths! {
    /// Files produced by an unsteady simulation run
    UnsteadyOutputPaths, "unsteady output paths" {
        hdf_output,
        #[serde(alias = "rasoutput_log")]
        log,
    }
}
