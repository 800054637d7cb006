//! Error types with fix suggestions
//!
//! Error code ranges:
//! - JOBCONF-000-009: Document/structure errors
//! - JOBCONF-010-019: Store registry and binding errors
//! - JOBCONF-020-029: Placeholder errors
//! - JOBCONF-030-049: Runner-side errors (local files, settings)
//! - JOBCONF-090-099: IO and internal encoding errors

use serde::Serialize;
use thiserror::Error;

use crate::normalize::KeyCollision;
use crate::substitute::MissingRef;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Register,
    Bind,
    Substitute,
    Runner,
    Internal,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Parse => write!(f, "parse"),
            Stage::Register => write!(f, "register"),
            Stage::Bind => write!(f, "bind"),
            Stage::Substitute => write!(f, "substitute"),
            Stage::Runner => write!(f, "runner"),
            Stage::Internal => write!(f, "internal"),
        }
    }
}

/// Join missing references into the `Missing ATTR ...; Missing ENV ...` message.
fn format_missing(missing: &[MissingRef]) -> String {
    use crate::substitute::PlaceholderKind;

    let render = |kind: PlaceholderKind| {
        missing
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
    };

    let attrs = render(PlaceholderKind::Attr);
    let envs = render(PlaceholderKind::Env);

    let mut parts = Vec::new();
    if !attrs.is_empty() {
        parts.push(format!("Missing ATTR references: {}", attrs.join(", ")));
    }
    if !envs.is_empty() {
        parts.push(format!("Missing ENV references: {}", envs.join(", ")));
    }
    parts.join("; ")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    // ─────────────────────────────────────────────────────────────
    // Document errors (JOBCONF-000 to JOBCONF-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[JOBCONF-001] Malformed structure at '{field}': {reason}")]
    MalformedStructure { field: String, reason: String },

    #[error("[JOBCONF-002] JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("[JOBCONF-003] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ─────────────────────────────────────────────────────────────
    // Store/binding errors (JOBCONF-010 to JOBCONF-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[JOBCONF-010] Store '{name}' is declared more than once")]
    DuplicateStore { name: String },

    #[error("[JOBCONF-011] Store root not found for '{item}' with store_name '{name}'")]
    UnresolvedStoreReference { name: String, item: String },

    #[error("[JOBCONF-012] Store '{store}' referenced by '{item}' has an empty root")]
    EmptyStoreRoot { store: String, item: String },

    #[error("[JOBCONF-013] Unknown path field '{field}' for {variant}")]
    UnknownPathField { field: String, variant: &'static str },

    // ─────────────────────────────────────────────────────────────
    // Placeholder errors (JOBCONF-020 to JOBCONF-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[JOBCONF-020] {}", format_missing(.missing))]
    UnresolvedPlaceholders { missing: Vec<MissingRef> },

    // ─────────────────────────────────────────────────────────────
    // Runner-side errors (JOBCONF-030 to JOBCONF-049)
    // ─────────────────────────────────────────────────────────────
    #[error("[JOBCONF-030] Local file not found for '{name}': {path}")]
    LocalFileMissing { name: String, path: String },

    #[error("[JOBCONF-031] No {section} named '{name}' in configuration")]
    ItemNotFound { section: &'static str, name: String },

    #[error("[JOBCONF-040] Settings error: {reason}")]
    Settings { reason: String },

    #[error("[JOBCONF-090] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[JOBCONF-091] Failed to encode document: {0}")]
    Encode(serde_json::Error),
}

impl ConfigError {
    /// Short error code, e.g. `JOBCONF-011`
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::MalformedStructure { .. } => "JOBCONF-001",
            ConfigError::JsonParse(_) => "JOBCONF-002",
            ConfigError::YamlParse(_) => "JOBCONF-003",
            ConfigError::DuplicateStore { .. } => "JOBCONF-010",
            ConfigError::UnresolvedStoreReference { .. } => "JOBCONF-011",
            ConfigError::EmptyStoreRoot { .. } => "JOBCONF-012",
            ConfigError::UnknownPathField { .. } => "JOBCONF-013",
            ConfigError::UnresolvedPlaceholders { .. } => "JOBCONF-020",
            ConfigError::LocalFileMissing { .. } => "JOBCONF-030",
            ConfigError::ItemNotFound { .. } => "JOBCONF-031",
            ConfigError::Settings { .. } => "JOBCONF-040",
            ConfigError::Io(_) => "JOBCONF-090",
            ConfigError::Encode(_) => "JOBCONF-091",
        }
    }

    /// Pipeline stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            ConfigError::MalformedStructure { .. }
            | ConfigError::JsonParse(_)
            | ConfigError::YamlParse(_) => Stage::Parse,
            ConfigError::DuplicateStore { .. } => Stage::Register,
            ConfigError::UnresolvedStoreReference { .. }
            | ConfigError::EmptyStoreRoot { .. }
            | ConfigError::UnknownPathField { .. } => Stage::Bind,
            ConfigError::UnresolvedPlaceholders { .. } => Stage::Substitute,
            ConfigError::LocalFileMissing { .. }
            | ConfigError::ItemNotFound { .. }
            | ConfigError::Settings { .. }
            | ConfigError::Io(_) => Stage::Runner,
            ConfigError::Encode(_) => Stage::Internal,
        }
    }

    /// Missing placeholder references, empty for every other variant
    pub fn missing_refs(&self) -> &[MissingRef] {
        match self {
            ConfigError::UnresolvedPlaceholders { missing } => missing,
            _ => &[],
        }
    }

    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedStructure {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<KeyCollision> for ConfigError {
    fn from(collision: KeyCollision) -> Self {
        ConfigError::malformed(
            collision.path,
            format!(
                "keys '{}' and '{}' normalize to the same name",
                collision.first, collision.second
            ),
        )
    }
}

impl FixSuggestion for ConfigError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ConfigError::MalformedStructure { .. } => {
                Some("Check the document shape: attributes is an object, inputs/outputs/stores are arrays")
            }
            ConfigError::JsonParse(_) => Some("Check JSON syntax: quoting and trailing commas"),
            ConfigError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ConfigError::DuplicateStore { .. } => Some("Give every entry in stores: a unique name"),
            ConfigError::UnresolvedStoreReference { .. } => {
                Some("Declare the store in stores: or fix the store_name reference")
            }
            ConfigError::EmptyStoreRoot { .. } => Some("Set params.root on the store"),
            ConfigError::UnknownPathField { .. } => {
                Some("Use one of the declared path fields, or the generic paths form")
            }
            ConfigError::UnresolvedPlaceholders { .. } => {
                Some("Add the missing names to attributes: or export the environment variables")
            }
            ConfigError::LocalFileMissing { .. } => {
                Some("Check the simulation produced the file under the local root")
            }
            ConfigError::ItemNotFound { .. } => Some("Check the name against inputs:/outputs:"),
            ConfigError::Settings { .. } => Some("Check the settings file is valid TOML"),
            ConfigError::Io(_) => Some("Check file path and permissions"),
            ConfigError::Encode(_) => Some("Attribute and path values must be JSON-encodable"),
        }
    }
}
