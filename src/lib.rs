//! jobconf - configuration binding and placeholder resolution for compute jobs
//!
//! A job description names its inputs, outputs and storage backends. This
//! crate turns that description into a bound, typed [`Config`] and resolves
//! `{ATTR:name}` / `{ENV:name}` placeholders anywhere in it.
//!
//! ```text
//! raw document
//!     │ normalize   hyphen-case keys → snake_case
//!     │ parse       name / type / attributes / inputs / outputs / stores
//!     │ register    StoreRegistry (store name → root, kind)
//!     │ bind        store_root / store_type on every input and output
//!     ▼
//!   Config ──resolve(env)──▶ substituted document
//! ```
//!
//! Local path derivation, name lookup and transfer planning are used by the
//! runner on demand; none of them perform I/O.

pub mod attributes;
pub mod binding;
pub mod config;
pub mod environment;
pub mod error;
pub mod local_paths;
pub mod lookup;
pub mod normalize;
pub mod paths;
pub mod pipeline;
pub mod settings;
pub mod store;
pub mod substitute;
pub mod transfer;

pub use attributes::Attributes;
pub use binding::{bind_item, BoundItem, Input, Output};
pub use config::{Config, JobConfig, UnsteadyConfig};
pub use environment::Environment;
pub use error::{ConfigError, FixSuggestion, Result, Stage};
pub use local_paths::derive_local_paths;
pub use lookup::{find_by_name, find_resolved, Named};
pub use normalize::normalize_keys;
pub use paths::{GenericPaths, PathFields, UnsteadyInputPaths, UnsteadyOutputPaths};
pub use pipeline::ConfigBuilder;
pub use settings::Settings;
pub use store::{Store, StoreKind, StoreRegistry};
pub use substitute::{resolve, MissingRef, PlaceholderKind, Resolver};
pub use transfer::{Transfer, TransferPlan};
