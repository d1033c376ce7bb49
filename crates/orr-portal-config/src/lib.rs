//! Deployment configuration for the ontology registry portal.
//!
//! This crate owns the portal config schema, built-in defaults, override
//! parsing, layer merging, and validation. Consumers receive a single
//! read-only `ResolvedConfig` that is produced once at startup.

mod defaults;
mod error;
mod loader;
mod model;
pub mod schema;
mod value;

pub use defaults::defaults_for;
/// Public error types returned by schema, loading, and validation APIs.
pub use error::{ConfigError, ValidationReport, Violation, ViolationKind};
/// Override sources, layering options, and the resolve pipeline.
pub use loader::{
    ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_FILE, MergedEntry, OverrideSource, PatchEntry,
    RawPatch, Resolution, ResolveOptions, SourceFormat, UnknownOverrideKey, load_sources, merge_patches,
    parse_assignments, parse_json5, resolve, validate_merged,
};
/// Read-only facade and namespace views.
pub use model::{BrandingView, FirebaseView, OrrontView, PortalView, RecaptchaView, ResolvedConfig};
pub use schema::{ConfigKey, ConfigValueSpec, FormatRule, SchemaRegistry, UrlForm, ValueKind};
pub use value::{ConfigValue, RawValue};
