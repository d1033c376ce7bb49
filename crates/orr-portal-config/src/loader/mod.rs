//! Layered override loading and the resolve pipeline.
//!
//! Discovers override layers (system, cwd, explicit runtime paths), parses
//! each into a patch, merges the patches over the schema defaults, validates
//! the result, and produces one immutable `ResolvedConfig`.

mod layer_io;
mod merge;
mod parse;
mod utils;
mod validate;

#[cfg(test)]
mod tests;

pub use merge::{MergedEntry, merge_patches};
pub use parse::{PatchEntry, RawPatch, parse_assignments, parse_json5};
pub use validate::{UnknownOverrideKey, validate_merged};

use crate::defaults::defaults_for;
use crate::schema::SchemaRegistry;
use crate::{ConfigError, ResolvedConfig};
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default override filename in local layers.
pub const DEFAULT_CONFIG_FILE: &str = "local.config.js";

#[cfg(unix)]
/// Default system override path on Unix.
const SYSTEM_CONFIG_PATH: &str = "/etc/orr-portal/local.config.js";

/// Syntax of an override source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `<namespace>.<field> = <value>` statements.
    Assignments,
    /// Nested JSON5 object.
    Json5,
}

impl SourceFormat {
    /// Pick a format from the file extension; assignments unless `.json5`/`.json`.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json5") | Some("json") => SourceFormat::Json5,
            _ => SourceFormat::Assignments,
        }
    }
}

/// One override source, either on disk or in memory.
#[derive(Debug, Clone)]
pub enum OverrideSource {
    File(PathBuf),
    Inline {
        label: String,
        format: SourceFormat,
        contents: String,
    },
}

impl OverrideSource {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OverrideSource::File(path.as_ref().to_path_buf())
    }

    /// In-memory assignment statements.
    pub fn inline(label: impl Into<String>, contents: impl Into<String>) -> Self {
        OverrideSource::Inline {
            label: label.into(),
            format: SourceFormat::Assignments,
            contents: contents.into(),
        }
    }
}

/// Parse every source in order, failing on the first one that cannot be read
/// or parsed. Later patches take precedence.
pub fn load_sources(sources: &[OverrideSource]) -> Result<Vec<RawPatch>, ConfigError> {
    sources.iter().map(layer_io::load_source).collect()
}

/// Resolve a fixed source list against a schema.
pub fn resolve(
    schema: &SchemaRegistry,
    sources: &[OverrideSource],
) -> Result<Resolution, ConfigError> {
    let patches = load_sources(sources)?;
    resolve_patches(schema, &patches, Vec::new())
}

fn resolve_patches(
    schema: &SchemaRegistry,
    patches: &[RawPatch],
    layers: Vec<ConfigLayer>,
) -> Result<Resolution, ConfigError> {
    let defaults = defaults_for(schema);
    let merged = merge_patches(&defaults, patches);
    debug!(
        "merged config (defaults={}, patches={}, keys={})",
        defaults.len(),
        patches.len(),
        merged.len()
    );
    let (config, warnings) = validate_merged(&merged, schema)?;
    info!(
        "config resolved (keys={}, warnings={})",
        schema.len(),
        warnings.len()
    );
    Ok(Resolution {
        config: Arc::new(config),
        layers,
        warnings,
    })
}

/// Resolved config plus metadata about how it was produced.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The merged, validated config, shared read-only with consumers.
    pub config: Arc<ResolvedConfig>,
    /// Layers that contributed, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
    /// Keys present in overrides but unknown to the schema.
    pub warnings: Vec<UnknownOverrideKey>,
}

/// Origin of a layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Deployment-wide override file.
    System,
    /// `local.config.js` in the working directory.
    Cwd,
    /// Explicitly requested sources (highest precedence).
    Runtime,
}

/// Metadata about a loaded layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layer discovery.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Working directory used for the cwd layer and relative runtime paths.
    pub cwd: PathBuf,
    /// Optional system override path (defaults to `/etc/orr-portal/local.config.js` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// Whether to pick up `local.config.js` from `cwd`.
    pub discover_cwd: bool,
    /// Explicit sources applied last, in order. These must exist.
    pub runtime_paths: Vec<PathBuf>,
}

impl ResolveOptions {
    /// Create options with the default layer locations for `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_config_path(),
            discover_cwd: true,
            runtime_paths: Vec::new(),
        }
    }

    /// Only the explicitly added runtime paths are consulted.
    pub fn explicit_only(cwd: impl AsRef<Path>) -> Self {
        Self {
            system_config_path: None,
            discover_cwd: false,
            ..Self::new(cwd)
        }
    }

    /// Add a runtime override path applied after all discovered layers.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl ResolvedConfig {
    /// Resolve the portal schema from a single source on disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Resolution, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        resolve(&SchemaRegistry::portal(), &[OverrideSource::file(path)])
    }

    /// Resolve the portal schema from in-memory assignment statements.
    pub fn load_from_str(contents: &str) -> Result<Resolution, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        resolve(
            &SchemaRegistry::portal(),
            &[OverrideSource::inline("inline", contents)],
        )
    }

    /// Resolve the portal schema from the default layer stack.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<Resolution, ConfigError> {
        Self::load_layered_with_options(&SchemaRegistry::portal(), ResolveOptions::new(cwd))
    }

    /// Resolve a schema from an explicit layer stack.
    ///
    /// Layer precedence (low -> high): defaults, system, cwd, runtime paths in
    /// the order given. A file reached more than once is applied once, at its
    /// last (highest-precedence) position.
    pub fn load_layered_with_options(
        schema: &SchemaRegistry,
        options: ResolveOptions,
    ) -> Result<Resolution, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        debug!("normalized cwd for config load: {}", cwd.display());
        let mut layers = Vec::new();
        let mut patches = Vec::new();
        let mut seen_paths = HashSet::new();

        let mut candidates: Vec<(ConfigLayerSource, PathBuf, bool)> = Vec::new();
        if let Some(path) = options.system_config_path {
            candidates.push((ConfigLayerSource::System, path, false));
        }
        if options.discover_cwd {
            candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE), false));
        }
        for path in options.runtime_paths {
            let path = if path.is_relative() {
                cwd.join(path)
            } else {
                path
            };
            candidates.push((ConfigLayerSource::Runtime, path, true));
        }

        let mut present = Vec::new();
        for (source, path, required) in candidates {
            if !path.exists() {
                if required {
                    return Err(ConfigError::MissingSource(path));
                }
                debug!(
                    "optional layer missing (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            present.push((source, path));
        }

        // A repeated file keeps only its highest-precedence position.
        let mut kept = Vec::new();
        for (source, path) in present.into_iter().rev() {
            if !seen_paths.insert(utils::unique_path(&path)) {
                debug!(
                    "skipping shadowed duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            kept.push((source, path));
        }
        kept.reverse();

        for (source, path) in kept {
            let patch = layer_io::load_layer(source, &path)?;
            debug!(
                "loaded layer (source={:?}, path={}, entries={})",
                source,
                path.display(),
                patch.entries.len()
            );
            layers.push(ConfigLayer { source, path });
            patches.push(patch);
        }

        let resolution = resolve_patches(schema, &patches, layers)?;
        info!("layered config loaded (layers={})", resolution.layers.len());
        Ok(resolution)
    }
}
