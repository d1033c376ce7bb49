//! IO helpers for reading override layers from disk.

#[cfg(unix)]
use super::SYSTEM_CONFIG_PATH;
use super::parse::{self, RawPatch};
use super::{ConfigLayerSource, OverrideSource, SourceFormat};
use crate::ConfigError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Read and parse one override source.
pub(super) fn load_source(source: &OverrideSource) -> Result<RawPatch, ConfigError> {
    match source {
        OverrideSource::File(path) => {
            if !path.exists() {
                return Err(ConfigError::MissingSource(path.clone()));
            }
            read_patch(&path.display().to_string(), path)
        }
        OverrideSource::Inline {
            label,
            format,
            contents,
        } => {
            debug!("parsing inline source (label={label}, len={})", contents.len());
            parse_contents(label, *format, contents)
        }
    }
}

/// Read and parse a discovered layer, labelled with its layer kind.
pub(super) fn load_layer(source: ConfigLayerSource, path: &Path) -> Result<RawPatch, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    read_patch(&layer_label(source, path), path)
}

fn read_patch(label: &str, path: &Path) -> Result<RawPatch, ConfigError> {
    // The file is read fully and closed before parsing.
    let contents = fs::read_to_string(path)?;
    parse_contents(label, SourceFormat::for_path(path), &contents)
}

fn parse_contents(
    label: &str,
    format: SourceFormat,
    contents: &str,
) -> Result<RawPatch, ConfigError> {
    match format {
        SourceFormat::Assignments => parse::parse_assignments(label, contents),
        SourceFormat::Json5 => parse::parse_json5(label, contents),
    }
}

/// Build a user-friendly label for parse errors and value origins.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::System => "system",
        ConfigLayerSource::Cwd => "cwd",
        ConfigLayerSource::Runtime => "runtime",
    };
    format!("{name}({})", path.display())
}

/// Default system override path on Unix; None elsewhere.
pub(super) fn default_system_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(SYSTEM_CONFIG_PATH))
    }
    #[cfg(not(unix))]
    {
        None
    }
}
