//! Error types for override loading, schema authoring, and validation.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while building the schema or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading an override source failed.
    #[error("failed to read config source: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// An explicitly requested override source does not exist.
    #[error("config source not found: {}", .0.display())]
    MissingSource(PathBuf),
    /// An override source could not be parsed; nothing from it was applied.
    #[error("failed to parse {source_label}{}: {message} (in `{content}`)", at_line(.line))]
    SourceParse {
        source_label: String,
        line: Option<usize>,
        content: String,
        message: String,
    },
    /// The same key was registered twice in a schema.
    #[error("duplicate schema key: {0}")]
    DuplicateKey(String),
    /// Malformed schema declaration.
    #[error("invalid schema: {0}")]
    Invalid(String),
    /// The merged configuration violated the schema.
    #[error("{0}")]
    Validation(ValidationReport),
}

impl ConfigError {
    pub(crate) fn parse(
        source_label: &str,
        line: Option<usize>,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::SourceParse {
            source_label: source_label.to_string(),
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Violations carried by a validation failure, empty for other errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ConfigError::Validation(report) => &report.violations,
            _ => &[],
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" at line {line}"))
        .unwrap_or_default()
}

/// Every schema violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid configuration ({} violation{}):",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// A single key that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub key: String,
    pub kind: ViolationKind,
    /// Label of the layer that supplied the offending value, if any.
    pub origin: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.kind)?;
        if let Some(origin) = &self.origin {
            write!(f, " (from {origin})")?;
        }
        Ok(())
    }
}

/// What was wrong with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required key has no value after merge.
    Missing,
    /// Key was explicitly cleared but the schema does not allow absence.
    NotNilable,
    /// Value has the wrong type.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Value is empty where text is required.
    Empty,
    /// Value is not a URL of an accepted form.
    InvalidUrl { value: String, reason: String },
    /// URL base path ends with `/`.
    TrailingSlash { value: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => write!(f, "missing required value"),
            ViolationKind::NotNilable => write!(f, "value may not be cleared"),
            ViolationKind::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ViolationKind::Empty => write!(f, "value must not be empty"),
            ViolationKind::InvalidUrl { value, reason } => {
                write!(f, "invalid URL \"{value}\": {reason}")
            }
            ViolationKind::TrailingSlash { value } => {
                write!(f, "\"{value}\" must not end with a trailing slash")
            }
        }
    }
}
