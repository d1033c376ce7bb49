//! Validation of the merged mapping against the schema registry.
//!
//! All violations are collected before failing so a deployer sees every
//! problem in one pass. Keys the schema does not declare are reported as
//! warnings and dropped.

use super::merge::MergedEntry;
use crate::error::{ValidationReport, Violation, ViolationKind};
use crate::schema::{ConfigKey, ConfigValueSpec, FormatRule, SchemaRegistry, UrlForm, ValueKind};
use crate::value::{ConfigValue, RawValue};
use crate::{ConfigError, ResolvedConfig};
use log::warn;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Base used to check that relative references join into a valid URL.
const PROBE_BASE: &str = "http://portal.invalid/";

/// An override mentioned a key the schema does not declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOverrideKey {
    pub key: String,
    pub origin: String,
}

impl fmt::Display for UnknownOverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown config key `{}` ignored (from {})", self.key, self.origin)
    }
}

/// Check every declared key and build the resolved config.
pub fn validate_merged(
    merged: &BTreeMap<String, MergedEntry>,
    schema: &SchemaRegistry,
) -> Result<(ResolvedConfig, Vec<UnknownOverrideKey>), ConfigError> {
    let mut warnings = Vec::new();
    for (key, entry) in merged {
        if !schema.contains(key) {
            let warning = UnknownOverrideKey {
                key: key.clone(),
                origin: entry.origin.clone(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }
    }

    let mut values = BTreeMap::new();
    let mut violations = Vec::new();
    for (key, spec) in schema.iter() {
        match check_key(key, spec, merged.get(key.as_str())) {
            Ok(value) => {
                values.insert(key.clone(), value);
            }
            Err(violation) => violations.push(violation),
        }
    }

    if !violations.is_empty() {
        return Err(ConfigError::Validation(ValidationReport { violations }));
    }
    Ok((ResolvedConfig::new(values), warnings))
}

fn check_key(
    key: &ConfigKey,
    spec: &ConfigValueSpec,
    entry: Option<&MergedEntry>,
) -> Result<Option<ConfigValue>, Violation> {
    let violation = |kind: ViolationKind| Violation {
        key: key.to_string(),
        kind,
        origin: entry.map(|entry| entry.origin.clone()),
    };

    let value = match entry.map(|entry| &entry.value) {
        None | Some(RawValue::Absent) if spec.required => {
            return Err(violation(ViolationKind::Missing));
        }
        None => return Ok(None),
        Some(RawValue::Absent) if spec.nilable => return Ok(None),
        Some(RawValue::Absent) => return Err(violation(ViolationKind::NotNilable)),
        Some(value) => value,
    };

    let typed = match (&spec.kind, value) {
        (ValueKind::Bool, RawValue::Bool(flag)) => ConfigValue::Bool(*flag),
        (ValueKind::Text, RawValue::Text(text)) => ConfigValue::Text(text.clone()),
        (ValueKind::Url(forms), RawValue::Text(text)) => {
            if text.is_empty() {
                return Err(violation(ViolationKind::Empty));
            }
            check_url(text, forms).map_err(|reason| {
                violation(ViolationKind::InvalidUrl {
                    value: text.clone(),
                    reason,
                })
            })?;
            ConfigValue::Url(text.clone())
        }
        (kind, other) => {
            return Err(violation(ViolationKind::TypeMismatch {
                expected: kind.type_name(),
                found: other.type_name(),
            }));
        }
    };

    if let Some(text) = typed.as_str() {
        for rule in &spec.rules {
            match rule {
                FormatRule::NoTrailingSlash if text.ends_with('/') => {
                    return Err(violation(ViolationKind::TrailingSlash {
                        value: text.to_string(),
                    }));
                }
                FormatRule::NotEmpty if text.trim().is_empty() => {
                    return Err(violation(ViolationKind::Empty));
                }
                _ => {}
            }
        }
    }
    Ok(Some(typed))
}

/// Check a URL reference is well formed and of an accepted form.
fn check_url(value: &str, accepted: &[UrlForm]) -> Result<(), String> {
    if value.chars().any(char::is_whitespace) {
        return Err("contains whitespace".to_string());
    }
    let form = classify_url(value)?;
    if accepted.contains(&form) {
        Ok(())
    } else {
        let expected: Vec<String> = accepted.iter().map(ToString::to_string).collect();
        Err(format!("{form} not accepted, expected {}", expected.join(" or ")))
    }
}

fn classify_url(value: &str) -> Result<UrlForm, String> {
    if value.starts_with("//") {
        let parsed = Url::parse(&format!("https:{value}")).map_err(|err| err.to_string())?;
        return match parsed.host_str() {
            Some(host) if !host.is_empty() => Ok(UrlForm::SchemeRelative),
            _ => Err("missing host".to_string()),
        };
    }
    if value.starts_with('/') {
        probe_relative(value)?;
        return Ok(UrlForm::RootRelative);
    }
    match Url::parse(value) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(UrlForm::Absolute),
            "mailto" if !url.path().is_empty() => Ok(UrlForm::Mailto),
            "mailto" => Err("missing mail address".to_string()),
            scheme => Err(format!("unsupported scheme `{scheme}`")),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            probe_relative(value)?;
            Ok(UrlForm::Relative)
        }
        Err(err) => Err(err.to_string()),
    }
}

fn probe_relative(value: &str) -> Result<(), String> {
    let base = Url::parse(PROBE_BASE).map_err(|err| err.to_string())?;
    base.join(value).map(|_| ()).map_err(|err| err.to_string())
}
