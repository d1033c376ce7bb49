//! Raw and typed configuration values.

use serde::Serialize;
use std::fmt;

/// A value as written in an override source, before schema typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Bool(bool),
    /// Explicitly cleared (`null` / `undefined`); does not fall through to defaults.
    Absent,
}

impl RawValue {
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            RawValue::Text(_) => "string",
            RawValue::Bool(_) => "boolean",
            RawValue::Absent => "absent",
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// A schema-typed resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Text(String),
    Url(String),
    Bool(bool),
}

impl ConfigValue {
    /// String contents for text and URL values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(value) | ConfigValue::Url(value) => Some(value),
            ConfigValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// JSON form served to the portal front end.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Text(value) | ConfigValue::Url(value) => {
                serde_json::Value::String(value.clone())
            }
            ConfigValue::Bool(value) => serde_json::Value::Bool(*value),
        }
    }

    pub(crate) fn to_raw(&self) -> RawValue {
        match self {
            ConfigValue::Text(value) | ConfigValue::Url(value) => RawValue::Text(value.clone()),
            ConfigValue::Bool(value) => RawValue::Bool(*value),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Text(value) | ConfigValue::Url(value) => write!(f, "{value:?}"),
            ConfigValue::Bool(value) => write!(f, "{value}"),
        }
    }
}
