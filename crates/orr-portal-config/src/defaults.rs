//! Built-in defaults derived from the schema.

use crate::schema::{ConfigKey, SchemaRegistry};
use crate::value::ConfigValue;
use std::collections::BTreeMap;

/// Default value for every optional key that declares one.
///
/// Required keys never appear here; they must come from an override source.
pub fn defaults_for(schema: &SchemaRegistry) -> BTreeMap<ConfigKey, ConfigValue> {
    schema
        .iter()
        .filter(|(_, spec)| !spec.required)
        .filter_map(|(key, spec)| spec.default.clone().map(|value| (key.clone(), value)))
        .collect()
}
