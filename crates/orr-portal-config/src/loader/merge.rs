//! Flat last-writer-wins merge of patches over defaults.

use super::parse::RawPatch;
use crate::schema::ConfigKey;
use crate::value::{ConfigValue, RawValue};
use std::collections::BTreeMap;

/// Origin label for values supplied by the built-in defaults.
pub(crate) const DEFAULTS_ORIGIN: &str = "defaults";

/// A merged value and the layer that last wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEntry {
    pub value: RawValue,
    pub origin: String,
}

/// Apply patches over defaults in order. Later patches win, and within one
/// patch a later assignment wins. Values are replaced wholesale.
pub fn merge_patches(
    defaults: &BTreeMap<ConfigKey, ConfigValue>,
    patches: &[RawPatch],
) -> BTreeMap<String, MergedEntry> {
    let mut merged: BTreeMap<String, MergedEntry> = defaults
        .iter()
        .map(|(key, value)| {
            (
                key.as_str().to_string(),
                MergedEntry {
                    value: value.to_raw(),
                    origin: DEFAULTS_ORIGIN.to_string(),
                },
            )
        })
        .collect();

    for patch in patches {
        for entry in &patch.entries {
            merged.insert(
                entry.key.clone(),
                MergedEntry {
                    value: entry.value.clone(),
                    origin: patch.origin(entry),
                },
            );
        }
    }
    merged
}
