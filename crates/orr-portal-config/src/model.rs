//! Read-only facade over the resolved portal configuration.

use crate::schema::{
    BRANDING_CONTACT_US, BRANDING_LOGO, BRANDING_TITLE, BRANDING_TOU, ConfigKey, FIREBASE_URL,
    ORRONT_REST, ORRONT_SPARQL_ENDPOINT, PORTAL_MAIN_PAGE, RECAPTCHA_SITE_KEY,
};
use crate::value::ConfigValue;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fully merged and validated configuration.
///
/// Holds an entry for every declared key; optional keys without a value are
/// stored as explicit absence. There is no way to mutate it after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    values: BTreeMap<ConfigKey, Option<ConfigValue>>,
}

impl ResolvedConfig {
    pub(crate) fn new(values: BTreeMap<ConfigKey, Option<ConfigValue>>) -> Self {
        Self { values }
    }

    /// Value of a declared key, `None` when it resolved to absence.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not declared in the schema; the key set is closed, so
    /// asking for anything else is a programming error.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self.values.get(key) {
            Some(value) => value.as_ref(),
            None => panic!("unknown config key `{key}` requested"),
        }
    }

    /// Whether `key` is part of the schema this config was resolved against.
    pub fn is_declared(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Declared keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.values.keys()
    }

    /// Every declared key with its resolved value.
    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, Option<&ConfigValue>)> {
        self.values.iter().map(|(key, value)| (key, value.as_ref()))
    }

    pub fn portal(&self) -> PortalView<'_> {
        PortalView { config: self }
    }

    pub fn orront(&self) -> OrrontView<'_> {
        OrrontView { config: self }
    }

    pub fn branding(&self) -> BrandingView<'_> {
        BrandingView { config: self }
    }

    pub fn recaptcha(&self) -> RecaptchaView<'_> {
        RecaptchaView { config: self }
    }

    pub fn firebase(&self) -> FirebaseView<'_> {
        FirebaseView { config: self }
    }

    /// Nested `{ namespace: { field: value } }` object consumed by the
    /// portal front end. Absent keys are omitted.
    pub fn to_app_config(&self) -> Value {
        let mut root = Map::new();
        for (key, value) in self.iter() {
            let Some(value) = value else {
                continue;
            };
            let json = value.to_json();
            let mut slot = &mut root;
            let mut segments = key.as_str().split('.').peekable();
            while let Some(segment) = segments.next() {
                if segments.peek().is_none() {
                    slot.insert(segment.to_string(), json);
                    break;
                }
                let entry = slot
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                let Value::Object(next) = entry else {
                    break;
                };
                slot = next;
            }
        }
        Value::Object(root)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    fn required_text(&self, key: &str) -> &str {
        match self.text(key) {
            Some(value) => value,
            None => panic!("config key `{key}` is not a required text value in this schema"),
        }
    }
}

/// `portal.*` keys.
#[derive(Debug, Clone, Copy)]
pub struct PortalView<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> PortalView<'a> {
    /// Main portal page; may be scheme-relative (`//host/path/`).
    pub fn main_page(&self) -> &'a str {
        self.config.required_text(PORTAL_MAIN_PAGE)
    }
}

/// `orront.*` keys: the ontology backend endpoints.
#[derive(Debug, Clone, Copy)]
pub struct OrrontView<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> OrrontView<'a> {
    /// REST base path, never with a trailing slash.
    pub fn rest(&self) -> &'a str {
        self.config.required_text(ORRONT_REST)
    }

    /// REST base joined with a relative path, e.g. `rest_url("api/v0/ont")`.
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/{}", self.rest(), path.trim_start_matches('/'))
    }

    pub fn sparql_endpoint(&self) -> Option<&'a str> {
        self.config.text(ORRONT_SPARQL_ENDPOINT)
    }
}

/// `branding.*` keys.
#[derive(Debug, Clone, Copy)]
pub struct BrandingView<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> BrandingView<'a> {
    /// Header logo; `None` when a deployment cleared it.
    pub fn logo(&self) -> Option<&'a str> {
        self.config.text(BRANDING_LOGO)
    }

    pub fn title(&self) -> &'a str {
        self.config.required_text(BRANDING_TITLE)
    }

    /// Terms of use link.
    pub fn tou(&self) -> Option<&'a str> {
        self.config.text(BRANDING_TOU)
    }

    pub fn contact_us(&self) -> Option<&'a str> {
        self.config.text(BRANDING_CONTACT_US)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecaptchaView<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> RecaptchaView<'a> {
    /// Public site key. The matching private key lives in the backend config.
    pub fn site_key(&self) -> Option<&'a str> {
        self.config.text(RECAPTCHA_SITE_KEY)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FirebaseView<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> FirebaseView<'a> {
    pub fn url(&self) -> Option<&'a str> {
        self.config.text(FIREBASE_URL)
    }
}
