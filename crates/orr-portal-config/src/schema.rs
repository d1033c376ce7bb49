//! Schema registry: the closed set of configuration keys the portal understands.
//!
//! Every key carries its value type, whether it is required, whether it may be
//! explicitly cleared, its built-in default, and any format rules. The registry
//! is assembled once at startup and is read-only afterwards.

use crate::ConfigError;
use crate::value::ConfigValue;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

pub const PORTAL_MAIN_PAGE: &str = "portal.mainPage";
pub const ORRONT_REST: &str = "orront.rest";
pub const ORRONT_SPARQL_ENDPOINT: &str = "orront.sparqlEndpoint";
pub const BRANDING_LOGO: &str = "branding.logo";
pub const BRANDING_TITLE: &str = "branding.title";
pub const BRANDING_TOU: &str = "branding.tou";
pub const BRANDING_CONTACT_US: &str = "branding.contactUs";
pub const RECAPTCHA_SITE_KEY: &str = "recaptcha.siteKey";
pub const FIREBASE_URL: &str = "firebase.url";

/// Built-in header logo shipped with the portal assets.
pub const DEFAULT_LOGO: &str = "img/mmi-orr-logo.png";
/// Built-in product name used for page titles.
pub const DEFAULT_TITLE: &str = "MMI Ontology Registry and Repository";

/// Dotted path naming one configuration value, e.g. `orront.rest`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Parse a dotted key; requires at least `<namespace>.<field>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = 0;
        for segment in raw.split('.') {
            if !is_identifier(segment) {
                return None;
            }
            segments += 1;
        }
        (segments >= 2).then(|| ConfigKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// Path below the namespace (`mainPage` for `portal.mainPage`).
    pub fn field(&self) -> &str {
        self.0
            .split_once('.')
            .map(|(_, field)| field)
            .unwrap_or_default()
    }
}

impl Borrow<str> for ConfigKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Reference forms a URL-typed key may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlForm {
    /// `http://host/...` or `https://host/...`.
    Absolute,
    /// `//host/...`, inheriting the page protocol.
    SchemeRelative,
    /// `/path` on the portal host.
    RootRelative,
    /// `path/to/asset` relative to the portal page.
    Relative,
    /// `mailto:addr@example.net`.
    Mailto,
}

impl fmt::Display for UrlForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlForm::Absolute => "absolute http(s) URL",
            UrlForm::SchemeRelative => "scheme-relative URL",
            UrlForm::RootRelative => "root-relative path",
            UrlForm::Relative => "relative path",
            UrlForm::Mailto => "mailto URI",
        };
        f.write_str(name)
    }
}

/// Value type of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Url(&'static [UrlForm]),
    Bool,
}

impl ValueKind {
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Url(_) => "URL string",
            ValueKind::Bool => "boolean",
        }
    }
}

/// Extra checks applied after type conformance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    /// Base paths are joined with `/segment`, so they must not end with `/`.
    NoTrailingSlash,
    NotEmpty,
}

/// Declaration of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValueSpec {
    pub kind: ValueKind,
    pub required: bool,
    /// Whether the key may resolve to explicit absence.
    pub nilable: bool,
    pub default: Option<ConfigValue>,
    pub rules: Vec<FormatRule>,
    pub description: &'static str,
}

impl ConfigValueSpec {
    /// Required key with no default.
    pub fn required(kind: ValueKind, description: &'static str) -> Self {
        Self {
            kind,
            required: true,
            nilable: false,
            default: None,
            rules: Vec::new(),
            description,
        }
    }

    /// Optional key with no default; resolves to absence when not given.
    pub fn optional(kind: ValueKind, description: &'static str) -> Self {
        Self {
            kind,
            required: false,
            nilable: true,
            default: None,
            rules: Vec::new(),
            description,
        }
    }

    /// Give an optional key a built-in default.
    pub fn with_default(mut self, value: ConfigValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Control whether an optional key may be explicitly cleared.
    pub fn nilable(mut self, nilable: bool) -> Self {
        self.nilable = nilable;
        self
    }

    pub fn with_rule(mut self, rule: FormatRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// The closed set of declared keys.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    specs: BTreeMap<ConfigKey, ConfigValueSpec>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a key. Fails if the key is malformed or already declared.
    pub fn register(&mut self, key: &str, spec: ConfigValueSpec) -> Result<(), ConfigError> {
        let Some(parsed) = ConfigKey::parse(key) else {
            return Err(ConfigError::Invalid(format!("malformed schema key: {key}")));
        };
        if self.specs.contains_key(key) {
            return Err(ConfigError::DuplicateKey(key.to_string()));
        }
        self.specs.insert(parsed, spec);
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Option<&ConfigValueSpec> {
        self.specs.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.specs.contains_key(key)
    }

    pub fn all_keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.specs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &ConfigValueSpec)> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Schema for the ontology registry portal.
    pub fn portal() -> Self {
        let mut schema = Self::new();
        for (key, spec) in portal_specs() {
            // Keys below are distinct literals.
            if let Err(err) = schema.register(key, spec) {
                panic!("built-in portal schema is inconsistent: {err}");
            }
        }
        schema
    }
}

fn portal_specs() -> Vec<(&'static str, ConfigValueSpec)> {
    use UrlForm::*;
    vec![
        (
            PORTAL_MAIN_PAGE,
            ConfigValueSpec::required(
                ValueKind::Url(&[Absolute, SchemeRelative]),
                "main portal page URL",
            ),
        ),
        (
            ORRONT_REST,
            ConfigValueSpec::required(
                ValueKind::Url(&[Absolute, SchemeRelative, RootRelative]),
                "orr-ont REST endpoint",
            )
            .with_rule(FormatRule::NoTrailingSlash),
        ),
        (
            ORRONT_SPARQL_ENDPOINT,
            ConfigValueSpec::optional(
                ValueKind::Url(&[Absolute, SchemeRelative, RootRelative]),
                "SPARQL endpoint",
            ),
        ),
        (
            BRANDING_LOGO,
            ConfigValueSpec::optional(
                ValueKind::Url(&[Absolute, SchemeRelative, RootRelative, Relative]),
                "header logo image",
            )
            .with_default(ConfigValue::Url(DEFAULT_LOGO.to_string())),
        ),
        (
            BRANDING_TITLE,
            ConfigValueSpec::optional(ValueKind::Text, "page title")
                .with_default(ConfigValue::Text(DEFAULT_TITLE.to_string()))
                .nilable(false)
                .with_rule(FormatRule::NotEmpty),
        ),
        (
            BRANDING_TOU,
            ConfigValueSpec::optional(
                ValueKind::Url(&[Absolute, SchemeRelative, RootRelative]),
                "terms of use link",
            ),
        ),
        (
            BRANDING_CONTACT_US,
            ConfigValueSpec::optional(
                ValueKind::Url(&[Absolute, SchemeRelative, RootRelative, Mailto]),
                "contact link",
            ),
        ),
        (
            RECAPTCHA_SITE_KEY,
            ConfigValueSpec::optional(ValueKind::Text, "reCAPTCHA public site key")
                .with_rule(FormatRule::NotEmpty),
        ),
        (
            FIREBASE_URL,
            ConfigValueSpec::optional(ValueKind::Url(&[Absolute]), "realtime backend URL"),
        ),
    ]
}
