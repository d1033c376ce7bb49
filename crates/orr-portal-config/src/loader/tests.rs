//! Tests for override loading and resolution.

use super::*;
use crate::schema::{
    BRANDING_TITLE, DEFAULT_LOGO, DEFAULT_TITLE, ORRONT_REST, PORTAL_MAIN_PAGE,
};
use crate::{ConfigValue, ViolationKind};
use orr_portal_test_utils::{MINIMAL_DEPLOYMENT, SAMPLE_DEPLOYMENT, deployment_dir, write_source};
use pretty_assertions::assert_eq;

fn portal() -> SchemaRegistry {
    SchemaRegistry::portal()
}

fn inline(contents: &str) -> OverrideSource {
    OverrideSource::inline("inline", contents)
}

/// Only the required keys set; optional keys fall through to defaults.
#[test]
fn minimal_override_resolves_with_defaults() {
    let resolution = resolve(&portal(), &[inline(MINIMAL_DEPLOYMENT)]).expect("resolve");
    let config = resolution.config;
    assert_eq!(config.portal().main_page(), "//example.net/ont/");
    assert_eq!(config.orront().rest(), "/ont");
    assert_eq!(config.branding().title(), DEFAULT_TITLE);
    assert_eq!(config.branding().logo(), Some(DEFAULT_LOGO));
    assert_eq!(config.branding().tou(), None);
    assert_eq!(config.orront().sparql_endpoint(), None);
    assert!(resolution.warnings.is_empty());
}

/// The sample deployment file resolves with its commented keys left out.
#[test]
fn sample_deployment_resolves() {
    let config = ResolvedConfig::load_from_str(SAMPLE_DEPLOYMENT)
        .expect("resolve")
        .config;
    assert_eq!(config.branding().title(), "My ORR");
    assert_eq!(
        config.orront().sparql_endpoint(),
        Some("http://example.net/sparql")
    );
    assert_eq!(config.firebase().url(), Some("https://example.firebaseio.com"));
    assert_eq!(config.branding().contact_us(), None);
    assert_eq!(config.recaptcha().site_key(), None);
}

/// A missing required key is named in the error.
#[test]
fn missing_required_key_names_it() {
    let err = resolve(
        &portal(),
        &[inline("portal.mainPage = \"//example.net/ont/\"")],
    )
    .unwrap_err();
    assert_eq!(err.violations().len(), 1);
    assert_eq!(err.violations()[0].key, ORRONT_REST);
    assert_eq!(err.violations()[0].kind, ViolationKind::Missing);
    assert!(err.to_string().contains("orront.rest: missing required value"));
}

/// The REST base must not end with a slash.
#[test]
fn trailing_slash_on_rest_is_rejected() {
    let err = resolve(
        &portal(),
        &[inline(
            "portal.mainPage = \"//example.net/ont/\"\norront.rest = \"/ont/\"",
        )],
    )
    .unwrap_err();
    let violations = err.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].kind,
        ViolationKind::TrailingSlash {
            value: "/ont/".to_string()
        }
    );
    assert_eq!(violations[0].origin.as_deref(), Some("inline:2"));
}

/// The reCAPTCHA site key is passed through as given.
#[test]
fn recaptcha_site_key_needs_no_server_side_check() {
    let contents = format!("{MINIMAL_DEPLOYMENT}\nrecaptcha.siteKey = \"abc\"");
    let config = resolve(&portal(), &[inline(&contents)])
        .expect("resolve")
        .config;
    assert_eq!(config.recaptcha().site_key(), Some("abc"));
}

/// Unknown keys produce a warning and stay out of the config.
#[test]
fn unknown_keys_warn_and_are_not_exposed() {
    let contents = format!("{MINIMAL_DEPLOYMENT}\ntypo.setting = \"x\"");
    let resolution = resolve(&portal(), &[inline(&contents)]).expect("resolve");
    assert_eq!(
        resolution.warnings,
        vec![UnknownOverrideKey {
            key: "typo.setting".to_string(),
            origin: "inline:5".to_string(),
        }]
    );
    assert!(!resolution.config.is_declared("typo.setting"));
    assert!(resolution.config.keys().all(|key| key.as_str() != "typo.setting"));
}

/// Every violation is reported in one error.
#[test]
fn all_violations_are_reported_together() {
    let err = resolve(
        &portal(),
        &[inline("portal.mainPage = \"/relative\"\nbranding.title = true")],
    )
    .unwrap_err();
    let keys: Vec<&str> = err.violations().iter().map(|v| v.key.as_str()).collect();
    assert_eq!(keys, vec![BRANDING_TITLE, ORRONT_REST, PORTAL_MAIN_PAGE]);
}

/// A later source overrides an earlier one.
#[test]
fn later_source_wins() {
    let a = inline(&format!("{MINIMAL_DEPLOYMENT}\nbranding.title = \"A\""));
    let b = OverrideSource::inline("b", "branding.title = \"B\"");
    let config = resolve(&portal(), &[a, b]).expect("resolve").config;
    assert_eq!(config.branding().title(), "B");
}

/// Resolving twice, or with a repeated source, gives the same config.
#[test]
fn resolution_is_deterministic_and_idempotent() {
    let a = inline(SAMPLE_DEPLOYMENT);
    let once = resolve(&portal(), std::slice::from_ref(&a)).expect("once");
    let again = resolve(&portal(), std::slice::from_ref(&a)).expect("again");
    let doubled = resolve(&portal(), &[a.clone(), a]).expect("doubled");
    assert_eq!(once.config, again.config);
    assert_eq!(once.config, doubled.config);
}

/// null clears the logo but is rejected for the title.
#[test]
fn explicit_null_clears_nilable_default_but_not_title() {
    let cleared = format!("{MINIMAL_DEPLOYMENT}\nbranding.logo = null");
    let config = resolve(&portal(), &[inline(&cleared)])
        .expect("resolve")
        .config;
    assert_eq!(config.branding().logo(), None);
    assert_eq!(config.get("branding.logo"), None);

    let title = format!("{MINIMAL_DEPLOYMENT}\nbranding.title = null");
    let err = resolve(&portal(), &[inline(&title)]).unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::NotNilable);
}

/// An empty title is rejected rather than defaulted.
#[test]
fn explicit_empty_does_not_fall_through() {
    let contents = format!("{MINIMAL_DEPLOYMENT}\nbranding.title = \"\"");
    let err = resolve(&portal(), &[inline(&contents)]).unwrap_err();
    assert_eq!(err.violations()[0].kind, ViolationKind::Empty);
}

/// The contact link may be a mailto URI.
#[test]
fn contact_accepts_mailto() {
    let contents = format!("{MINIMAL_DEPLOYMENT}\nbranding.contactUs = \"mailto:addr@example.net\"");
    let config = resolve(&portal(), &[inline(&contents)])
        .expect("resolve")
        .config;
    assert_eq!(
        config.get("branding.contactUs"),
        Some(&ConfigValue::Url("mailto:addr@example.net".to_string()))
    );
}

/// One unparsable source aborts the whole load.
#[test]
fn parse_failure_aborts_whole_load() {
    let bad = OverrideSource::inline("bad", "branding.title: \"x\"");
    let err = resolve(&portal(), &[inline(MINIMAL_DEPLOYMENT), bad]).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::SourceParse { ref source_label, .. } if source_label == "bad"
    ));
}

/// An explicitly named file must exist.
#[test]
fn missing_explicit_file_is_an_error() {
    let temp = deployment_dir();
    let err = resolve(&portal(), &[OverrideSource::file(temp.path().join("nope.js"))])
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingSource(_)));
}

/// Runtime layers override cwd and system layers.
#[test]
fn layered_runtime_overrides_cwd_and_system() {
    let temp = deployment_dir();
    let root = temp.path();
    let system = write_source(&root.join("etc/local.config.js"), MINIMAL_DEPLOYMENT);
    let cwd = root.join("site");
    write_source(
        &cwd.join(DEFAULT_CONFIG_FILE),
        "branding.title = \"cwd\"\nbranding.tou = \"https://example.net/tou\"",
    );
    write_source(&cwd.join("override.json5"), "{ branding: { title: \"runtime\" } }");

    let mut options = ResolveOptions::new(&cwd).with_runtime_path("override.json5");
    options.system_config_path = Some(system);

    let resolution = ResolvedConfig::load_layered_with_options(&portal(), options).expect("layered");
    let sources: Vec<ConfigLayerSource> = resolution.layers.iter().map(|l| l.source).collect();
    assert_eq!(
        sources,
        vec![
            ConfigLayerSource::System,
            ConfigLayerSource::Cwd,
            ConfigLayerSource::Runtime
        ]
    );
    assert_eq!(resolution.config.branding().title(), "runtime");
    assert_eq!(
        resolution.config.branding().tou(),
        Some("https://example.net/tou")
    );
}

/// Missing optional layers are skipped and a repeated file loads once.
#[test]
fn layered_skips_missing_optional_layers_and_duplicates() {
    let temp = deployment_dir();
    let cwd = temp.path().to_path_buf();
    let local = write_source(&cwd.join(DEFAULT_CONFIG_FILE), MINIMAL_DEPLOYMENT);

    let mut options = ResolveOptions::new(&cwd).with_runtime_path(&local);
    options.system_config_path = Some(cwd.join("missing.config.js"));

    let resolution = ResolvedConfig::load_layered_with_options(&portal(), options).expect("layered");
    assert_eq!(resolution.layers.len(), 1);
    assert_eq!(resolution.layers[0].source, ConfigLayerSource::Runtime);
}

/// A repeated runtime path applies at its last position.
#[test]
fn repeated_runtime_path_wins_at_its_last_position() {
    let temp = deployment_dir();
    let cwd = temp.path().to_path_buf();
    let a = write_source(
        &cwd.join("a.config.js"),
        &format!("{MINIMAL_DEPLOYMENT}\nbranding.title = \"A\""),
    );
    let b = write_source(&cwd.join("b.config.js"), "branding.title = \"B\"");

    let options = ResolveOptions::explicit_only(&cwd)
        .with_runtime_path(&a)
        .with_runtime_path(&b)
        .with_runtime_path(&a);
    let layered = ResolvedConfig::load_layered_with_options(&portal(), options).expect("layered");
    let paths: Vec<&Path> = layered.layers.iter().map(|l| l.path.as_path()).collect();
    assert_eq!(paths, vec![b.as_path(), a.as_path()]);
    assert_eq!(layered.config.branding().title(), "A");

    let flat = resolve(
        &portal(),
        &[
            OverrideSource::file(&a),
            OverrideSource::file(&b),
            OverrideSource::file(&a),
        ],
    )
    .expect("flat");
    assert_eq!(flat.config, layered.config);
}

/// The cwd file named again as a runtime source outranks earlier sources.
#[test]
fn cwd_file_passed_again_after_another_source_wins() {
    let temp = deployment_dir();
    let cwd = temp.path().to_path_buf();
    let local = write_source(
        &cwd.join(DEFAULT_CONFIG_FILE),
        &format!("{MINIMAL_DEPLOYMENT}\nbranding.title = \"local\""),
    );
    let other = write_source(&cwd.join("other.config.js"), "branding.title = \"other\"");

    let mut options = ResolveOptions::new(&cwd)
        .with_runtime_path(&other)
        .with_runtime_path(&local);
    options.system_config_path = None;
    let resolution = ResolvedConfig::load_layered_with_options(&portal(), options).expect("layered");
    let sources: Vec<ConfigLayerSource> = resolution.layers.iter().map(|l| l.source).collect();
    assert_eq!(
        sources,
        vec![ConfigLayerSource::Runtime, ConfigLayerSource::Runtime]
    );
    assert_eq!(resolution.config.branding().title(), "local");
}

/// Missing runtime paths fail the load.
#[test]
fn layered_requires_explicit_runtime_paths() {
    let temp = deployment_dir();
    let options = ResolveOptions::explicit_only(temp.path()).with_runtime_path("absent.config.js");
    let err = ResolvedConfig::load_layered_with_options(&portal(), options).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSource(path) if path.ends_with("absent.config.js")));
}

/// Violation origins name the layer and line.
#[test]
fn layer_labels_carry_into_violation_origins() {
    let temp = deployment_dir();
    let path = write_source(
        &temp.path().join("bad.config.js"),
        "portal.mainPage = \"ftp://example.net/\"\norront.rest = \"/ont\"",
    );
    let options = ResolveOptions::explicit_only(temp.path()).with_runtime_path(&path);
    let err = ResolvedConfig::load_layered_with_options(&portal(), options).unwrap_err();
    let origin = err.violations()[0].origin.clone().expect("origin");
    assert!(origin.starts_with("runtime("));
    assert!(origin.ends_with("bad.config.js):1"));
}
