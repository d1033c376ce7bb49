use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Smallest override that satisfies every required key.
pub const MINIMAL_DEPLOYMENT: &str = r#"
appConfig.portal.mainPage = "//example.net/ont/";
appConfig.orront.rest = "/ont";
"#;

/// A realistic deployment file with optional keys set and commented out.
pub const SAMPLE_DEPLOYMENT: &str = r#"// Example ORR local.config.js

// (required) main ORR page URL.
appConfig.portal.mainPage  = "//example.net/ont/";

// (required) orr-ont endpoint URL. (No trailing slash.)
appConfig.orront.rest  = "/ont";

appConfig.orront.sparqlEndpoint = "http://example.net/sparql";

//appConfig.branding.logo = "http://example.net/my_orr_logo.png";

appConfig.branding.title  = "My ORR";

//appConfig.branding.tou = "http://somewhere/mytermsofuse"

//appConfig.branding.contactUs: "mailto:addr@example.net"

//appConfig.recaptcha.siteKey = "the-public-key"

appConfig.firebase.url = "https://example.firebaseio.com";
"#;

/// Write a source file, creating parent directories if needed.
pub fn write_source(path: &Path, contents: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create source dir");
    }
    fs::write(path, contents).expect("write source");
    path.to_path_buf()
}

/// Fresh temporary directory standing in for a deployment root.
pub fn deployment_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}
