//! Test helpers shared across ORR portal crates.

pub mod sources;

pub use sources::{MINIMAL_DEPLOYMENT, SAMPLE_DEPLOYMENT, deployment_dir, write_source};
