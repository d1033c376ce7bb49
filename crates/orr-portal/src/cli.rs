//! Command-line front end for resolving a deployment's configuration.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use orr_portal_config::{Resolution, ResolveOptions, ResolvedConfig, SchemaRegistry};
use std::io::Write;
use std::path::PathBuf;

/// Command-line options for `orr-portal-config`.
#[derive(Debug, Parser)]
#[command(name = "orr-portal-config", version, about = "Resolve ORR portal configuration")]
pub struct Cli {
    /// System-wide override file (defaults to /etc/orr-portal/local.config.js)
    #[arg(long, global = true, conflicts_with = "no_system")]
    pub system: Option<PathBuf>,
    /// Skip the system-wide override file
    #[arg(long, global = true)]
    pub no_system: bool,
    /// Skip local.config.js in the working directory
    #[arg(long, global = true)]
    pub no_cwd: bool,
    /// Working directory used for discovery and relative source paths
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve and validate, then print every key with its value
    Check {
        /// Override sources applied last, in order
        sources: Vec<PathBuf>,
    },
    /// Resolve and print the config object served to the portal front end
    Render {
        #[arg(long, value_enum, default_value_t = RenderFormat::Json)]
        format: RenderFormat,
        /// Override sources applied last, in order
        sources: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Pretty-printed JSON object
    Json,
    /// `var appConfig = {...};` script
    Script,
}

/// Run a parsed command, writing results to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().context("failed to resolve current working directory")?,
    };
    let sources = match &cli.command {
        Command::Check { sources } | Command::Render { sources, .. } => sources.clone(),
    };

    let mut options = ResolveOptions::new(&cwd);
    if cli.no_system {
        options.system_config_path = None;
    } else if let Some(system) = cli.system {
        options.system_config_path = Some(system);
    }
    options.discover_cwd = !cli.no_cwd;
    for source in sources {
        options = options.with_runtime_path(source);
    }
    debug!(
        "resolving config (cwd={}, system_set={}, runtime_sources={})",
        cwd.display(),
        options.system_config_path.is_some(),
        options.runtime_paths.len()
    );

    let resolution =
        ResolvedConfig::load_layered_with_options(&SchemaRegistry::portal(), options)
            .context("failed to resolve portal configuration")?;
    info!(
        "portal config ready (layers={}, warnings={})",
        resolution.layers.len(),
        resolution.warnings.len()
    );

    match cli.command {
        Command::Check { .. } => write_summary(&resolution, out),
        Command::Render { format, .. } => write_rendered(&resolution.config, format, out),
    }
}

fn write_summary(resolution: &Resolution, out: &mut impl Write) -> anyhow::Result<()> {
    for layer in &resolution.layers {
        writeln!(out, "# layer {:?}: {}", layer.source, layer.path.display())?;
    }
    for warning in &resolution.warnings {
        writeln!(out, "# warning: {warning}")?;
    }
    for (key, value) in resolution.config.iter() {
        match value {
            Some(value) => writeln!(out, "{key} = {value}")?,
            None => writeln!(out, "{key} = <absent>")?,
        }
    }
    Ok(())
}

fn write_rendered(
    config: &ResolvedConfig,
    format: RenderFormat,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&config.to_app_config())
        .context("failed to encode app config")?;
    match format {
        RenderFormat::Json => writeln!(out, "{json}")?,
        RenderFormat::Script => writeln!(out, "var appConfig = {json};")?,
    }
    Ok(())
}
