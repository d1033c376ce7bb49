//! Resolve the portal configuration once at startup and report the outcome.

use clap::Parser;
use orr_portal::cli::{Cli, run};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    orr_portal::init_logging();
    let cli = Cli::parse();
    let stdout = io::stdout();
    match run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
