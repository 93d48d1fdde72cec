//! Medic: unattended maintenance for a home-lab media pipeline.
//!
//! This is the main entry point for the `medic` CLI. It parses arguments,
//! initialises logging, loads configuration, dispatches to the appropriate
//! command handler, and handles errors with proper exit codes.

mod agent;
mod cli;
mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod jobs;
pub mod notify;
pub mod process;
pub mod status;
pub mod sysinfo;
pub mod template;
pub mod version;

use cli::Cli;
use config::Config;
use error::Result;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse_args();

    let outcome = load_config(&cli).and_then(|config| commands::dispatch(cli.command, &config));

    match outcome {
        Ok(code) => ExitCode::from(exit_byte(code)),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(exit_byte(err.exit_code()))
        }
    }
}

/// Log to stderr so stdout carries only the agent echo and command output.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Clamp an exit code into the range a process can report.
fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(exit_codes::FAILURE as u8)
}
