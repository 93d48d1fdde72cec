//! CLI argument parsing for medic.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::notify::Importance;
use crate::sysinfo::Section;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Medic: unattended maintenance for a home-lab media pipeline.
///
/// Runs a coding agent against a failing automation script and reports
/// what it found, and keeps the photo service's background jobs in the
/// right paused/running state.
#[derive(Parser, Debug)]
#[command(name = "medic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (YAML). Missing file means built-in defaults.
    #[arg(long, short = 'c', global = true, env = "MEDIC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for medic.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one supervised agent pass.
    ///
    /// Ensures the agent CLI version, loads credentials and the prompt,
    /// runs the agent with a hard timeout, saves its output and notifies
    /// on failure or when authentication is required.
    Monitor,

    /// Show, resume or pause the photo service's background jobs.
    Jobs(JobsArgs),

    /// Send a notification through the host notify command.
    Notify(NotifyArgs),

    /// Print read-only host information.
    Sysinfo(SysinfoArgs),
}

/// What `jobs` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobsAction {
    /// Print the job snapshot as JSON.
    Status,
    /// Resume every paused job.
    Resume,
    /// Pause every active job.
    Pause,
}

/// Arguments for the `jobs` command.
#[derive(Parser, Debug)]
pub struct JobsArgs {
    /// Action to perform.
    #[arg(value_enum, default_value_t = JobsAction::Status)]
    pub action: JobsAction,

    /// Server URL (overrides config and IMMICH_SERVER).
    #[arg(short, long)]
    pub server: Option<String>,

    /// Path to the API key file.
    #[arg(short, long)]
    pub key_file: Option<PathBuf>,

    /// Wait for the import container to finish first.
    #[arg(short, long)]
    pub wait: bool,
}

/// Arguments for the `notify` command.
#[derive(Parser, Debug)]
pub struct NotifyArgs {
    /// Event tag.
    #[arg(short, long)]
    pub event: String,

    /// Subject line.
    #[arg(short, long)]
    pub subject: String,

    /// Short description.
    #[arg(short, long)]
    pub description: String,

    /// Importance.
    #[arg(short, long, value_enum)]
    pub importance: Importance,

    /// Full message body.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Link; analysis-file paths are rewritten to public URLs.
    #[arg(short, long)]
    pub link: Option<String>,
}

/// Arguments for the `sysinfo` command.
#[derive(Parser, Debug)]
pub struct SysinfoArgs {
    /// Report to print.
    #[arg(value_enum)]
    pub section: Section,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
