//! Command implementations for medic.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command returns the process exit code on
//! completion; errors carry their own exit code.

mod jobs;
mod monitor;
mod notify;
mod sysinfo;

use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command, config: &Config) -> Result<i32> {
    match command {
        Command::Monitor => monitor::cmd_monitor(config),
        Command::Jobs(args) => jobs::cmd_jobs(args, config),
        Command::Notify(args) => notify::cmd_notify(args, config),
        Command::Sysinfo(args) => sysinfo::cmd_sysinfo(args, config),
    }
}
