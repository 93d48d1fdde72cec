//! Version gate: make sure the agent CLI is installed at a minimum version.

use super::Version;
use crate::config::AgentSettings;
use crate::error::{MedicError, Result};
use crate::process::run_bounded;
use crate::template::{render_template, vars};
use std::time::Duration;

/// What the gate did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// No minimum configured (or it could not be parsed).
    NotRequired,
    /// Installed version already satisfies the minimum.
    UpToDate { current: Version },
    /// Installed version was behind and has been upgraded.
    Upgraded { from: Version, to: String },
    /// The tool was missing and has been installed.
    Installed { version: String },
    /// The probe failed for a reason other than a missing binary; proceeding anyway.
    ProbeFailed { reason: String },
}

/// Probe-and-upgrade gate for the agent CLI.
pub struct VersionGate<'a> {
    settings: &'a AgentSettings,
}

impl<'a> VersionGate<'a> {
    pub fn new(settings: &'a AgentSettings) -> Self {
        Self { settings }
    }

    /// Ensure the agent is at least `required`.
    ///
    /// Only a failed install/upgrade is an error. A missing binary is
    /// recovered by installing; any other probe failure is logged and the
    /// run proceeds.
    pub fn ensure(&self, required: Option<&str>) -> Result<GateOutcome> {
        let Some(required_str) = required.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(GateOutcome::NotRequired);
        };

        let required = Version::parse(required_str);
        if required.is_min() {
            tracing::warn!(required = required_str, "invalid required version format, skipping check");
            return Ok(GateOutcome::NotRequired);
        }

        let probe = run_bounded(
            &self.settings.command,
            &self.settings.version_args,
            Duration::from_secs(self.settings.version_timeout_seconds),
        );

        match probe {
            Ok(out) if out.timed_out => {
                tracing::warn!(tool = %self.settings.command, "version probe timed out, continuing");
                Ok(GateOutcome::ProbeFailed {
                    reason: "version probe timed out".to_string(),
                })
            }
            Ok(out) => {
                let current = Version::parse(&out.combined());
                tracing::info!(%current, required = required_str, "agent version");

                if current >= required {
                    tracing::info!("agent CLI is up to date");
                    return Ok(GateOutcome::UpToDate { current });
                }

                tracing::info!(required = required_str, "upgrading agent CLI");
                self.install(required_str)?;
                tracing::info!(version = required_str, "agent CLI upgraded");
                Ok(GateOutcome::Upgraded {
                    from: current,
                    to: required_str.to_string(),
                })
            }
            Err(MedicError::ToolUnavailable(_)) => {
                tracing::warn!(tool = %self.settings.command, "agent CLI not found, attempting install");
                self.install(required_str)?;
                tracing::info!(version = required_str, "agent CLI installed");
                Ok(GateOutcome::Installed {
                    version: required_str.to_string(),
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to check agent version, continuing");
                Ok(GateOutcome::ProbeFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run the install command pinned to `version`.
    fn install(&self, version: &str) -> Result<()> {
        let command_str = render_template(&self.settings.install_command, &vars([("version", version)]))
            .map_err(|e| MedicError::Config(format!("agent.install_command: {}", e)))?;

        let args = shell_words::split(&command_str).map_err(|e| {
            MedicError::Config(format!(
                "failed to parse install command '{}': {}",
                command_str, e
            ))
        })?;

        let (program, rest) = args.split_first().ok_or_else(|| {
            MedicError::Config("agent.install_command is empty".to_string())
        })?;

        let out = run_bounded(
            program,
            rest,
            Duration::from_secs(self.settings.install_timeout_seconds),
        )
        .map_err(|e| MedicError::ToolUnavailable(format!("failed to install {}: {}", version, e)))?;

        if out.is_success() {
            Ok(())
        } else if out.timed_out {
            Err(MedicError::Timeout(format!(
                "install of {} after {}s",
                version, self.settings.install_timeout_seconds
            )))
        } else {
            Err(MedicError::ToolUnavailable(format!(
                "install of {} failed (exit {:?}): {}",
                version,
                out.exit_code,
                out.stderr.trim()
            )))
        }
    }
}
