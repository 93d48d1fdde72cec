//! Config section types and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the external coding agent and its supervision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Agent executable (looked up on PATH).
    pub command: String,

    /// Model selection passed as `--model`.
    pub model: String,

    /// Wall-clock bound for one supervised run.
    pub timeout_seconds: u64,

    /// Write the prompt to the agent's stdin instead of passing `-p <prompt>`.
    pub prompt_via_stdin: bool,

    /// Echo agent output to stdout as it arrives.
    pub echo_output: bool,

    /// Permission-broadening flags passed verbatim.
    pub allow_flags: Vec<String>,

    /// Tool patterns the agent is denied, each passed as `--deny-tool <pattern>`.
    pub deny_tools: Vec<String>,

    /// Filesystem roots written into the trust artifact, after the project dir.
    pub trusted_folders: Vec<String>,

    /// Location of the trust artifact. Defaults to `~/.copilot/config.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_config_path: Option<PathBuf>,

    /// Minimum agent version; unset disables the version gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_version: Option<String>,

    /// Arguments that make the agent print its version.
    pub version_args: Vec<String>,

    pub version_timeout_seconds: u64,

    /// Install/upgrade command template; `{version}` is substituted.
    pub install_command: String,

    pub install_timeout_seconds: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            command: "copilot".to_string(),
            model: "claude-sonnet-4.5".to_string(),
            timeout_seconds: 600,
            prompt_via_stdin: false,
            echo_output: true,
            allow_flags: vec![
                "--allow-all-tools".to_string(),
                "--allow-all-paths".to_string(),
            ],
            deny_tools: default_deny_tools(),
            trusted_folders: vec![
                "/state".to_string(),
                "/app".to_string(),
                "/host".to_string(),
                "/host/proc".to_string(),
                "/host/emhttp".to_string(),
            ],
            trust_config_path: None,
            required_version: None,
            version_args: vec!["--version".to_string()],
            version_timeout_seconds: 30,
            install_command: "npm install -g @github/copilot@{version}".to_string(),
            install_timeout_seconds: 300,
        }
    }
}

/// Default deny-list: block recursive deletes.
pub fn default_deny_tools() -> Vec<String> {
    vec!["shell(rm -rf)".to_string()]
}

/// Working paths for the orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Working directory of the agent; also the first trusted folder.
    pub project_dir: PathBuf,

    /// Instruction payload handed to the agent.
    pub prompt_file: PathBuf,

    pub log_dir: PathBuf,

    /// Where captured agent output is saved.
    pub analysis_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("/app"),
            prompt_file: PathBuf::from("/app/copilot_prompt.md"),
            log_dir: PathBuf::from("/app/logs"),
            analysis_dir: PathBuf::from("/state/analysis"),
        }
    }
}

/// Where secrets live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Environment variables checked, in order, for the agent token.
    pub agent_token_env: Vec<String>,

    pub agent_token_file: PathBuf,

    pub ha_token_file: PathBuf,

    pub immich_api_key_file: PathBuf,

    /// Consulted in order when the Immich key file is absent.
    pub immich_api_key_fallbacks: Vec<PathBuf>,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            agent_token_env: vec![
                "GH_TOKEN".to_string(),
                "GITHUB_TOKEN".to_string(),
                "COPILOT_GITHUB_TOKEN".to_string(),
            ],
            agent_token_file: PathBuf::from("/root/.auth/.copilot-token"),
            ha_token_file: PathBuf::from("/root/.auth/.ha_api_key"),
            immich_api_key_file: PathBuf::from("/root/.auth/.immich_api_key"),
            immich_api_key_fallbacks: vec![
                PathBuf::from("/app/cache/.immich_api_key"),
                PathBuf::from("state/.immich_api_key"),
                PathBuf::from("cache/.immich_api_key"),
            ],
        }
    }
}

/// Notification delivery and link shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Host notify command; may carry leading arguments (shell-words syntax).
    pub command: String,

    /// Event tag attached to orchestration notifications.
    pub event: String,

    /// Prefix of the notification subject, followed by `: <STATUS>`.
    pub subject_prefix: String,

    /// Application name used to derive the default analysis path.
    pub app_name: String,

    /// Public base URL for analysis files; unset leaves links untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Path of the analysis directory below `base_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_path: Option<String>,

    /// Link prefixes recognised as the analysis directory.
    pub link_prefixes: Vec<String>,

    pub timeout_seconds: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            command: "/usr/local/bin/send_alert".to_string(),
            event: "copilot-system-monitor".to_string(),
            subject_prefix: "Takeout Script".to_string(),
            app_name: "vscode-monitor".to_string(),
            base_url: None,
            analysis_path: None,
            link_prefixes: vec![
                "/app/state/analysis/".to_string(),
                "/state/analysis/".to_string(),
                "/analysis/".to_string(),
            ],
            timeout_seconds: 30,
        }
    }
}

impl NotifySettings {
    /// Analysis path below the base URL, derived from `app_name` when unset.
    pub fn effective_analysis_path(&self) -> String {
        self.analysis_path
            .clone()
            .unwrap_or_else(|| format!("appdata/{}/state/analysis", self.app_name))
    }
}

/// Remote job API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsSettings {
    pub server: String,

    pub request_timeout_seconds: u64,

    /// Container whose completion `--wait` blocks on.
    pub wait_container: String,

    pub wait_interval_seconds: u64,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            server: "http://192.168.1.216:2283".to_string(),
            request_timeout_seconds: 30,
            wait_container: "immich-import".to_string(),
            wait_interval_seconds: 30,
        }
    }
}

/// Host mounts read by `sysinfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SysinfoSettings {
    pub host_proc: PathBuf,
    pub host_emhttp: PathBuf,
}

impl Default for SysinfoSettings {
    fn default() -> Self {
        Self {
            host_proc: PathBuf::from("/host/proc"),
            host_emhttp: PathBuf::from("/host/emhttp"),
        }
    }
}
