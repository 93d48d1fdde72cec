//! Config loading, environment overlay, and validation.

use super::model::Config;
use crate::error::{MedicError, Result};
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from a YAML file.
    ///
    /// A missing file yields the default config; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MedicError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct; treat it as defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| MedicError::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay settings from an arbitrary variable lookup.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a default.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("PROJECT_DIR") {
            self.paths.project_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PROMPT_FILE") {
            self.paths.prompt_file = PathBuf::from(v);
        }
        if let Some(v) = get("LOG_DIR") {
            self.paths.log_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ANALYSIS_DIR") {
            self.paths.analysis_dir = PathBuf::from(v);
        }
        if let Some(v) = get("COPILOT_TOKEN_FILE") {
            self.credentials.agent_token_file = PathBuf::from(v);
        }
        if let Some(v) = get("HA_TOKEN_FILE") {
            self.credentials.ha_token_file = PathBuf::from(v);
        }
        if let Some(v) = get("IMMICH_API_KEY_FILE") {
            self.credentials.immich_api_key_file = PathBuf::from(v);
        }
        if let Some(v) = get("NOTIFY_COMMAND") {
            self.notify.command = v;
        }
        if let Some(v) = get("COPILOT_MODEL") {
            self.agent.model = v;
        }
        if let Some(v) = get("COPILOT_VERSION") {
            self.agent.required_version = Some(v);
        }
        if let Some(v) = get("APP_NAME") {
            self.notify.app_name = v;
        }
        if let Some(v) = get("FILEBROWSER_BASE_URL") {
            self.notify.base_url = Some(v);
        }
        if let Some(v) = get("FILEBROWSER_ANALYSIS_PATH") {
            self.notify.analysis_path = Some(v);
        }
        if let Some(v) = get("IMMICH_SERVER") {
            self.jobs.server = v;
        }
    }

    /// Validate config values.
    ///
    /// - `agent.command` must not be empty
    /// - all timeouts must be positive
    pub fn validate(&self) -> Result<()> {
        if self.agent.command.trim().is_empty() {
            return Err(MedicError::Config(
                "config validation failed: agent.command must not be empty".to_string(),
            ));
        }

        let timeouts = [
            ("agent.timeout_seconds", self.agent.timeout_seconds),
            (
                "agent.version_timeout_seconds",
                self.agent.version_timeout_seconds,
            ),
            (
                "agent.install_timeout_seconds",
                self.agent.install_timeout_seconds,
            ),
            ("notify.timeout_seconds", self.notify.timeout_seconds),
            (
                "jobs.request_timeout_seconds",
                self.jobs.request_timeout_seconds,
            ),
            ("jobs.wait_interval_seconds", self.jobs.wait_interval_seconds),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(MedicError::Config(format!(
                    "config validation failed: {} must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }
}
