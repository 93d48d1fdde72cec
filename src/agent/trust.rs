//! Trusted-folders artifact for the agent CLI.

use crate::config::AgentSettings;
use crate::error::{MedicError, Result};
use crate::fs::atomic_write_file;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `{"trusted_folders": [...]}`, overwritten on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustConfig {
    pub trusted_folders: Vec<String>,
}

impl TrustConfig {
    /// The resolved project directory first, then the configured folders,
    /// without duplicates.
    pub fn for_project(settings: &AgentSettings, project_dir: &Path) -> Self {
        let project = std::fs::canonicalize(project_dir)
            .unwrap_or_else(|_| project_dir.to_path_buf())
            .to_string_lossy()
            .into_owned();

        let mut trusted_folders = vec![project];
        for folder in &settings.trusted_folders {
            if !trusted_folders.contains(folder) {
                trusted_folders.push(folder.clone());
            }
        }
        Self { trusted_folders }
    }
}

/// `~/.copilot/config.json`.
pub fn default_trust_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".copilot").join("config.json"))
        .ok_or_else(|| MedicError::Config("cannot determine home directory".to_string()))
}

/// Write the trust artifact and return where it went.
pub fn write_trust_config(settings: &AgentSettings, project_dir: &Path) -> Result<PathBuf> {
    let path = match &settings.trust_config_path {
        Some(path) => path.clone(),
        None => default_trust_config_path()?,
    };

    let config = TrustConfig::for_project(settings, project_dir);
    let json = serde_json::to_string(&config)
        .map_err(|e| MedicError::Parse(format!("failed to serialize trust config: {}", e)))?;
    atomic_write_file(&path, &json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_dir_first_and_deduplicated() {
        let settings = AgentSettings::default();
        let config = TrustConfig::for_project(&settings, Path::new("/app"));

        assert_eq!(config.trusted_folders[0], "/app");
        assert_eq!(
            config.trusted_folders.iter().filter(|f| *f == "/app").count(),
            1
        );
        assert!(config.trusted_folders.contains(&"/state".to_string()));
        assert!(config.trusted_folders.contains(&"/host/emhttp".to_string()));
    }

    #[test]
    fn test_project_dir_is_resolved() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a");
        std::fs::create_dir(&nested).unwrap();
        let dotted = nested.join("..").join("a");

        let config = TrustConfig::for_project(&AgentSettings::default(), &dotted);

        assert_eq!(
            config.trusted_folders[0],
            nested.canonicalize().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn test_write_overwrites_previous_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".copilot").join("config.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"trusted_folders":["/old"],"other":1}"#).unwrap();

        let settings = AgentSettings {
            trust_config_path: Some(path.clone()),
            trusted_folders: vec!["/state".to_string()],
            ..Default::default()
        };
        let written = write_trust_config(&settings, Path::new("/nonexistent/project")).unwrap();
        assert_eq!(written, path);

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"trusted_folders": ["/nonexistent/project", "/state"]})
        );
    }
}
