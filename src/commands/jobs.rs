//! Implementation of the `medic jobs` command.

use crate::cli::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::credentials::{CredentialStore, SecretSpec};
use crate::error::{MedicError, Result};
use crate::exit_codes;
use crate::jobs::{
    Direction, HttpJobApi, JobApi, ReconcileOutcome, fetch_snapshot, normalize_server_url,
    reconcile, wait_for_container,
};
use secrecy::SecretString;
use std::time::Duration;

const API_KEY_VAR: &str = "IMMICH_API_KEY";

pub fn cmd_jobs(args: JobsArgs, config: &Config) -> Result<i32> {
    let server = normalize_server_url(args.server.as_deref().unwrap_or(&config.jobs.server));
    let api_key = resolve_api_key(&args, config, &CredentialStore::from_env())?;

    if args.wait {
        wait_for_container(
            &config.jobs.wait_container,
            Duration::from_secs(config.jobs.wait_interval_seconds),
        )?;
    }

    let api = HttpJobApi::new(
        server,
        api_key,
        Duration::from_secs(config.jobs.request_timeout_seconds),
    )?;
    run_action(args.action, &api)
}

fn resolve_api_key(args: &JobsArgs, config: &Config, store: &CredentialStore) -> Result<SecretString> {
    let creds = &config.credentials;
    let env_vars = [API_KEY_VAR.to_string()];
    let file = args.key_file.as_deref().unwrap_or(&creds.immich_api_key_file);

    let resolved = store.require(&SecretSpec {
        name: "Immich API key",
        env_vars: &env_vars,
        file: Some(file),
        fallbacks: &creds.immich_api_key_fallbacks,
    })?;
    Ok(resolved.secret)
}

/// Perform `action` and print its summary. Returns the process exit code.
pub fn run_action(action: JobsAction, api: &dyn JobApi) -> Result<i32> {
    let direction = match action {
        JobsAction::Status => return print_status(api),
        JobsAction::Resume => Direction::Resume,
        JobsAction::Pause => Direction::Pause,
    };

    let outcome = reconcile(api, direction);
    for line in summarize(direction, &outcome) {
        println!("{}", line);
    }

    Ok(if outcome.has_errors() {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    })
}

fn print_status(api: &dyn JobApi) -> Result<i32> {
    match fetch_snapshot(api) {
        Ok(snapshot) => {
            let json = serde_json::to_string_pretty(snapshot.raw())
                .map_err(|e| MedicError::Parse(format!("failed to format job status: {}", e)))?;
            println!("{}", json);
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to get status");
            Ok(exit_codes::FAILURE)
        }
    }
}

/// Human-readable reconcile summary.
fn summarize(direction: Direction, outcome: &ReconcileOutcome) -> Vec<String> {
    let (acted, skipped) = match direction {
        Direction::Resume => ("Resumed", "Already running"),
        Direction::Pause => ("Paused", "Already paused"),
    };

    let mut lines = Vec::new();
    if !outcome.acted.is_empty() {
        lines.push(format!(
            "{} {} job(s): {}",
            acted,
            outcome.acted.len(),
            join(&outcome.acted)
        ));
    }
    if !outcome.skipped.is_empty() {
        lines.push(format!("{}: {}", skipped, join(&outcome.skipped)));
    }
    if outcome.has_errors() {
        lines.push(format!("Errors: {}", outcome.errors.len()));
        for (job, message) in &outcome.errors {
            lines.push(format!("  {}: {}", job, message));
        }
    }
    lines
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::{Map, Value, json};
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct StaticApi {
        jobs: Option<Value>,
    }

    impl JobApi for StaticApi {
        fn fetch_jobs(&self) -> Result<Map<String, Value>> {
            match &self.jobs {
                Some(Value::Object(map)) => Ok(map.clone()),
                _ => Err(MedicError::Transport("connection refused".to_string())),
            }
        }

        fn send_command(&self, job: &str, _direction: Direction) -> Result<()> {
            if job == "broken" {
                Err(MedicError::Transport("HTTP 500".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn args(key_file: Option<std::path::PathBuf>) -> JobsArgs {
        JobsArgs {
            action: JobsAction::Status,
            server: None,
            key_file,
            wait: false,
        }
    }

    #[test]
    fn test_status_exit_codes() {
        let ok = StaticApi {
            jobs: Some(json!({"a": {"queueStatus": {"isPaused": false, "isActive": true}}})),
        };
        assert_eq!(run_action(JobsAction::Status, &ok).unwrap(), exit_codes::SUCCESS);

        let down = StaticApi { jobs: None };
        assert_eq!(run_action(JobsAction::Status, &down).unwrap(), exit_codes::FAILURE);
    }

    #[test]
    fn test_reconcile_errors_exit_nonzero() {
        let api = StaticApi {
            jobs: Some(json!({
                "good": {"queueStatus": {"isPaused": true, "isActive": false}},
                "broken": {"queueStatus": {"isPaused": true, "isActive": false}},
            })),
        };
        assert_eq!(run_action(JobsAction::Resume, &api).unwrap(), exit_codes::FAILURE);

        let api = StaticApi {
            jobs: Some(json!({"good": {"queueStatus": {"isPaused": false, "isActive": true}}})),
        };
        assert_eq!(run_action(JobsAction::Pause, &api).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn test_summary_lines() {
        let mut outcome = ReconcileOutcome::default();
        outcome.acted.insert("thumbnailGeneration".to_string());
        outcome.acted.insert("metadataExtraction".to_string());
        outcome.skipped.insert("smartSearch".to_string());

        assert_eq!(
            summarize(Direction::Resume, &outcome),
            vec![
                "Resumed 2 job(s): metadataExtraction, thumbnailGeneration",
                "Already running: smartSearch",
            ]
        );

        outcome.errors.insert("faceDetection".to_string(), "HTTP 500".to_string());
        let lines = summarize(Direction::Pause, &outcome);
        assert_eq!(lines[0], "Paused 2 job(s): metadataExtraction, thumbnailGeneration");
        assert_eq!(lines[1], "Already paused: smartSearch");
        assert_eq!(lines[2], "Errors: 1");
        assert_eq!(lines[3], "  faceDetection: HTTP 500");
    }

    #[test]
    fn test_key_file_flag_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join("key");
        std::fs::write(&key, "from-flag\n").unwrap();

        let mut config = Config::default();
        config.credentials.immich_api_key_file = temp_dir.path().join("missing");
        config.credentials.immich_api_key_fallbacks.clear();

        let store = CredentialStore::default();
        assert_eq!(
            resolve_api_key(&args(Some(key)), &config, &store).unwrap().expose_secret(),
            "from-flag"
        );
        assert!(matches!(
            resolve_api_key(&args(None), &config, &store),
            Err(MedicError::Config(_))
        ));
    }

    #[test]
    fn test_placeholder_env_key_falls_through() {
        let temp_dir = TempDir::new().unwrap();
        let key = temp_dir.path().join("key");
        std::fs::write(&key, "real").unwrap();

        let mut config = Config::default();
        config.credentials.immich_api_key_file = key;

        let store = CredentialStore::with_env(HashMap::from([(
            "IMMICH_API_KEY".to_string(),
            "__IMMICH_API_KEY__".to_string(),
        )]));
        assert_eq!(
            resolve_api_key(&args(None), &config, &store).unwrap().expose_secret(),
            "real"
        );
    }
}
