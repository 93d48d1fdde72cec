//! Implementation of the `medic monitor` command.
//!
//! One supervised agent pass: version gate, credentials, prompt, agent
//! run, saved output, status extraction and notification. Once the agent
//! has been launched the pass always completes and writes its output file;
//! only problems before launch abort it.

use crate::agent::{load_prompt, run_agent};
use crate::config::Config;
use crate::credentials::{CredentialStore, SecretSpec};
use crate::error::{MedicError, Result};
use crate::fs::atomic_write_file;
use crate::notify::{Notifier, route};
use crate::process::RunResult;
use crate::status::{Verdict, extract};
use crate::version::VersionGate;
use chrono::Local;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const BANNER_WIDTH: usize = 60;

/// Environment variable the agent reads its GitHub token from.
const AGENT_TOKEN_VAR: &str = "GH_TOKEN";
const HA_TOKEN_VAR: &str = "HA_TOKEN";
const IMMICH_KEY_VAR: &str = "IMMICH_API_KEY";

/// What one pass produced.
#[derive(Debug)]
pub struct MonitorReport {
    pub result: RunResult,
    pub verdict: Verdict,
    pub output_file: Option<PathBuf>,
    pub notified: bool,
}

pub fn cmd_monitor(config: &Config) -> Result<i32> {
    let report = run_monitor(config, &CredentialStore::from_env())?;

    println!();
    println!("[{}] Monitor complete. Status: {}", Local::now(), report.verdict.status);
    tracing::info!(
        status = %report.verdict.status,
        exit_code = report.result.exit_code,
        notified = report.notified,
        output_file = ?report.output_file,
        "monitor complete"
    );
    Ok(report.result.exit_code)
}

/// Run one pass against an explicit credential store.
pub fn run_monitor(config: &Config, store: &CredentialStore) -> Result<MonitorReport> {
    for dir in [&config.paths.log_dir, &config.paths.analysis_dir] {
        std::fs::create_dir_all(dir).map_err(|e| {
            MedicError::Io(format!("failed to create {}: {}", dir.display(), e))
        })?;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    print_banner(config);

    let env = agent_env(config, store)?;

    VersionGate::new(&config.agent).ensure(config.agent.required_version.as_deref())?;

    let prompt = load_prompt(&config.paths.prompt_file);
    tracing::info!(chars = prompt.chars().count(), "prompt loaded");

    let result = run_agent(config, &prompt, env);

    let output_file = save_output(&config.paths.analysis_dir, &timestamp, &result);

    let verdict = extract(&result.captured_output);
    let link = output_file.as_deref().map(|p| p.to_string_lossy().into_owned());
    let notified = match route(&verdict, &config.notify, link.as_deref()) {
        Some(event) => Notifier::new(&config.notify).deliver(&event),
        None => false,
    };

    Ok(MonitorReport {
        result,
        verdict,
        output_file,
        notified,
    })
}

fn print_banner(config: &Config) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("{}", rule);
    println!("[{}] Automated Takeout Monitor", Local::now());
    println!("Agent: {}", config.agent.command);
    println!("Model: {}", config.agent.model);
    println!("{}", rule);
}

/// Resolve the agent's secrets into environment overrides for the agent
/// process. The GitHub token is required; the others are optional.
fn agent_env(config: &Config, store: &CredentialStore) -> Result<HashMap<String, String>> {
    let creds = &config.credentials;
    let mut env = HashMap::new();

    let token = store.require(&SecretSpec {
        name: "GitHub token",
        env_vars: &creds.agent_token_env,
        file: Some(&creds.agent_token_file),
        fallbacks: &[],
    })?;
    env.insert(AGENT_TOKEN_VAR.to_string(), token.secret.expose_secret().to_string());

    let optional = [
        ("Home Assistant token", HA_TOKEN_VAR, creds.ha_token_file.as_path()),
        ("Immich API key", IMMICH_KEY_VAR, creds.immich_api_key_file.as_path()),
    ];
    for (name, var, file) in optional {
        let env_vars = [var.to_string()];
        let spec = SecretSpec {
            name,
            env_vars: &env_vars,
            file: Some(file),
            fallbacks: &[],
        };
        if let Some(resolved) = store.optional(&spec) {
            env.insert(var.to_string(), resolved.secret.expose_secret().to_string());
        }
    }

    Ok(env)
}

/// Write the run's output to `{dir}/output_{timestamp}.txt`.
///
/// Lines captured before a timeout are appended after the synthetic
/// message. A write failure is logged and yields `None`.
fn save_output(dir: &Path, timestamp: &str, result: &RunResult) -> Option<PathBuf> {
    let path = dir.join(format!("output_{}.txt", timestamp));

    let mut content = result.captured_output.clone();
    if !result.partial_output.is_empty() {
        content.push_str("\n\n--- output captured before termination ---\n");
        content.push_str(&result.partial_output);
    }

    match atomic_write_file(&path, &content) {
        Ok(()) => {
            println!("Analysis saved to: {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to save agent output");
            None
        }
    }
}
