//! Agent CLI invocation.
//!
//! - **Prompt**: instruction payload loading with a fallback
//! - **Trust**: the per-user trusted-folders artifact written before each run
//! - **Invocation**: argument construction and supervised execution
//!
//! The agent is a black box: it receives a natural-language prompt, acts on
//! its own, prints free text with marker lines, and exits. Its exit code
//! says nothing about the reported status.

mod prompt;
mod trust;

pub use prompt::load_prompt;
pub use trust::write_trust_config;

use crate::config::Config;
use crate::process::{RunResult, SupervisedCommand, run};
use std::collections::HashMap;
use std::time::Duration;

/// Build the agent's argument list for `prompt`.
///
/// `-p <prompt> --model <model> <allow flags...> --deny-tool <pattern>...`
///
/// The leading `-p <prompt>` is left out when the prompt goes over stdin.
pub fn agent_args(config: &Config, prompt: &str) -> Vec<String> {
    let agent = &config.agent;
    let mut args = Vec::new();
    if !agent.prompt_via_stdin {
        args.push("-p".to_string());
        args.push(prompt.to_string());
    }
    args.push("--model".to_string());
    args.push(agent.model.clone());
    args.extend(agent.allow_flags.iter().cloned());
    for pattern in &agent.deny_tools {
        args.push("--deny-tool".to_string());
        args.push(pattern.clone());
    }
    args
}

/// Trust the configured folders and run the agent under supervision.
///
/// `env` carries secrets forwarded to the agent only. Never fails: every
/// launch or runtime problem comes back inside the [`RunResult`].
pub fn run_agent(config: &Config, prompt: &str, env: HashMap<String, String>) -> RunResult {
    match write_trust_config(&config.agent, &config.paths.project_dir) {
        Ok(path) => tracing::debug!(path = %path.display(), "wrote agent trust configuration"),
        Err(e) => tracing::warn!(error = %e, "failed to write agent trust configuration, continuing"),
    }

    tracing::info!(
        agent = %config.agent.command,
        model = %config.agent.model,
        timeout_seconds = config.agent.timeout_seconds,
        "calling agent CLI"
    );

    let mut cmd = SupervisedCommand::new(
        &config.agent.command,
        Duration::from_secs(config.agent.timeout_seconds),
    )
    .args(agent_args(config, prompt))
    .cwd(&config.paths.project_dir)
    .envs(env)
    .echo(config.agent.echo_output);
    if config.agent.prompt_via_stdin {
        cmd = cmd.input(prompt);
    }

    let result = run(&cmd);
    tracing::info!(
        success = result.is_success(),
        exit_code = result.exit_code,
        outcome = ?result.outcome,
        started_at = %result.started_at,
        elapsed_ms = result.elapsed.as_millis() as u64,
        bound_secs = result.duration_bound.as_secs(),
        "agent finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::RunOutcome;

    #[test]
    fn test_agent_args_default_layout() {
        let config = Config::default();
        let args = agent_args(&config, "fix the script");

        assert_eq!(
            args,
            vec![
                "-p",
                "fix the script",
                "--model",
                "claude-sonnet-4.5",
                "--allow-all-tools",
                "--allow-all-paths",
                "--deny-tool",
                "shell(rm -rf)",
            ]
        );
    }

    #[test]
    fn test_agent_args_multiple_deny_patterns() {
        let mut config = Config::default();
        config.agent.deny_tools = vec!["shell(rm -rf)".to_string(), "shell(mkfs)".to_string()];
        config.agent.allow_flags.clear();

        let args = agent_args(&config, "p");
        assert_eq!(
            &args[4..],
            &["--deny-tool", "shell(rm -rf)", "--deny-tool", "shell(mkfs)"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_agent_captures_output_and_writes_trust() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let trust = temp_dir.path().join("copilot").join("config.json");

        // `sh -p <file> --model m` runs <file> as a script, so the prompt
        // slot carries a script path and the remaining args become $1 $2.
        let script = temp_dir.path().join("agent.sh");
        std::fs::write(
            &script,
            "echo \"STATUS: SUCCESS\"\necho \"token=$GH_TOKEN\"\necho \"args=$*\"\npwd\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.agent.command = "sh".to_string();
        config.agent.model = "m".to_string();
        config.agent.allow_flags.clear();
        config.agent.deny_tools.clear();
        config.agent.trust_config_path = Some(trust.clone());
        config.agent.timeout_seconds = 10;
        config.agent.echo_output = false;
        config.paths.project_dir = temp_dir.path().canonicalize().unwrap();

        let env = HashMap::from([("GH_TOKEN".to_string(), "tok".to_string())]);
        let result = run_agent(&config, &script.to_string_lossy(), env);

        assert_eq!(result.outcome, RunOutcome::Exited);
        assert_eq!(result.exit_code, 0);
        let lines: Vec<&str> = result.captured_output.lines().collect();
        assert_eq!(lines[0], "STATUS: SUCCESS");
        assert_eq!(lines[1], "token=tok");
        assert_eq!(lines[2], "args=--model m");
        assert_eq!(lines[3], config.paths.project_dir.to_string_lossy());
        assert!(trust.exists());
    }

    #[test]
    fn test_agent_args_without_prompt_when_piped() {
        let mut config = Config::default();
        config.agent.prompt_via_stdin = true;
        config.agent.allow_flags.clear();
        config.agent.deny_tools.clear();

        assert_eq!(agent_args(&config, "fix the script"), vec!["--model", "claude-sonnet-4.5"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_agent_pipes_prompt_on_stdin() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let agent = temp_dir.path().join("agent");
        std::fs::write(&agent, "#!/bin/sh\necho \"args=$*\"\ncat\n").unwrap();
        std::fs::set_permissions(&agent, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = Config::default();
        config.agent.command = agent.to_string_lossy().into_owned();
        config.agent.model = "m".to_string();
        config.agent.allow_flags.clear();
        config.agent.deny_tools.clear();
        config.agent.prompt_via_stdin = true;
        config.agent.echo_output = false;
        config.agent.trust_config_path = Some(temp_dir.path().join("config.json"));
        config.agent.timeout_seconds = 10;
        config.paths.project_dir = temp_dir.path().to_path_buf();

        let result = run_agent(&config, "STATUS: SUCCESS", HashMap::new());

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.captured_output, "args=--model m\nSTATUS: SUCCESS\n");
    }

    #[test]
    fn test_run_agent_missing_binary_is_not_installed() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.agent.command = "nonexistent_agent_cli_xyz".to_string();
        config.agent.trust_config_path = Some(temp_dir.path().join("config.json"));
        config.paths.project_dir = temp_dir.path().to_path_buf();

        let result = run_agent(&config, "prompt", HashMap::new());

        assert_eq!(result.outcome, RunOutcome::NotInstalled);
        assert_eq!(result.exit_code, crate::exit_codes::FAILURE);
    }
}
