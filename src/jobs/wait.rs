//! Blocking wait for a container to stop running.

use crate::error::Result;
use crate::process::run_bounded;
use std::thread;
use std::time::Duration;

const DOCKER_PS_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll `docker ps` every `interval` until `container` is no longer up.
///
/// There is no overall deadline; callers that need one must wrap this.
pub fn wait_for_container(container: &str, interval: Duration) -> Result<()> {
    let filter = format!("name={}", container);
    let args = ["ps", "--filter", filter.as_str(), "--format", "{{.Status}}"];

    poll_until_stopped(
        || {
            let out = run_bounded("docker", &args, DOCKER_PS_TIMEOUT)?;
            if !out.is_success() {
                tracing::warn!(exit_code = ?out.exit_code, stderr = %out.stderr.trim(), "docker ps failed");
            }
            Ok(out.stdout.trim().to_string())
        },
        container,
        interval,
    )
}

/// Call `probe` until it reports a stopped status. Returns after the first
/// non-running observation.
fn poll_until_stopped<F>(mut probe: F, container: &str, interval: Duration) -> Result<()>
where
    F: FnMut() -> Result<String>,
{
    tracing::info!(container, "waiting for container to complete");
    loop {
        let status = probe()?;
        if !is_running(&status) {
            tracing::info!(container, "container is not running");
            return Ok(());
        }
        tracing::info!(container, %status, "container still running, waiting");
        thread::sleep(interval);
    }
}

fn is_running(status: &str) -> bool {
    !status.is_empty() && status.contains("Up")
}
