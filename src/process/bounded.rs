//! Short, bounded helper commands.
//!
//! Used for version probes, installs, notification delivery and container
//! polling: run to completion with captured stdout/stderr and a hard time
//! bound. Output is drained on background threads so a chatty child cannot
//! fill its pipe and stall before the deadline.

use super::kill::{isolate_process_group, kill_tree};
use crate::error::{MedicError, Result};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a bounded command.
#[derive(Debug, Clone)]
pub struct BoundedOutput {
    /// Exit code; `None` when killed on timeout or by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl BoundedOutput {
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// stdout and stderr concatenated, trimmed.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout.trim(), self.stderr.trim())
    }
}

/// Run `program args...` to completion within `timeout`.
///
/// A missing executable is reported as [`MedicError::ToolUnavailable`] so
/// callers can tell it apart from other spawn failures.
pub fn run_bounded<S: AsRef<str>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> Result<BoundedOutput> {
    let mut command = Command::new(program);
    command
        .args(args.iter().map(|a| a.as_ref()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    isolate_process_group(&mut command);

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MedicError::ToolUnavailable(format!("'{}' not found", program))
        } else {
            MedicError::Io(format!("failed to execute '{}': {}", program, e))
        }
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let (exit_code, timed_out) = wait_with_timeout(&mut child, timeout)?;

    Ok(BoundedOutput {
        exit_code,
        stdout: collect(stdout),
        stderr: collect(stderr),
        timed_out,
    })
}

/// Wait for a child process with timeout, killing its tree on expiry.
///
/// Returns (exit_code, timed_out).
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_tree(child);
                    return Ok((None, true));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill_tree(child);
                return Err(MedicError::Io(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
