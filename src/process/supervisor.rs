//! Supervised execution of a long-running external process.
//!
//! The child's stdout and stderr are drained by two reader threads into one
//! bounded channel, which gives a single merged line stream. The calling
//! thread consumes that stream, echoing each line to the terminal as it
//! arrives and appending it to the capture buffer, while watching the
//! wall-clock deadline. On timeout the child's whole process group is killed.
//!
//! `run` never returns an error: launch failures, a missing executable and
//! timeouts are all folded into a [`RunResult`] carrying [`FAILURE`].

use super::kill::{isolate_process_group, kill_tree};
use crate::exit_codes::FAILURE;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

/// Lines buffered between the reader threads and the consumer.
const LINE_QUEUE_DEPTH: usize = 1024;

/// How often the consumer wakes to check the deadline and child status.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to keep draining after the child exits, for lines still in flight.
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited on its own.
    Exited,
    /// The deadline passed and the process tree was killed.
    TimedOut,
    /// The executable could not be found.
    NotInstalled,
    /// Spawning or supervising failed for another reason.
    LaunchFailed,
}

/// Result of one supervised run. Immutable once produced.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Process exit code, or [`FAILURE`] for supervisor-detected failures.
    pub exit_code: i32,
    /// Full merged output, or a synthetic message when the run did not
    /// complete normally.
    pub captured_output: String,
    /// Lines captured before a timeout killed the process.
    pub partial_output: String,
    pub started_at: DateTime<Local>,
    /// The wall-clock bound the run was held to.
    pub duration_bound: Duration,
    pub elapsed: Duration,
    pub outcome: RunOutcome,
}

impl RunResult {
    fn synthetic(
        outcome: RunOutcome,
        message: String,
        started_at: DateTime<Local>,
        duration_bound: Duration,
        elapsed: Duration,
    ) -> Self {
        Self {
            exit_code: FAILURE,
            captured_output: message,
            partial_output: String::new(),
            started_at,
            duration_bound,
            elapsed,
            outcome,
        }
    }

    /// Whether the process exited on its own with code 0.
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Exited && self.exit_code == 0
    }
}

/// Description of a process to supervise.
#[derive(Debug, Clone)]
pub struct SupervisedCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Written to the child's stdin, which is then closed.
    pub input: Option<String>,
    pub cwd: Option<PathBuf>,
    /// Added to the inherited environment.
    pub env: HashMap<String, String>,
    pub timeout: Duration,
    /// Echo each line to stdout as it arrives.
    pub echo: bool,
}

impl SupervisedCommand {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            input: None,
            cwd: None,
            env: HashMap::new(),
            timeout,
            echo: true,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn envs(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

/// Run a command under supervision. Always returns a [`RunResult`].
pub fn run(cmd: &SupervisedCommand) -> RunResult {
    let started_at = Local::now();
    let start = Instant::now();

    if let Some(cwd) = &cmd.cwd
        && !cwd.is_dir()
    {
        let msg = format!(
            "Error running {}: working directory '{}' does not exist",
            cmd.program,
            cwd.display()
        );
        tracing::error!(program = %cmd.program, cwd = %cwd.display(), "launch failed");
        return RunResult::synthetic(
            RunOutcome::LaunchFailed,
            msg,
            started_at,
            cmd.timeout,
            start.elapsed(),
        );
    }

    let mut child = match spawn(cmd) {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let msg = format!("{} not found. Make sure it is installed and on PATH.", cmd.program);
            tracing::error!(program = %cmd.program, "{}", msg);
            return RunResult::synthetic(
                RunOutcome::NotInstalled,
                msg,
                started_at,
                cmd.timeout,
                start.elapsed(),
            );
        }
        Err(e) => {
            let msg = format!("Error running {}: {}", cmd.program, e);
            tracing::error!(program = %cmd.program, error = %e, "launch failed");
            return RunResult::synthetic(
                RunOutcome::LaunchFailed,
                msg,
                started_at,
                cmd.timeout,
                start.elapsed(),
            );
        }
    };

    tracing::debug!(program = %cmd.program, pid = child.id(), "spawned supervised process");

    let lines = match attach_readers(&mut child, cmd.input.clone()) {
        Ok(rx) => rx,
        Err(msg) => {
            kill_tree(&mut child);
            return RunResult::synthetic(
                RunOutcome::LaunchFailed,
                msg,
                started_at,
                cmd.timeout,
                start.elapsed(),
            );
        }
    };

    // A bound too large to represent is treated as unbounded.
    let deadline = start.checked_add(cmd.timeout);
    let mut captured = String::new();

    match consume(&mut child, &lines, deadline, cmd.echo, &mut captured) {
        Ok(Some(code)) => RunResult {
            exit_code: code,
            captured_output: captured,
            partial_output: String::new(),
            started_at,
            duration_bound: cmd.timeout,
            elapsed: start.elapsed(),
            outcome: RunOutcome::Exited,
        },
        Ok(None) => {
            kill_tree(&mut child);
            // Keep whatever the readers had already queued.
            while let Ok(line) = lines.try_recv() {
                push_line(&mut captured, &line, cmd.echo);
            }
            let msg = format!(
                "{} timed out after {}",
                cmd.program,
                humanize(cmd.timeout)
            );
            tracing::error!(program = %cmd.program, timeout_secs = cmd.timeout.as_secs(), "{}", msg);
            let mut result = RunResult::synthetic(
                RunOutcome::TimedOut,
                msg,
                started_at,
                cmd.timeout,
                start.elapsed(),
            );
            result.partial_output = captured;
            result
        }
        Err(e) => {
            kill_tree(&mut child);
            let msg = format!("Error running {}: {}", cmd.program, e);
            tracing::error!(program = %cmd.program, error = %e, "supervision failed");
            RunResult::synthetic(
                RunOutcome::LaunchFailed,
                msg,
                started_at,
                cmd.timeout,
                start.elapsed(),
            )
        }
    }
}

fn spawn(cmd: &SupervisedCommand) -> std::io::Result<Child> {
    let mut command = Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .envs(&cmd.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if cmd.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    if let Some(cwd) = &cmd.cwd {
        command.current_dir(cwd);
    }

    isolate_process_group(&mut command);
    command.spawn()
}

/// Start the stdin writer and the two output readers.
fn attach_readers(
    child: &mut Child,
    input: Option<String>,
) -> Result<Receiver<String>, String> {
    if let (Some(mut stdin), Some(payload)) = (child.stdin.take(), input) {
        thread::spawn(move || {
            if let Err(e) = stdin.write_all(payload.as_bytes()) {
                tracing::debug!(error = %e, "child closed stdin early");
            }
        });
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "child stdout was not captured".to_string())?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| "child stderr was not captured".to_string())?;

    let (tx, rx) = mpsc::sync_channel(LINE_QUEUE_DEPTH);
    spawn_reader(stdout, tx.clone());
    spawn_reader(stderr, tx);
    Ok(rx)
}

fn spawn_reader<R: Read + Send + 'static>(pipe: R, tx: SyncSender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "output reader stopped");
                    break;
                }
            }
        }
    });
}

/// Drain output until the child exits or the deadline passes.
///
/// Returns `Ok(Some(code))` when the child exited, `Ok(None)` on timeout.
/// A `None` deadline never expires.
fn consume(
    child: &mut Child,
    lines: &Receiver<String>,
    deadline: Option<Instant>,
    echo: bool,
    captured: &mut String,
) -> std::io::Result<Option<i32>> {
    let mut exited: Option<(i32, Instant)> = None;
    let mut streams_open = true;

    loop {
        let now = Instant::now();

        if let Some((code, at)) = exited
            && (!streams_open || now.duration_since(at) >= EXIT_DRAIN_GRACE)
        {
            while let Ok(line) = lines.try_recv() {
                push_line(captured, &line, echo);
            }
            return Ok(Some(code));
        }

        if exited.is_none() && deadline.is_some_and(|d| now >= d) {
            return Ok(None);
        }

        let wait = deadline.map_or(POLL_INTERVAL, |d| {
            d.saturating_duration_since(now).min(POLL_INTERVAL)
        });
        if streams_open {
            match lines.recv_timeout(wait) {
                Ok(line) => push_line(captured, &line, echo),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => streams_open = false,
            }
        } else {
            thread::sleep(wait);
        }

        if exited.is_none()
            && let Some(status) = child.try_wait()?
        {
            // Killed by a signal has no code; report it as a plain failure.
            exited = Some((status.code().unwrap_or(FAILURE), Instant::now()));
        }
    }
}

fn push_line(captured: &mut String, line: &str, echo: bool) {
    if echo {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
    captured.push_str(line);
    captured.push('\n');
}

fn humanize(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let mins = secs / 60;
        format!("{} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if secs >= 1 {
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    } else {
        format!("{} ms", d.as_millis())
    }
}
