//! Job-state reconciliation against the photo service's job API.
//!
//! A reconcile fetches one [`JobSnapshot`], then walks it sequentially and
//! sends a pause or resume command to every job that needs one. Per-job
//! failures are recorded and the walk continues; a failed fetch ends the
//! reconcile with a single error entry.

mod api;
mod wait;

#[cfg(test)]
mod tests;

pub use api::{HttpJobApi, JobApi};
pub use wait::wait_for_container;

use crate::error::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Error key used when the snapshot itself could not be fetched.
pub const FETCH_ERROR_KEY: &str = "(fetch)";

/// Which way to move the jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Resume,
    Pause,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Resume => "resume",
            Direction::Pause => "pause",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queue flags of one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobEntry {
    #[serde(default)]
    queue_status: QueueStatus,
}

/// Point-in-time job map as returned by the API.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    raw: Map<String, Value>,
}

impl JobSnapshot {
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// The response exactly as received.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Well-formed entries with their queue flags, in API order.
    /// Entries that are not objects of the expected shape are skipped.
    pub fn queue_states(&self) -> impl Iterator<Item = (&str, QueueStatus)> {
        self.raw.iter().filter_map(|(name, value)| {
            match JobEntry::deserialize(value) {
                Ok(entry) => Some((name.as_str(), entry.queue_status)),
                Err(e) => {
                    tracing::debug!(job = %name, error = %e, "skipping malformed job entry");
                    None
                }
            }
        })
    }
}

/// Result of one reconcile invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub acted: BTreeSet<String>,
    pub skipped: BTreeSet<String>,
    pub errors: BTreeMap<String, String>,
}

impl ReconcileOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// What to do with a job given its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Command,
    Skip,
    Ignore,
}

fn plan(direction: Direction, state: QueueStatus) -> Plan {
    match direction {
        Direction::Resume if state.is_paused => Plan::Command,
        Direction::Resume if state.is_active => Plan::Skip,
        Direction::Pause if state.is_active && !state.is_paused => Plan::Command,
        Direction::Pause if state.is_paused => Plan::Skip,
        _ => Plan::Ignore,
    }
}

/// Fetch the current snapshot.
pub fn fetch_snapshot(api: &dyn JobApi) -> Result<JobSnapshot> {
    api.fetch_jobs().map(JobSnapshot::new)
}

/// Fetch a fresh snapshot and move every job in `direction`.
pub fn reconcile(api: &dyn JobApi, direction: Direction) -> ReconcileOutcome {
    match fetch_snapshot(api) {
        Ok(snapshot) => apply(api, &snapshot, direction),
        Err(e) => {
            tracing::error!(error = %e, "failed to get jobs status");
            let mut outcome = ReconcileOutcome::default();
            outcome
                .errors
                .insert(FETCH_ERROR_KEY.to_string(), format!("failed to get jobs: {}", e));
            outcome
        }
    }
}

/// Move every job in `snapshot` in `direction`, one at a time.
pub fn apply(api: &dyn JobApi, snapshot: &JobSnapshot, direction: Direction) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    for (name, state) in snapshot.queue_states() {
        match plan(direction, state) {
            Plan::Command => match api.send_command(name, direction) {
                Ok(()) => {
                    tracing::info!(job = %name, command = %direction, "job command sent");
                    outcome.acted.insert(name.to_string());
                }
                Err(e) => {
                    tracing::error!(job = %name, command = %direction, error = %e, "job command failed");
                    outcome.errors.insert(name.to_string(), e.to_string());
                }
            },
            Plan::Skip => {
                outcome.skipped.insert(name.to_string());
            }
            Plan::Ignore => {}
        }
    }

    outcome
}

/// Strip a trailing `/`, then a trailing `/api`.
pub fn normalize_server_url(server: &str) -> String {
    let trimmed = server.trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}
