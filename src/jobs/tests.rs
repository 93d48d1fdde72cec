use super::*;
use crate::error::MedicError;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashSet;

/// In-memory job service. Successful commands update the stored flags so a
/// follow-up fetch sees the new state.
struct FakeJobApi {
    jobs: RefCell<Map<String, Value>>,
    failing: HashSet<String>,
    fetch_error: Option<String>,
    commands: RefCell<Vec<(String, Direction)>>,
}

impl FakeJobApi {
    fn new(jobs: Value) -> Self {
        let Value::Object(map) = jobs else {
            panic!("fixture must be an object");
        };
        Self {
            jobs: RefCell::new(map),
            failing: HashSet::new(),
            fetch_error: None,
            commands: RefCell::new(Vec::new()),
        }
    }

    fn failing_on(mut self, job: &str) -> Self {
        self.failing.insert(job.to_string());
        self
    }

    fn commands(&self) -> Vec<(String, Direction)> {
        self.commands.borrow().clone()
    }
}

impl JobApi for FakeJobApi {
    fn fetch_jobs(&self) -> crate::error::Result<Map<String, Value>> {
        match &self.fetch_error {
            Some(msg) => Err(MedicError::Transport(msg.clone())),
            None => Ok(self.jobs.borrow().clone()),
        }
    }

    fn send_command(&self, job: &str, direction: Direction) -> crate::error::Result<()> {
        self.commands.borrow_mut().push((job.to_string(), direction));
        if self.failing.contains(job) {
            return Err(MedicError::Transport(format!("connection reset on {}", job)));
        }
        let paused = direction == Direction::Pause;
        if let Some(entry) = self.jobs.borrow_mut().get_mut(job) {
            entry["queueStatus"] = json!({"isPaused": paused, "isActive": !paused});
        }
        Ok(())
    }
}

fn job(paused: bool, active: bool) -> Value {
    json!({
        "jobCounts": {"active": 0, "waiting": 3},
        "queueStatus": {"isPaused": paused, "isActive": active}
    })
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_resume_partial_failure_continues() {
    let api = FakeJobApi::new(json!({
        "A": job(true, false),
        "B": job(true, false),
        "C": job(true, false),
    }))
    .failing_on("B");

    let outcome = reconcile(&api, Direction::Resume);

    assert_eq!(outcome.acted, names(&["A", "C"]));
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors["B"].contains("connection reset on B"));
    assert_eq!(api.commands().len(), 3);
}

#[test]
fn test_resume_twice_is_idempotent() {
    let api = FakeJobApi::new(json!({
        "thumbnailGeneration": job(true, false),
        "metadataExtraction": job(true, true),
        "smartSearch": job(false, true),
    }));

    let first = reconcile(&api, Direction::Resume);
    assert_eq!(first.acted, names(&["thumbnailGeneration", "metadataExtraction"]));
    assert_eq!(first.skipped, names(&["smartSearch"]));

    let second = reconcile(&api, Direction::Resume);
    assert!(second.acted.is_empty());
    assert_eq!(
        second.skipped,
        names(&["thumbnailGeneration", "metadataExtraction", "smartSearch"])
    );
    assert!(!second.has_errors());
}

#[test]
fn test_pause_is_symmetric() {
    let api = FakeJobApi::new(json!({
        "running": job(false, true),
        "paused": job(true, true),
        "idle": job(false, false),
    }));

    let outcome = reconcile(&api, Direction::Pause);

    assert_eq!(outcome.acted, names(&["running"]));
    assert_eq!(outcome.skipped, names(&["paused"]));
    assert_eq!(api.commands(), vec![("running".to_string(), Direction::Pause)]);
}

#[test]
fn test_idle_jobs_are_ignored() {
    let api = FakeJobApi::new(json!({ "idle": job(false, false) }));

    let outcome = reconcile(&api, Direction::Resume);

    assert_eq!(outcome, ReconcileOutcome::default());
    assert!(api.commands().is_empty());
}

#[test]
fn test_malformed_entries_are_skipped() {
    let api = FakeJobApi::new(json!({
        "notAnObject": 42,
        "nullQueue": {"queueStatus": null},
        "wrongType": {"queueStatus": {"isPaused": "yes"}},
        "noQueue": {"jobCounts": {}},
        "good": job(true, false),
    }));

    let outcome = reconcile(&api, Direction::Resume);

    assert_eq!(outcome.acted, names(&["good"]));
    assert!(outcome.skipped.is_empty());
    assert!(!outcome.has_errors());
    assert_eq!(api.commands().len(), 1);
}

#[test]
fn test_fetch_failure_is_single_error() {
    let mut api = FakeJobApi::new(json!({ "A": job(true, false) }));
    api.fetch_error = Some("connection refused".to_string());

    let outcome = reconcile(&api, Direction::Resume);

    assert!(outcome.acted.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[FETCH_ERROR_KEY].contains("connection refused"));
    assert!(api.commands().is_empty());
}

#[test]
fn test_unreachable_http_server_fails_reconcile() {
    let api = HttpJobApi::new(
        "http://127.0.0.1:1",
        secrecy::SecretString::from("key".to_string()),
        std::time::Duration::from_secs(2),
    )
    .unwrap();

    let outcome = reconcile(&api, Direction::Pause);

    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors.contains_key(FETCH_ERROR_KEY));
}

#[test]
fn test_snapshot_keeps_raw_response() {
    let api = FakeJobApi::new(json!({ "A": job(true, false), "junk": "x" }));

    let snapshot = fetch_snapshot(&api).unwrap();

    assert_eq!(snapshot.raw().len(), 2);
    assert_eq!(snapshot.queue_states().count(), 1);
}

#[test]
fn test_normalize_server_url() {
    assert_eq!(normalize_server_url("http://host:2283"), "http://host:2283");
    assert_eq!(normalize_server_url("http://host:2283/"), "http://host:2283");
    assert_eq!(normalize_server_url("http://host:2283/api"), "http://host:2283");
    assert_eq!(normalize_server_url("http://host:2283/api/"), "http://host:2283");
    assert_eq!(normalize_server_url("http://host:2283/apis"), "http://host:2283/apis");
}
