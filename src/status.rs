//! Status extraction from agent output.
//!
//! The agent reports its verdict with marker lines inside free text:
//!
//! ```text
//! STATUS: FAILURE
//! DIAGNOSIS: element not found
//!   the login button moved below the fold
//! FAILED_ELEMENT: button#login
//! FIX_APPLIED: none
//! ```
//!
//! Extraction is a single pass over the lines with two states. `STATUS:`
//! and `DIAGNOSIS:` assign (later lines overwrite earlier ones);
//! `DIAGNOSIS:` starts accumulating continuation lines into the diagnosis
//! until any other marker line ends it.

use std::fmt;

const STATUS_MARKER: &str = "STATUS:";
const DIAGNOSIS_MARKER: &str = "DIAGNOSIS:";
const FAILED_ELEMENT_MARKER: &str = "FAILED_ELEMENT:";
const FIX_APPLIED_MARKER: &str = "FIX_APPLIED:";

/// Status reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    AuthRequired,
    /// No `STATUS:` marker was seen.
    Unknown,
    /// A `STATUS:` value outside the known set, kept verbatim.
    Other(String),
}

impl Status {
    fn from_marker(value: &str) -> Self {
        match value {
            "SUCCESS" => Status::Success,
            "FAILURE" => Status::Failure,
            "AUTH_REQUIRED" => Status::AuthRequired,
            "UNKNOWN" => Status::Unknown,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
            Status::AuthRequired => "AUTH_REQUIRED",
            Status::Unknown => "UNKNOWN",
            Status::Other(s) => s,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted verdict: exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub diagnosis: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    InDiagnosis,
}

/// Extract the status and diagnosis from captured agent output.
pub fn extract(output: &str) -> Verdict {
    let mut state = ScanState::Scanning;
    let mut status = Status::Unknown;
    let mut diagnosis = String::new();
    let mut saw_status = false;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix(STATUS_MARKER) {
            status = Status::from_marker(rest.trim());
            saw_status = true;
            state = ScanState::Scanning;
        } else if let Some(rest) = line.strip_prefix(DIAGNOSIS_MARKER) {
            diagnosis = rest.trim().to_string();
            state = ScanState::InDiagnosis;
        } else if line.starts_with(FAILED_ELEMENT_MARKER) || line.starts_with(FIX_APPLIED_MARKER) {
            state = ScanState::Scanning;
        } else if state == ScanState::InDiagnosis {
            let continuation = line.trim();
            if !continuation.is_empty() {
                diagnosis.push(' ');
                diagnosis.push_str(continuation);
            }
        }
    }

    // Without a STATUS line there is no verdict to attach a diagnosis to.
    if !saw_status {
        diagnosis.clear();
    }

    Verdict { status, diagnosis }
}
