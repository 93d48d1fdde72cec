//! Error types for medic.
//!
//! Uses thiserror for derive macros. Variants follow the failure taxonomy of
//! the orchestration run and the job reconciler; most of them are recovered
//! into result values at component boundaries and only reach `main` when a
//! run cannot start at all.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for medic operations.
#[derive(Error, Debug)]
pub enum MedicError {
    /// A required secret or setting is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An external tool binary could not be found or installed.
    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),

    /// An external process exceeded its time bound.
    #[error("timed out: {0}")]
    Timeout(String),

    /// A remote API was unreachable, returned a non-2xx status, or sent an
    /// undecodable body.
    #[error("transport error: {0}")]
    Transport(String),

    /// Structured data could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Notification delivery failed.
    #[error("notification failed: {0}")]
    Notify(String),

    /// Filesystem or process I/O failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// User provided invalid arguments.
    #[error("{0}")]
    UserError(String),
}

impl MedicError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            MedicError::Config(_) => exit_codes::CONFIG_ERROR,
            MedicError::Transport(_) => exit_codes::TRANSPORT_FAILURE,
            MedicError::ToolUnavailable(_)
            | MedicError::Timeout(_)
            | MedicError::Parse(_)
            | MedicError::Notify(_)
            | MedicError::Io(_)
            | MedicError::UserError(_) => exit_codes::FAILURE,
        }
    }
}

impl From<reqwest::Error> for MedicError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MedicError::Parse(err.to_string())
        } else {
            MedicError::Transport(err.to_string())
        }
    }
}

/// Result type alias for medic operations.
pub type Result<T> = std::result::Result<T, MedicError>;
