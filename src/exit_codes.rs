//! Exit code constants for the medic CLI.
//!
//! - 0: Success
//! - 1: Failure (also the reserved code for supervisor-detected failures)
//! - 2: Configuration error (missing required secret, invalid config)
//! - 3: Transport failure talking to a remote API

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Generic failure.
///
/// Also used as the reserved failure code stamped on a supervised run that
/// timed out, could not find its executable, or failed to launch.
pub const FAILURE: i32 = 1;

/// Configuration error: a required secret or setting is missing or invalid.
pub const CONFIG_ERROR: i32 = 2;

/// Remote API unreachable or returned a non-success status.
pub const TRANSPORT_FAILURE: i32 = 3;
