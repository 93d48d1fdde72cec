//! External process execution.
//!
//! - **Supervisor**: long-running agent runs with live echo, capture, and a
//!   hard timeout that kills the whole process tree
//! - **Bounded**: short helper commands run to completion with captured output

mod bounded;
mod kill;
mod supervisor;

pub use bounded::{BoundedOutput, run_bounded};
pub use supervisor::{RunOutcome, RunResult, SupervisedCommand, run};
