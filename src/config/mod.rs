//! Configuration model for medic.
//!
//! The config is an explicit struct threaded into each component rather than
//! process-global environment state. It is read from an optional YAML file
//! and overlaid with the environment variables the deployment sets.

mod model;
mod operations;
pub mod types;


pub use model::Config;
pub use types::{
    AgentSettings, CredentialSettings, JobsSettings, NotifySettings, PathSettings,
    SysinfoSettings,
};
