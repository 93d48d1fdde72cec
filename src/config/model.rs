//! Config struct definition.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a medic invocation.
///
/// Loaded from an optional YAML file, then overlaid with environment
/// variables once at startup. Unknown YAML fields are ignored and every
/// field has a default, so an empty document is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentSettings,
    pub paths: PathSettings,
    pub credentials: CredentialSettings,
    pub notify: NotifySettings,
    pub jobs: JobsSettings,
    pub sysinfo: SysinfoSettings,
}
