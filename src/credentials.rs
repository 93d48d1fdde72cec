//! Secret lookup from the environment and mounted files.
//!
//! Precedence for each secret:
//! 1. The first listed environment variable with a real value
//! 2. The designated key file, trimmed
//! 3. Each fallback file, in order
//!
//! Environment values starting with `__` are unfilled template placeholders
//! and count as absent. Empty values and empty files are skipped too.

use crate::error::{MedicError, Result};
use secrecy::SecretString;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix marking an unfilled template value.
const PLACEHOLDER_PREFIX: &str = "__";

/// Where a secret was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Env(String),
    File(PathBuf),
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Env(var) => write!(f, "environment variable {}", var),
            SecretSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where to look for one secret.
#[derive(Debug, Clone)]
pub struct SecretSpec<'a> {
    /// Human-readable name for logs and errors.
    pub name: &'a str,
    pub env_vars: &'a [String],
    pub file: Option<&'a Path>,
    pub fallbacks: &'a [PathBuf],
}

/// A resolved secret and its origin.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub secret: SecretString,
    pub source: SecretSource,
}

/// Secret resolver over a snapshot of the environment.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    env: HashMap<String, String>,
}

impl CredentialStore {
    /// Snapshot the current process environment.
    pub fn from_env() -> Self {
        Self {
            env: std::env::vars().collect(),
        }
    }

    /// Build a store over an explicit environment.
    pub fn with_env(env: HashMap<String, String>) -> Self {
        Self { env }
    }

    /// Resolve a secret; `None` means Missing.
    pub fn resolve(&self, spec: &SecretSpec<'_>) -> Option<Resolved> {
        for var in spec.env_vars {
            if let Some(value) = self.env.get(var).and_then(|v| usable(v)) {
                return Some(Resolved {
                    secret: SecretString::from(value),
                    source: SecretSource::Env(var.clone()),
                });
            }
        }

        spec.file
            .into_iter()
            .chain(spec.fallbacks.iter().map(PathBuf::as_path))
            .find_map(|path| read_secret_file(spec.name, path))
    }

    /// Resolve a secret that the run cannot proceed without.
    pub fn require(&self, spec: &SecretSpec<'_>) -> Result<Resolved> {
        match self.resolve(spec) {
            Some(resolved) => {
                tracing::info!(secret = spec.name, source = %resolved.source, "loaded credential");
                Ok(resolved)
            }
            None => Err(MedicError::Config(format!(
                "no {} found. Set {} or create {}",
                spec.name,
                if spec.env_vars.is_empty() {
                    "an environment variable".to_string()
                } else {
                    spec.env_vars.join("/")
                },
                spec.file
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "a key file".to_string())
            ))),
        }
    }

    /// Resolve a secret whose absence is informational only.
    pub fn optional(&self, spec: &SecretSpec<'_>) -> Option<Resolved> {
        let resolved = self.resolve(spec);
        match &resolved {
            Some(r) => tracing::info!(secret = spec.name, source = %r.source, "loaded credential"),
            None => tracing::info!(secret = spec.name, "credential not found, continuing without it"),
        }
        resolved
    }
}

fn usable(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.starts_with(PLACEHOLDER_PREFIX) {
        None
    } else {
        Some(value.to_string())
    }
}

fn read_secret_file(name: &str, path: &Path) -> Option<Resolved> {
    if !path.exists() {
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let value = content.trim();
            if value.is_empty() {
                tracing::warn!(secret = name, path = %path.display(), "key file is empty");
                None
            } else {
                Some(Resolved {
                    secret: SecretString::from(value.to_string()),
                    source: SecretSource::File(path.to_path_buf()),
                })
            }
        }
        Err(e) => {
            tracing::error!(secret = name, path = %path.display(), error = %e, "failed to read key file");
            None
        }
    }
}
