//! Agent version checking and upgrade.
//!
//! - **Version**: a `major.minor.patch` triple extracted from free text
//! - **VersionGate**: probe the installed agent and install/upgrade it when
//!   it is missing or older than the configured minimum

mod gate;

pub use gate::{GateOutcome, VersionGate};

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap_or_else(|e| panic!("invalid version regex: {}", e))
});

/// A semantic-ish version triple, totally ordered field by field.
///
/// `Version::MIN` (`0.0.0`) is what unparsable input yields, so a garbled
/// probe never reads as "up to date".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const MIN: Version = Version::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extract the first `N.N.N` from arbitrary text, e.g. `"copilot version 0.0.365"`.
    pub fn parse(text: &str) -> Self {
        let Some(caps) = VERSION_RE.captures(text) else {
            return Self::MIN;
        };

        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
        match (field(1), field(2), field(3)) {
            (Some(major), Some(minor), Some(patch)) => Self::new(major, minor, patch),
            _ => Self::MIN,
        }
    }

    pub fn is_min(&self) -> bool {
        *self == Self::MIN
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
