//! Configuration for benchmark sessions.

use std::time::Duration;

use crate::measurement::DeadlineSpec;
use crate::report::Unit;

/// Default run length, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration options for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Deadline used by [`Session::run`](crate::Session::run) (default: 5 s).
    pub timeout: Duration,

    /// Deadline backend (default: `Auto`).
    pub deadline: DeadlineSpec,

    /// What the accumulated size counts (default: bytes).
    pub unit: Unit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deadline: DeadlineSpec::Auto,
            unit: Unit::Bytes,
        }
    }
}

impl Config {
    /// Set the run length in whole seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set the run length.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Choose the deadline backend.
    pub fn deadline(mut self, spec: DeadlineSpec) -> Self {
        self.deadline = spec;
        self
    }

    /// Set the unit the accumulated size is reported in.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }
}
