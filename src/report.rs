//! Throughput summary of a stopped session.

use serde::{Deserialize, Serialize};

/// What the session's accumulated size counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Bytes, reported with decimal KB/MB/GB scaling.
    #[default]
    Bytes,

    /// Caller-defined unit (e.g. "transactions"), reported unscaled.
    Custom(String),
}

impl Unit {
    /// A caller-defined unit.
    pub fn custom(name: impl Into<String>) -> Self {
        Unit::Custom(name.into())
    }
}

/// Scale a byte count to the largest decimal prefix that keeps it above 1.
///
/// Exactly 1000 bytes stays in bytes; KB starts strictly above it.
pub fn scale_bytes(bytes: u64) -> (f64, &'static str) {
    const K: u64 = 1000;
    const M: u64 = K * K;
    const G: u64 = M * K;

    let amount = bytes as f64;
    match bytes {
        b if b >= G => (amount / G as f64, "GB"),
        b if b >= M => (amount / M as f64, "MB"),
        b if b > K => (amount / K as f64, "KB"),
        _ => (amount, "bytes"),
    }
}

/// Result of a deadline-bounded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Accumulated size at stop.
    pub size: u64,

    /// Seconds between start and stop.
    pub elapsed_secs: f64,

    /// What `size` counts.
    pub unit: Unit,

    /// Whether the deadline fired before stop.
    pub timed_out: bool,

    /// Deadline backend that bounded the run.
    pub deadline: String,
}

impl Report {
    /// Processed amount and its unit label, scaled for display.
    pub fn scaled(&self) -> (f64, String) {
        match &self.unit {
            Unit::Bytes => {
                let (amount, label) = scale_bytes(self.size);
                (amount, label.to_string())
            }
            Unit::Custom(name) => (self.size as f64, name.clone()),
        }
    }

    /// Scaled amount per second. Zero if no time elapsed.
    pub fn rate(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.scaled().0 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (amount, label) = self.scaled();
        write!(
            f,
            "Processed {:.2} {} in {:.2} secs: {:.2} {}/sec",
            amount,
            label,
            self.elapsed_secs,
            self.rate(),
            label
        )
    }
}
