//! # deadline-bench
//!
//! Measure throughput of a workload over a bounded amount of time.
//!
//! A [`Session`] captures a monotonic baseline and arms a one-shot deadline.
//! The caller's loop does one unit of work per iteration, records how much
//! it processed, and polls the completion flag. When the deadline fires the
//! flag is raised, the loop exits and `stop` returns the elapsed seconds.
//!
//! ## Deadline Backends
//!
//! - **unix**: `SIGALRM` from a one-shot interval timer. The handler does a
//!   single atomic store. Only one such deadline may be armed per process.
//! - **everywhere**: a background thread blocked in `recv_timeout`.
//!
//! See [`DeadlineSpec`] to choose explicitly.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use deadline_bench::Session;
//!
//! let mut session = Session::new();
//! session.start(Duration::from_secs(2))?;
//! while !session.must_finish() {
//!     let n = process_chunk(&mut buf);
//!     session.record(n as u64);
//! }
//! let secs = session.stop()?;
//! println!("{}", session.report(secs));
//! ```
//!
//! Only one session may be armed at a time on the signal backend; nested
//! sessions fail with [`SetupError::SlotBusy`].

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod report;
mod session;

// Functional modules
pub mod cert_types;
pub mod measurement;
pub mod output;

// Re-exports for public API
pub use config::{Config, DEFAULT_TIMEOUT_SECS};
pub use error::{Error, SetupError, UsageError};
pub use measurement::{
    black_box, Clock, CompletionFlag, Deadline, DeadlineController, DeadlineSpec, Timestamp,
};
pub use report::{scale_bytes, Report, Unit};
pub use session::Session;

pub use cert_types::CertificateType;

/// Run `work` repeatedly for `timeout` with the default configuration.
///
/// Each call is one unit of work; its return value is the amount it
/// processed (bytes unless configured otherwise).
///
/// # Errors
///
/// Returns [`Error::Setup`] if the deadline cannot be armed.
pub fn measure<F>(timeout: std::time::Duration, work: F) -> Result<Report, Error>
where
    F: FnMut() -> u64,
{
    Session::new().run_for(timeout, work)
}
