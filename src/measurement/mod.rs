//! Measurement infrastructure for deadline-bounded runs.
//!
//! This module provides:
//! - A monotonic [`Clock`] for bracketing a run
//! - The shared [`CompletionFlag`] a workload loop polls
//! - [`DeadlineController`] and its platform backends
//!
//! # Backend Selection
//!
//! By default deadlines use the platform's best mechanism:
//! - **unix**: `SIGALRM` from a one-shot `ITIMER_REAL` timer
//! - **elsewhere**: a background thread blocked in `recv_timeout`
//!
//! The thread backend can be forced on any platform with
//! [`DeadlineSpec::Thread`], which also lifts the one-armed-deadline-per-process
//! restriction that comes with `SIGALRM`.

mod clock;
pub mod deadline;
mod flag;

pub use clock::{black_box, elapsed, now, Clock, Timestamp};
pub use deadline::{BoxedDeadline, Deadline, DeadlineController, DeadlineSpec};
pub use flag::CompletionFlag;
