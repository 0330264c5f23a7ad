//! One-shot deadlines that raise a [`CompletionFlag`].
//!
//! This module provides:
//! - [`Deadline`] - the arm/disarm capability every backend implements
//! - [`BoxedDeadline`] - an enum wrapping the backends available on this target
//! - [`DeadlineSpec`] - which backend to create
//! - [`DeadlineController`] - a backend plus the flag it owns
//!
//! Backends:
//! - [`SignalDeadline`] - `SIGALRM` + `ITIMER_REAL` (unix only)
//! - [`ThreadDeadline`] - background thread waiting on a channel
//!
//! Whatever runs at expiry performs a single atomic store to the flag and
//! nothing else.

#[cfg(unix)]
mod signal;
mod thread;

#[cfg(unix)]
pub use signal::SignalDeadline;
pub use thread::ThreadDeadline;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::flag::CompletionFlag;
use crate::error::SetupError;

/// Capability to schedule a single future flag write.
pub trait Deadline {
    /// Raise `flag` once `timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// - [`SetupError::AlreadyArmed`] if armed and not yet disarmed
    /// - [`SetupError::InvalidTimeout`] for a zero timeout
    /// - a backend-specific error if the platform refuses the timer
    fn arm(&mut self, flag: &CompletionFlag, timeout: Duration) -> Result<(), SetupError>;

    /// Cancel the pending write and restore whatever arming replaced.
    ///
    /// Safe to call repeatedly and after expiry. Never changes the flag's
    /// value. Once it returns the flag will not be written again.
    fn disarm(&mut self);

    /// Whether `arm` succeeded without a matching `disarm`.
    fn is_armed(&self) -> bool;

    /// Backend name for diagnostics and reports.
    fn name(&self) -> &'static str;
}

/// Any of the deadline backends available on this target.
#[derive(Debug)]
pub enum BoxedDeadline {
    /// `SIGALRM`-driven deadline.
    #[cfg(unix)]
    Signal(SignalDeadline),

    /// Timer-thread deadline.
    Thread(ThreadDeadline),
}

impl Deadline for BoxedDeadline {
    fn arm(&mut self, flag: &CompletionFlag, timeout: Duration) -> Result<(), SetupError> {
        match self {
            #[cfg(unix)]
            BoxedDeadline::Signal(d) => d.arm(flag, timeout),
            BoxedDeadline::Thread(d) => d.arm(flag, timeout),
        }
    }

    fn disarm(&mut self) {
        match self {
            #[cfg(unix)]
            BoxedDeadline::Signal(d) => d.disarm(),
            BoxedDeadline::Thread(d) => d.disarm(),
        }
    }

    fn is_armed(&self) -> bool {
        match self {
            #[cfg(unix)]
            BoxedDeadline::Signal(d) => d.is_armed(),
            BoxedDeadline::Thread(d) => d.is_armed(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            #[cfg(unix)]
            BoxedDeadline::Signal(d) => d.name(),
            BoxedDeadline::Thread(d) => d.name(),
        }
    }
}

/// Specification for which deadline backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlineSpec {
    /// `Signal` on unix, `Thread` everywhere else.
    #[default]
    Auto,

    /// `SIGALRM` delivery. Falls back to `Thread` where signals are unavailable.
    ///
    /// Only one signal-backed deadline may be armed per process.
    Signal,

    /// Background waiting thread. No process-wide state.
    Thread,
}

impl DeadlineSpec {
    /// Create a backend according to this specification.
    pub fn create(&self) -> BoxedDeadline {
        match self {
            DeadlineSpec::Thread => BoxedDeadline::Thread(ThreadDeadline::new()),
            DeadlineSpec::Auto | DeadlineSpec::Signal => {
                #[cfg(unix)]
                {
                    BoxedDeadline::Signal(SignalDeadline::new())
                }
                #[cfg(not(unix))]
                {
                    BoxedDeadline::Thread(ThreadDeadline::new())
                }
            }
        }
    }
}

impl std::fmt::Display for DeadlineSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlineSpec::Auto => write!(f, "Auto"),
            DeadlineSpec::Signal => write!(f, "Signal"),
            DeadlineSpec::Thread => write!(f, "Thread"),
        }
    }
}

/// A deadline backend together with the completion flag it raises.
///
/// The controller owns the flag; sessions and workload loops borrow it
/// or hold clones of the handle. Dropping an armed controller disarms it.
#[derive(Debug)]
pub struct DeadlineController {
    flag: CompletionFlag,
    backend: BoxedDeadline,
}

impl DeadlineController {
    /// Controller with a fresh, lowered flag.
    pub fn new(spec: DeadlineSpec) -> Self {
        let backend = spec.create();
        debug!(%spec, backend = backend.name(), "created deadline controller");
        Self {
            flag: CompletionFlag::new(),
            backend,
        }
    }

    /// The flag this controller raises.
    pub fn flag(&self) -> &CompletionFlag {
        &self.flag
    }

    /// Schedule the flag to be raised after `timeout`.
    ///
    /// Does not lower the flag; [`Session::start`](crate::Session::start) does that.
    pub fn arm(&mut self, timeout: Duration) -> Result<(), SetupError> {
        self.backend.arm(&self.flag, timeout)?;
        debug!(backend = self.backend.name(), ?timeout, "deadline armed");
        Ok(())
    }

    /// Cancel the deadline. See [`Deadline::disarm`].
    pub fn disarm(&mut self) {
        if self.backend.is_armed() {
            self.backend.disarm();
            debug!(
                backend = self.backend.name(),
                fired = self.flag.is_set(),
                "deadline disarmed"
            );
        }
    }

    /// Whether a deadline is pending or has fired without being disarmed.
    pub fn is_armed(&self) -> bool {
        self.backend.is_armed()
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub(crate) fn reset_flag(&self) {
        self.flag.reset();
    }
}

impl Drop for DeadlineController {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sigalrm_lock;
    use std::time::Instant;

    fn specs() -> [DeadlineSpec; 2] {
        [DeadlineSpec::Signal, DeadlineSpec::Thread]
    }

    #[test]
    fn test_auto_prefers_signal_on_unix() {
        let backend = DeadlineSpec::Auto.create();
        #[cfg(unix)]
        assert_eq!(backend.name(), "sigalrm");
        #[cfg(not(unix))]
        assert_eq!(backend.name(), "timer-thread");
    }

    #[test]
    fn test_thread_spec_creates_thread_backend() {
        assert_eq!(DeadlineSpec::Thread.create().name(), "timer-thread");
    }

    #[test]
    fn test_flag_flips_once_and_stays() {
        let _guard = sigalrm_lock();
        for spec in specs() {
            let mut controller = DeadlineController::new(spec);
            controller.arm(Duration::from_millis(10)).unwrap();

            let start = Instant::now();
            while !controller.flag().is_set() {
                assert!(start.elapsed() < Duration::from_secs(5), "{} never fired", spec);
                std::thread::yield_now();
            }
            // Stays raised across disarm and afterwards
            controller.disarm();
            for _ in 0..100 {
                assert!(controller.flag().is_set());
            }
        }
    }

    #[test]
    fn test_no_late_flips_after_disarm() {
        let _guard = sigalrm_lock();
        for spec in specs() {
            let mut controller = DeadlineController::new(spec);
            let mut late = 0;
            for i in 0..300u64 {
                controller.reset_flag();
                // Timeouts straddle the time it takes to get to disarm
                controller.arm(Duration::from_micros(1 + i % 50)).unwrap();
                controller.disarm();
                let seen = controller.flag().is_set();
                std::thread::sleep(Duration::from_micros(200));
                if controller.flag().is_set() != seen {
                    late += 1;
                }
            }
            assert_eq!(late, 0, "{} wrote the flag after disarm", spec);
        }
    }

    #[test]
    fn test_drop_disarms() {
        let _guard = sigalrm_lock();
        let flag = {
            let mut controller = DeadlineController::new(DeadlineSpec::Auto);
            controller.arm(Duration::from_millis(30)).unwrap();
            controller.flag().clone()
        };
        std::thread::sleep(Duration::from_millis(80));
        assert!(!flag.is_set());
        #[cfg(unix)]
        assert!(!SignalDeadline::slot_in_use());
    }

    #[test]
    fn test_disarm_on_unarmed_controller_is_noop() {
        let mut controller = DeadlineController::new(DeadlineSpec::Thread);
        controller.disarm();
        controller.disarm();
        assert!(!controller.is_armed());
        assert!(!controller.flag().is_set());
    }
}
