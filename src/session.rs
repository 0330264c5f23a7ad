//! Deadline-bounded benchmark session.
//!
//! A [`Session`] brackets one measured run:
//!
//! ```ignore
//! let mut session = Session::new();
//! session.start(Duration::from_secs(2))?;
//! while !session.must_finish() {
//!     encrypt_block(&mut buf);
//!     session.record(buf.len() as u64);
//! }
//! let secs = session.stop()?;
//! println!("{}", session.report(secs));
//! ```
//!
//! `Idle -> Armed (start) -> Idle (stop)`. Whether the deadline fired before
//! `stop` is read from the flag; `stop` succeeds either way.

use std::time::Duration;

use tracing::trace;

use crate::config::Config;
use crate::error::{Error, UsageError};
use crate::measurement::{Clock, CompletionFlag, DeadlineController, Timestamp};
use crate::report::{Report, Unit};

/// One measured run.
#[derive(Debug)]
pub struct Session {
    controller: DeadlineController,
    clock: Clock,
    /// `Some` between a successful `start` and `stop`.
    baseline: Option<Timestamp>,
    size: u64,
    config: Config,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Session with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            controller: DeadlineController::new(config.deadline),
            clock: Clock::new(),
            baseline: None,
            size: 0,
            config,
        }
    }

    /// Begin a run bounded by `timeout`.
    ///
    /// Resets the accumulated size and the completion flag, captures the
    /// baseline timestamp, then arms the deadline.
    ///
    /// # Errors
    ///
    /// - [`UsageError::AlreadyStarted`] if the session is running
    /// - [`Error::Setup`] if the deadline cannot be armed; the session stays idle
    pub fn start(&mut self, timeout: Duration) -> Result<(), Error> {
        if self.baseline.is_some() {
            return Err(UsageError::AlreadyStarted.into());
        }

        self.size = 0;
        self.controller.reset_flag();
        let baseline = self.clock.now();
        self.controller.arm(timeout)?;
        self.baseline = Some(baseline);

        trace!(?timeout, "session started");
        Ok(())
    }

    /// [`start`](Self::start) with a whole-second timeout.
    pub fn start_secs(&mut self, secs: u64) -> Result<(), Error> {
        self.start(Duration::from_secs(secs))
    }

    /// End the run and return the elapsed seconds.
    ///
    /// # Errors
    ///
    /// [`UsageError::NotStarted`] without a preceding successful `start`.
    pub fn stop(&mut self) -> Result<f64, Error> {
        let baseline = self.baseline.take().ok_or(UsageError::NotStarted)?;

        self.controller.disarm();
        let secs = self.clock.elapsed(baseline, self.clock.now());

        trace!(secs, size = self.size, timed_out = self.must_finish(), "session stopped");
        Ok(secs)
    }

    /// Add `amount` to the accumulated size.
    #[inline]
    pub fn record(&mut self, amount: u64) {
        self.size = self.size.saturating_add(amount);
    }

    /// Accumulated size since the last `start`.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The completion flag. Clone it to poll from elsewhere.
    pub fn flag(&self) -> &CompletionFlag {
        self.controller.flag()
    }

    /// Whether the deadline has fired.
    #[inline]
    pub fn must_finish(&self) -> bool {
        self.controller.flag().is_set()
    }

    /// Whether `start` succeeded without a matching `stop`.
    pub fn is_running(&self) -> bool {
        self.baseline.is_some()
    }

    /// Configuration this session was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Summarise the run that just stopped.
    pub fn report(&self, elapsed_secs: f64) -> Report {
        Report {
            size: self.size,
            elapsed_secs,
            unit: self.unit().clone(),
            timed_out: self.must_finish(),
            deadline: self.controller.backend_name().to_string(),
        }
    }

    /// Run `work` until the configured deadline fires.
    ///
    /// Each call to `work` is one unit; its return value is added to the
    /// accumulated size.
    pub fn run<F>(&mut self, work: F) -> Result<Report, Error>
    where
        F: FnMut() -> u64,
    {
        self.run_for(self.config.timeout, work)
    }

    /// Run `work` until `timeout` elapses.
    pub fn run_for<F>(&mut self, timeout: Duration, mut work: F) -> Result<Report, Error>
    where
        F: FnMut() -> u64,
    {
        self.start(timeout)?;
        while !self.must_finish() {
            let amount = work();
            self.record(amount);
        }
        let secs = self.stop()?;
        Ok(self.report(secs))
    }

    fn unit(&self) -> &Unit {
        &self.config.unit
    }
}
