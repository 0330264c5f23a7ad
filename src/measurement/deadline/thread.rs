//! Deadline driven by a dedicated waiting thread.
//!
//! Works on every platform. The thread blocks in `recv_timeout` on a
//! cancellation channel; a timeout raises the flag, a disconnect means
//! the deadline was disarmed first.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::Deadline;
use crate::error::SetupError;
use crate::measurement::flag::{CompletionFlag, FlagWriter};

struct Waiter {
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Deadline delivered from a background thread.
#[derive(Default)]
pub struct ThreadDeadline {
    waiter: Option<Waiter>,
}

impl ThreadDeadline {
    /// An unarmed deadline.
    pub fn new() -> Self {
        Self::default()
    }
}

fn wait_then_raise(cancel: mpsc::Receiver<()>, writer: FlagWriter, timeout: Duration) {
    // Only a timeout raises. Disconnect (or an explicit message) is a cancel.
    if let Err(RecvTimeoutError::Timeout) = cancel.recv_timeout(timeout) {
        writer.raise();
    }
}

impl Deadline for ThreadDeadline {
    fn arm(&mut self, flag: &CompletionFlag, timeout: Duration) -> Result<(), SetupError> {
        if self.waiter.is_some() {
            return Err(SetupError::AlreadyArmed);
        }
        if timeout.is_zero() {
            return Err(SetupError::InvalidTimeout);
        }

        let (cancel, rx) = mpsc::channel();
        let writer = flag.writer();
        let handle = thread::Builder::new()
            .name("deadline-timer".into())
            .spawn(move || wait_then_raise(rx, writer, timeout))
            .map_err(SetupError::Spawn)?;

        self.waiter = Some(Waiter { cancel, handle });
        Ok(())
    }

    fn disarm(&mut self) {
        let Some(Waiter { cancel, handle }) = self.waiter.take() else {
            return;
        };
        // Dropping the sender wakes the waiter immediately; if it already
        // timed out it has exited or is about to.
        drop(cancel);
        let _ = handle.join();
    }

    fn is_armed(&self) -> bool {
        self.waiter.is_some()
    }

    fn name(&self) -> &'static str {
        "timer-thread"
    }
}

impl Drop for ThreadDeadline {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for ThreadDeadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadDeadline")
            .field("armed", &self.is_armed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_fires_after_timeout() {
        let flag = CompletionFlag::new();
        let mut deadline = ThreadDeadline::new();

        let start = Instant::now();
        deadline.arm(&flag, Duration::from_millis(20)).unwrap();
        while !flag.is_set() {
            assert!(start.elapsed() < Duration::from_secs(5), "timer never fired");
            thread::yield_now();
        }
        assert!(start.elapsed() >= Duration::from_millis(20));

        deadline.disarm();
        assert!(flag.is_set());
        assert!(!deadline.is_armed());
    }

    #[test]
    fn test_disarm_returns_promptly_for_long_timeout() {
        let flag = CompletionFlag::new();
        let mut deadline = ThreadDeadline::new();
        deadline.arm(&flag, Duration::from_secs(3600)).unwrap();

        let start = Instant::now();
        deadline.disarm();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(!flag.is_set());
    }

    #[test]
    fn test_disarm_is_idempotent() {
        let flag = CompletionFlag::new();
        let mut deadline = ThreadDeadline::new();
        deadline.disarm();
        deadline.arm(&flag, Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(20));
        deadline.disarm();
        deadline.disarm();
        assert!(flag.is_set());
    }

    #[test]
    fn test_rearm_without_disarm_is_rejected() {
        let flag = CompletionFlag::new();
        let mut deadline = ThreadDeadline::new();
        deadline.arm(&flag, Duration::from_secs(10)).unwrap();
        assert!(matches!(
            deadline.arm(&flag, Duration::from_secs(10)),
            Err(SetupError::AlreadyArmed)
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let flag = CompletionFlag::new();
        let mut deadline = ThreadDeadline::new();
        assert!(matches!(
            deadline.arm(&flag, Duration::ZERO),
            Err(SetupError::InvalidTimeout)
        ));
        assert!(!deadline.is_armed());
    }
}
