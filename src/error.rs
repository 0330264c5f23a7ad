//! Error types for benchmark sessions and deadline backends.

use thiserror::Error;

/// The platform could not schedule the deadline.
///
/// Fatal to the benchmark run it was raised for. Nothing in this crate
/// retries after one of these.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A zero timeout would fire before the workload could run.
    #[error("deadline timeout must be greater than zero")]
    InvalidTimeout,

    /// `arm` was called again without an intervening `disarm`.
    #[error("deadline is already armed")]
    AlreadyArmed,

    /// Another signal-backed deadline currently owns `SIGALRM`.
    #[error("another deadline already owns the process-wide SIGALRM slot")]
    SlotBusy,

    /// Installing the handler or the interval timer failed.
    #[cfg(unix)]
    #[error("failed to schedule alarm: {0}")]
    Timer(#[from] nix::Error),

    /// The waiting thread could not be spawned.
    #[error("failed to spawn deadline thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A session operation was called out of order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    /// `stop` without a preceding successful `start`.
    #[error("session was not started")]
    NotStarted,

    /// `start` twice without an intervening `stop`.
    #[error("session is already running")]
    AlreadyStarted,
}

/// Any error surfaced by a [`Session`](crate::Session).
#[derive(Debug, Error)]
pub enum Error {
    /// See [`SetupError`].
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// See [`UsageError`].
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Error {
    /// Returns the usage error, if this is one.
    pub fn as_usage(&self) -> Option<UsageError> {
        match self {
            Error::Usage(e) => Some(*e),
            Error::Setup(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_are_transparent() {
        let err: Error = UsageError::NotStarted.into();
        assert_eq!(err.to_string(), "session was not started");
        assert_eq!(err.as_usage(), Some(UsageError::NotStarted));
    }

    #[test]
    fn test_setup_errors_are_not_usage() {
        let err: Error = SetupError::SlotBusy.into();
        assert!(err.as_usage().is_none());
        assert!(err.to_string().contains("SIGALRM"));
    }
}
