//! The "must finish" flag shared between a workload loop and its deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared completion flag.
///
/// Workload loops poll [`is_set`](Self::is_set) once per unit of work.
/// Only the deadline raises it and only [`Session::start`](crate::Session::start)
/// lowers it again; neither is reachable through the public API.
#[derive(Debug, Clone, Default)]
pub struct CompletionFlag {
    inner: Arc<AtomicBool>,
}

impl CompletionFlag {
    /// A lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the deadline has fired.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.inner.store(false, Ordering::Release);
    }

    /// Write-only handle for an expiry callback.
    pub(crate) fn writer(&self) -> FlagWriter {
        FlagWriter(Arc::clone(&self.inner))
    }
}

/// The only thing an expiry callback gets to hold.
///
/// It can raise the flag and nothing else: no session state, no clock.
#[derive(Debug, Clone)]
pub(crate) struct FlagWriter(Arc<AtomicBool>);

impl FlagWriter {
    #[inline]
    pub(crate) fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Raw address for the signal handler slot. Valid while `self` is alive.
    #[cfg(unix)]
    pub(crate) fn as_ptr(&self) -> *mut AtomicBool {
        Arc::as_ptr(&self.0).cast_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_lowered() {
        assert!(!CompletionFlag::new().is_set());
    }

    #[test]
    fn test_writer_is_visible_through_clones() {
        let flag = CompletionFlag::new();
        let observer = flag.clone();
        flag.writer().raise();
        assert!(observer.is_set());

        flag.reset();
        assert!(!observer.is_set());
    }

    #[test]
    fn test_raise_is_idempotent() {
        let flag = CompletionFlag::new();
        let writer = flag.writer();
        writer.raise();
        writer.raise();
        assert!(flag.is_set());
    }
}
