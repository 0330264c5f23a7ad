//! Monotonic clock used to bracket a measured run.
//!
//! Readings come from `std::time::Instant` anchored to a process-local
//! origin, so they never jump when the wall clock is adjusted. A
//! [`Timestamp`] carries whole seconds plus a nanosecond fraction since
//! that origin.

use std::hint::black_box as std_black_box;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Wrapper around `std::hint::black_box` for preventing compiler optimizations.
///
/// Wrap the result of each work unit in this so the compiler cannot drop
/// the computation out of the benchmark loop.
#[inline]
pub fn black_box<T>(x: T) -> T {
    std_black_box(x)
}

fn origin() -> Instant {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    *ORIGIN.get_or_init(Instant::now)
}

/// A reading of the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: u64,
    nanos: u32,
}

impl Timestamp {
    fn from_duration(d: Duration) -> Self {
        Self {
            secs: d.as_secs(),
            nanos: d.subsec_nanos(),
        }
    }

    /// Whole seconds since the clock origin.
    pub fn secs(&self) -> u64 {
        self.secs
    }

    /// Sub-second fraction in nanoseconds.
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Time since the clock origin.
    pub fn as_duration(&self) -> Duration {
        Duration::new(self.secs, self.nanos)
    }
}

/// Read the monotonic clock.
#[inline]
pub fn now() -> Timestamp {
    Timestamp::from_duration(origin().elapsed())
}

/// Seconds between two readings, saturating at zero if `end` precedes `start`.
#[inline]
pub fn elapsed(start: Timestamp, end: Timestamp) -> f64 {
    end.as_duration()
        .saturating_sub(start.as_duration())
        .as_secs_f64()
}

/// Handle onto the monotonic clock.
///
/// Stateless; it exists so sessions and tests can hold "the clock" as a
/// value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock;

impl Clock {
    /// Create a clock handle, pinning the process origin if it is not set yet.
    pub fn new() -> Self {
        let _ = origin();
        Self
    }

    /// Current reading.
    #[inline]
    pub fn now(&self) -> Timestamp {
        now()
    }

    /// Seconds from `start` to `end`, never negative.
    #[inline]
    pub fn elapsed(&self, start: Timestamp, end: Timestamp) -> f64 {
        elapsed(start, end)
    }

    /// Seconds since `start`.
    #[inline]
    pub fn since(&self, start: Timestamp) -> f64 {
        elapsed(start, now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_monotonic() {
        let clock = Clock::new();
        let mut prev = clock.now();
        for _ in 0..10_000 {
            let next = clock.now();
            assert!(next >= prev, "{:?} went backwards from {:?}", next, prev);
            prev = next;
        }
    }

    #[test]
    fn test_elapsed_non_negative() {
        let clock = Clock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(clock.elapsed(a, b) >= 0.0);
        // Reversed arguments saturate instead of going negative
        assert_eq!(clock.elapsed(b, a), 0.0);
    }

    #[test]
    fn test_elapsed_tracks_sleep() {
        let clock = Clock::new();
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(20));
        let secs = clock.since(start);
        assert!(secs >= 0.020, "elapsed = {}", secs);
        assert!(secs < 1.0, "elapsed = {}", secs);
    }

    #[test]
    fn test_elapsed_sub_millisecond() {
        let start = Timestamp { secs: 3, nanos: 999_900_000 };
        let end = Timestamp { secs: 4, nanos: 200_000 };
        assert!((elapsed(start, end) - 0.0003).abs() < 1e-9);
    }
}
