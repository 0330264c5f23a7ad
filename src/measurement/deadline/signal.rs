//! `SIGALRM` deadline for unix targets.
//!
//! Arming installs [`on_alarm`] as the `SIGALRM` handler (saving whatever
//! disposition was there) and starts a one-shot `ITIMER_REAL` interval
//! timer. The handler only sees a static pointer to the flag's atomic.
//!
//! There is a single `SIGALRM` per process, so at most one
//! [`SignalDeadline`] may be armed at a time. A second concurrent `arm`
//! fails with [`SetupError::SlotBusy`].
//!
//! `disarm` waits out handler invocations that have reached `on_alarm`,
//! but cannot see one the kernel has dequeued for another thread that has
//! not started running it yet. If that thread is preempted at exactly that
//! point and the slot is re-armed before it resumes, the old alarm raises
//! the new interval's flag early. `setitimer` alarms carry no payload to
//! tell them apart; callers that re-arm back to back and need a strict
//! bound should use [`ThreadDeadline`](super::ThreadDeadline).

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};
use std::time::Duration;

use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use super::Deadline;
use crate::error::SetupError;
use crate::measurement::flag::{CompletionFlag, FlagWriter};

/// Flag the handler raises. Null while no deadline is armed.
static SLOT: AtomicPtr<AtomicBool> = AtomicPtr::new(ptr::null_mut());

/// Handler invocations currently between reading `SLOT` and returning.
static IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);

/// Set while some `SignalDeadline` is armed.
static OWNED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_alarm(_signum: libc::c_int) {
    // Async-signal context: lock-free atomics only.
    IN_FLIGHT.fetch_add(1, Ordering::SeqCst);
    let flag = SLOT.load(Ordering::SeqCst);
    if !flag.is_null() {
        // SAFETY: `disarm` clears SLOT and waits for IN_FLIGHT to drain
        // before releasing the writer that keeps this atomic alive.
        unsafe { (*flag).store(true, Ordering::Release) };
    }
    IN_FLIGHT.fetch_sub(1, Ordering::SeqCst);
}

/// Largest `it_value` every unix `setitimer` accepts (BSD `itimerfix`
/// rejects more). Longer timeouts are clamped rather than wrapped.
const MAX_ALARM_SECS: u64 = 100_000_000;

fn itimer(timeout: Duration) -> libc::itimerval {
    let zero = libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    let mut value = libc::timeval {
        tv_sec: timeout.as_secs().min(MAX_ALARM_SECS) as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    // An all-zero it_value cancels the timer instead of arming it.
    if !timeout.is_zero() && value.tv_sec == 0 && value.tv_usec == 0 {
        value.tv_usec = 1;
    }
    libc::itimerval {
        it_interval: zero,
        it_value: value,
    }
}

fn set_itimer(timeout: Duration) -> Result<(), Errno> {
    let value = itimer(timeout);
    // SAFETY: `value` is a valid itimerval and the old value is not requested.
    let rc = unsafe { libc::setitimer(libc::ITIMER_REAL, &value, ptr::null_mut()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(Errno::last())
    }
}

struct Armed {
    /// Keeps the atomic behind `SLOT` alive.
    _writer: FlagWriter,
    previous: SigAction,
}

/// Deadline delivered through `SIGALRM`.
#[derive(Default)]
pub struct SignalDeadline {
    armed: Option<Armed>,
}

impl SignalDeadline {
    /// An unarmed deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any `SignalDeadline` in the process is currently armed.
    pub fn slot_in_use() -> bool {
        OWNED.load(Ordering::Acquire)
    }

    fn release_slot() {
        SLOT.store(ptr::null_mut(), Ordering::SeqCst);
        while IN_FLIGHT.load(Ordering::SeqCst) != 0 {
            std::hint::spin_loop();
        }
    }
}

impl Deadline for SignalDeadline {
    fn arm(&mut self, flag: &CompletionFlag, timeout: Duration) -> Result<(), SetupError> {
        if self.armed.is_some() {
            return Err(SetupError::AlreadyArmed);
        }
        if timeout.is_zero() {
            return Err(SetupError::InvalidTimeout);
        }
        if OWNED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SetupError::SlotBusy);
        }

        let writer = flag.writer();
        SLOT.store(writer.as_ptr(), Ordering::SeqCst);

        let action = SigAction::new(
            SigHandler::Handler(on_alarm),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: `on_alarm` touches nothing but atomics.
        let previous = match unsafe { sigaction(Signal::SIGALRM, &action) } {
            Ok(previous) => previous,
            Err(e) => {
                Self::release_slot();
                OWNED.store(false, Ordering::Release);
                return Err(SetupError::Timer(e));
            }
        };

        if let Err(e) = set_itimer(timeout) {
            Self::release_slot();
            // SAFETY: restoring the disposition that was installed a moment ago.
            let _ = unsafe { sigaction(Signal::SIGALRM, &previous) };
            OWNED.store(false, Ordering::Release);
            return Err(SetupError::Timer(e));
        }

        self.armed = Some(Armed {
            _writer: writer,
            previous,
        });
        Ok(())
    }

    fn disarm(&mut self) {
        let Some(armed) = self.armed.take() else {
            return;
        };

        // Cancelling can only fail for an invalid `which`.
        let _ = set_itimer(Duration::ZERO);
        Self::release_slot();

        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        // SAFETY: SIG_IGN discards an alarm that was generated before the
        // timer was cancelled but not yet delivered, so the restored
        // disposition never sees it.
        unsafe {
            let _ = sigaction(Signal::SIGALRM, &ignore);
            let _ = sigaction(Signal::SIGALRM, &armed.previous);
        }

        OWNED.store(false, Ordering::Release);
    }

    fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    fn name(&self) -> &'static str {
        "sigalrm"
    }
}

impl Drop for SignalDeadline {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl std::fmt::Debug for SignalDeadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalDeadline")
            .field("armed", &self.is_armed())
            .finish()
    }
}
