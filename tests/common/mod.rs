//! Shared helpers for integration tests.

use std::sync::{Mutex, MutexGuard};

static SIGALRM: Mutex<()> = Mutex::new(());

/// Tests in one binary run on parallel threads but share a single
/// `SIGALRM`; anything that may use the signal backend takes this first.
pub fn sigalrm_lock() -> MutexGuard<'static, ()> {
    SIGALRM.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
