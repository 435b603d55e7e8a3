//! Time adapters.
//!
//! - [`SystemMonotonic`]: `std::time::Instant` since construction
//!   (microsecond precision, monotonic).
//! - [`SimMonotonic`]: manually advanced counter for tests and replay.
//! - [`local_epoch`]: the uncorrected local wall clock, used until (or
//!   instead of) a time-server correction.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::Monotonic;

/// Monotonic microseconds since this adapter was created.
pub struct SystemMonotonic {
    start: Instant,
}

impl Default for SystemMonotonic {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMonotonic {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Monotonic for SystemMonotonic {
    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// Hand-cranked monotonic counter.  Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct SimMonotonic {
    now_us: Arc<AtomicU64>,
}

impl SimMonotonic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_us(&self, us: u64) {
        self.now_us.fetch_add(us, Ordering::AcqRel);
    }

    pub fn set_us(&self, us: u64) {
        self.now_us.store(us, Ordering::Release);
    }
}

impl Monotonic for SimMonotonic {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::Acquire)
    }
}

/// Local wall-clock time since the Unix epoch.  A clock set before 1970
/// reads as the epoch itself.
pub fn local_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
