//! Wall clock with a tick-disciplined sub-second counter.
//!
//! ```text
//!   TimeSource ──synchronize()──▶ offset_us ─┐
//!                                             ├─▶ now() ─▶ Timestamp
//!   Monotonic ──now_us()──────────────────────┤      calendar second
//!                                             │    + sub-second counter
//!   rtc tick  ──on_tick()──▶ last_tick_us ────┘
//! ```
//!
//! The calendar second is set once by `synchronize` (or the local clock)
//! and then advanced by the tick, so the second and the sub-second counter
//! always roll over together.  The counter is "microseconds since the last
//! tick".  A tick that is late holds the counter at 999 999 until it
//! arrives; a tick that never arrives lets the second advance on the
//! monotonic counter so time keeps moving.
//!
//! The tick's `(second, tick time)` pair is published through a sequence
//! counter: the tick never blocks, and `now()` retries if it raced a tick,
//! so a reader sees the pre- or post-tick pair and never a mix.

use core::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering, fence};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::app::ports::Monotonic;
use crate::error::CommsError;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Largest sub-second value a [`Timestamp`] can carry.
pub const MAX_SUB_SECOND_MICROS: u32 = 999_999;

/// Calendar second plus the free-running sub-second counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// UTC instant truncated to whole seconds.
    pub calendar: DateTime<Utc>,
    /// Microseconds since the last tick, `0..=999_999`.
    pub sub_second_micros: u32,
}

impl Timestamp {
    /// Build a timestamp, truncating `calendar` to whole seconds and
    /// clamping the counter into range.
    pub fn new(calendar: DateTime<Utc>, sub_second_micros: u32) -> Self {
        let secs = calendar.timestamp();
        Self {
            calendar: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
            sub_second_micros: sub_second_micros.min(MAX_SUB_SECOND_MICROS),
        }
    }
}

/// Process-wide clock.  Share it behind an `Arc`.
pub struct Clock<M> {
    mono: M,
    /// `epoch_us - mono_us`, fixed by `synchronize`.  Only used to align
    /// the tick source with calendar second boundaries.
    offset_us: AtomicI64,
    /// Even when `tick_second`/`last_tick_us` are stable, odd mid-update.
    seq: AtomicU32,
    /// Calendar second that began at the most recent tick.
    tick_second: AtomicI64,
    /// Monotonic time of the most recent tick.
    last_tick_us: AtomicU64,
    /// Set on the first late read after a tick, cleared by the next tick.
    late: AtomicBool,
    /// Tick intervals that ran past one second.
    overruns: AtomicU32,
    synchronized: AtomicBool,
}

impl<M: Monotonic> Clock<M> {
    /// Create a clock running on `local_epoch` (the uncorrected local
    /// time) until [`synchronize`](Self::synchronize) is called.
    pub fn new(mono: M, local_epoch: Duration) -> Self {
        let clock = Self {
            offset_us: AtomicI64::new(0),
            seq: AtomicU32::new(0),
            tick_second: AtomicI64::new(0),
            last_tick_us: AtomicU64::new(0),
            late: AtomicBool::new(false),
            overruns: AtomicU32::new(0),
            synchronized: AtomicBool::new(false),
            mono,
        };
        clock.set_epoch(local_epoch);
        clock
    }

    /// One-shot correction from an external authority.
    ///
    /// On failure the clock keeps running on local time and the failure is
    /// logged; it is never an error for the caller.  Returns whether the
    /// correction was applied.
    pub fn synchronize(&self, reference: Result<Duration, CommsError>) -> bool {
        match reference {
            Ok(epoch) => {
                let before = self.offset_us.load(Ordering::Acquire);
                let offset = self.set_epoch(epoch);
                self.synchronized.store(true, Ordering::Release);
                info!(
                    "Clock: synchronized (correction {:+} ms)",
                    (offset - before) / 1000
                );
                true
            }
            Err(e) => {
                warn!("Clock: time sync failed ({}), continuing on local time", e);
                false
            }
        }
    }

    /// Tick handler: start the next calendar second and restart the
    /// sub-second counter.
    ///
    /// Bounded and non-blocking; no I/O, no locks.  A tick that arrives
    /// after one or more missed ticks advances the second by the number of
    /// whole seconds elapsed.
    pub fn on_tick(&self) {
        let now = self.mono.now_us();
        let (second, last_tick) = self.tick_state();
        let elapsed = (now.saturating_sub(last_tick) / MICROS_PER_SEC).max(1);
        self.publish(second + elapsed as i64, now);
        self.late.store(false, Ordering::Release);
    }

    /// Re-derive the tick state from the epoch offset, as if a tick had
    /// landed exactly on the last second boundary.  Used when a tick
    /// source (re)starts after a stretch without ticks.
    pub fn realign(&self) {
        let now = self.mono.now_us();
        let epoch_us = now as i64 + self.offset_us.load(Ordering::Acquire);
        let fraction = epoch_us.rem_euclid(MICROS_PER_SEC as i64) as u64;
        self.publish(
            epoch_us.div_euclid(MICROS_PER_SEC as i64),
            now.saturating_sub(fraction),
        );
        self.late.store(false, Ordering::Release);
    }

    /// Current calendar second paired with the sub-second counter.
    pub fn now(&self) -> Timestamp {
        let (second, last_tick) = self.tick_state();
        let since_tick = self.mono.now_us().saturating_sub(last_tick);

        let (secs, sub) = if since_tick < MICROS_PER_SEC {
            (second, since_tick as u32)
        } else {
            if !self.late.swap(true, Ordering::AcqRel) {
                self.overruns.fetch_add(1, Ordering::Relaxed);
            }
            // Hold at the end of the second the pending tick will close.
            let whole = (since_tick / MICROS_PER_SEC) as i64;
            (second + whole - 1, MAX_SUB_SECOND_MICROS)
        };
        Timestamp {
            calendar: DateTime::from_timestamp(secs, 0).unwrap_or_default(),
            sub_second_micros: sub,
        }
    }

    /// Monotonic microseconds (for scheduling, not for records).
    pub fn uptime_us(&self) -> u64 {
        self.mono.now_us()
    }

    /// Microseconds until the calendar second rolls over.
    pub fn micros_until_next_second(&self) -> u64 {
        let epoch_us = self.mono.now_us() as i64 + self.offset_us.load(Ordering::Acquire);
        MICROS_PER_SEC - epoch_us.rem_euclid(MICROS_PER_SEC as i64) as u64
    }

    /// Whether an external correction has been applied.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized.load(Ordering::Acquire)
    }

    /// Number of tick intervals that ran past one second (degraded
    /// precision).  Each late interval is counted once.
    pub fn tick_overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Anchor the calendar at `epoch`, with the counter positioned at the
    /// epoch's fraction of a second.  Returns the new offset.
    fn set_epoch(&self, epoch: Duration) -> i64 {
        let now = self.mono.now_us();
        let offset = epoch.as_micros() as i64 - now as i64;
        self.offset_us.store(offset, Ordering::Release);
        let fraction = u64::from(epoch.subsec_micros());
        self.publish(epoch.as_secs() as i64, now.saturating_sub(fraction));
        self.late.store(false, Ordering::Release);
        offset
    }

    fn publish(&self, second: i64, tick_us: u64) {
        // Take the write side: even -> odd.
        let mut seq = self.seq.load(Ordering::Relaxed);
        loop {
            if seq & 1 == 1 {
                core::hint::spin_loop();
                seq = self.seq.load(Ordering::Relaxed);
                continue;
            }
            match self
                .seq
                .compare_exchange_weak(seq, seq.wrapping_add(1), Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(current) => seq = current,
            }
        }
        fence(Ordering::Release);
        self.tick_second.store(second, Ordering::Relaxed);
        self.last_tick_us.store(tick_us, Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    fn tick_state(&self) -> (i64, u64) {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 1 {
                core::hint::spin_loop();
                continue;
            }
            let second = self.tick_second.load(Ordering::Relaxed);
            let last_tick = self.last_tick_us.load(Ordering::Relaxed);
            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return (second, last_tick);
            }
        }
    }
}
