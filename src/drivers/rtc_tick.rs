//! Once-per-second tick source.
//!
//! Stands in for the RTC square-wave interrupt: a dedicated thread sleeps
//! until the next calendar-second boundary of the [`Clock`] and calls
//! [`Clock::on_tick`], which restarts the sub-second counter.  The tick
//! does nothing else.

use core::sync::atomic::{AtomicBool, Ordering};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::Monotonic;
use crate::clock::Clock;

/// Handle to the running tick thread.
pub struct SecondTicker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SecondTicker {
    /// Spawn the `rtc-tick` thread.  The clock is realigned first, since
    /// no ticks were delivered before this point.
    pub fn start<M: Monotonic + 'static>(clock: Arc<Clock<M>>) -> io::Result<Self> {
        clock.realign();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("rtc-tick".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_micros(clock.micros_until_next_second()));
                    clock.on_tick();
                }
                debug!("rtc-tick: stopped");
            })?;
        info!("rtc-tick: 1 Hz tick started");
        Ok(Self { stop, handle })
    }

    /// Stop ticking and wait for the thread.  Takes up to one second.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Release);
        if self.handle.join().is_err() {
            warn!("rtc-tick: thread panicked");
        }
    }
}
