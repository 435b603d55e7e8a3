//! Runtime diagnostics.
//!
//! [`RuntimeMetrics`] is a cheap snapshot the poll loop publishes as
//! telemetry.  [`install_panic_handler`] makes sure a panic leaves a line
//! in the console log before the default handler runs.

use crate::detector::EventKind;

/// Counters accumulated by the poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeMetrics {
    pub uptime_secs: u64,
    pub polls: u64,
    pub light_events: u64,
    pub sound_events: u64,
    /// Reads that found the second tick late.
    pub tick_overruns: u32,
    pub clock_synchronized: bool,
}

impl RuntimeMetrics {
    pub fn count_event(&mut self, kind: EventKind) {
        match kind {
            EventKind::Light => self.light_events += 1,
            EventKind::Sound => self.sound_events += 1,
        }
    }

    pub fn total_events(&self) -> u64 {
        self.light_events + self.sound_events
    }
}

/// Install a panic hook that logs the reason through `log` and then
/// defers to the previously installed hook.
///
/// Call once during init, after the logger is up.
pub fn install_panic_handler() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let location = info
            .location()
            .map(|l| format!(" at {}:{}", l.file(), l.line()))
            .unwrap_or_default();

        log::error!("PANIC: {}{}", reason, location);
        default_hook(info);
    }));
}
