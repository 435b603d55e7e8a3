//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade, which the console logger sends to stderr.  Every
//! appended record is echoed here too, so an operator watching the
//! console sees the same lines that land in the event log.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Recorded(record) => {
                info!("EVENT | {}", record);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | up={}s | polls={} | L={} S={} | overruns={} | clock={}",
                    t.uptime_secs,
                    t.polls,
                    t.light_events,
                    t.sound_events,
                    t.tick_overruns,
                    if t.clock_synchronized { "ntp" } else { "local" },
                );
            }
            AppEvent::ClockSynced { synchronized, now } => {
                let source = if *synchronized { "time server" } else { "local clock" };
                if !synchronized {
                    warn!("CLOCK | time sync failed, running on local time");
                }
                info!(
                    "CLOCK | source={} | now={} UTC",
                    source,
                    now.calendar.format("%Y-%m-%d %H:%M:%S")
                );
            }
            AppEvent::Calibrated(t) => {
                info!("CALIB | light>={:.4} sound>={:.4}", t.light, t.sound);
            }
            AppEvent::LogReady => {
                info!("LOG   | event log ready");
            }
            AppEvent::Started { version } => {
                info!("START | flashbang v{} detecting", version);
            }
        }
    }
}
