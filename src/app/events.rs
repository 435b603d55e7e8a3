//! Application events emitted through [`EventSink`](super::ports::EventSink).
//!
//! These are observations for the console/telemetry channel, not the
//! durable log.  Losing one never affects detection or recording.

use crate::calibration::Thresholds;
use crate::clock::Timestamp;
use crate::diagnostics::RuntimeMetrics;
use crate::record::LogRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Startup sequence finished; the poll loop is about to start.
    Started { version: &'static str },
    /// Step 1 outcome.  `synchronized == false` means local time.
    ClockSynced { synchronized: bool, now: Timestamp },
    /// Step 2 outcome.
    Calibrated(Thresholds),
    /// Step 3 outcome.
    LogReady,
    /// Mirror of a record that was just appended.
    Recorded(LogRecord),
    /// Periodic runtime snapshot.
    Telemetry(RuntimeMetrics),
}
