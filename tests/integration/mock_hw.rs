//! Mock adapters for integration tests.
//!
//! Scripted sensors, in-memory sinks and a hand-cranked clock, so tests
//! can drive the station poll by poll and assert on every side effect.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use flashbang::adapters::time::SimMonotonic;
use flashbang::app::events::AppEvent;
use flashbang::app::ports::{EventSink, LogSink, SensorPort, TimeSource};
use flashbang::clock::Clock;
use flashbang::error::{CommsError, SensorError, StorageError};
use flashbang::sensors::SensorReading;

/// 2024-03-01T12:00:00Z
pub const EPOCH_2024: u64 = 1_709_294_400;

// ── Sensors ───────────────────────────────────────────────────

/// Plays back a script of readings; repeats the last one forever.
pub struct ScriptedSensors {
    script: VecDeque<Result<SensorReading, SensorError>>,
    last: SensorReading,
    pub reads: usize,
}

#[allow(dead_code)]
impl ScriptedSensors {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            last: SensorReading::default(),
            reads: 0,
        }
    }

    /// `n` identical ambient readings (one calibration window).
    pub fn ambient(mut self, n: usize, light: f32, sound: f32, temperature: f32) -> Self {
        for _ in 0..n {
            self.script
                .push_back(Ok(SensorReading::new(light, sound, temperature)));
        }
        self
    }

    pub fn then(mut self, reading: SensorReading) -> Self {
        self.script.push_back(Ok(reading));
        self
    }

    pub fn then_fail(mut self, err: SensorError) -> Self {
        self.script.push_back(Err(err));
        self
    }
}

impl SensorPort for ScriptedSensors {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Ok(r)) => {
                self.last = r;
                Ok(r)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last),
        }
    }
}

// ── Log sinks ─────────────────────────────────────────────────

/// Collects appended bytes; can be told to fail open or append.
#[derive(Default)]
pub struct MemorySink {
    pub bytes: Vec<u8>,
    pub opens: usize,
    pub appends: usize,
    pub fail_open: Option<io::ErrorKind>,
    pub fail_append: Option<io::ErrorKind>,
}

#[allow(dead_code)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes(kind: io::ErrorKind) -> Self {
        Self {
            fail_append: Some(kind),
            ..Self::default()
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }
}

impl LogSink for MemorySink {
    fn ensure_writable(&mut self) -> Result<(), StorageError> {
        self.opens += 1;
        match self.fail_open {
            Some(kind) => Err(StorageError::Open(kind)),
            None => Ok(()),
        }
    }

    fn append(&mut self, record: &[u8]) -> Result<(), StorageError> {
        self.appends += 1;
        if let Some(kind) = self.fail_append {
            return Err(StorageError::Write(kind));
        }
        self.bytes.extend_from_slice(record);
        Ok(())
    }
}

// ── Events ────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingEvents(pub Vec<AppEvent>);

#[allow(dead_code)]
impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> usize {
        self.0
            .iter()
            .filter(|e| matches!(e, AppEvent::Recorded(_)))
            .count()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(event.clone());
    }
}

// ── Time ──────────────────────────────────────────────────────

/// Time source that answers with a fixed epoch, or fails.
pub struct FixedTime(pub Result<Duration, CommsError>);

impl TimeSource for FixedTime {
    fn fetch(&mut self) -> Result<Duration, CommsError> {
        self.0
    }
}

/// Delay that returns immediately but advances the simulated clock, so
/// calibration windows and poll intervals cost simulated time only.
pub struct SimDelay(pub SimMonotonic);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.advance_us(u64::from(ns) / 1000);
    }
}

/// Clock starting at mono 0 on local epoch `epoch_secs`.
pub fn sim_clock(epoch_secs: u64) -> (Arc<Clock<SimMonotonic>>, SimMonotonic) {
    let mono = SimMonotonic::new();
    let clock = Arc::new(Clock::new(mono.clone(), Duration::from_secs(epoch_secs)));
    (clock, mono)
}
