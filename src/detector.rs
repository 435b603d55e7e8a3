//! Threshold-crossing detector with per-channel dead time.
//!
//! ## Channel state machine
//!
//! | State                    | Condition                    | Next                  |
//! |--------------------------|------------------------------|-----------------------|
//! | `Idle`                   | `reading >= threshold`       | `Triggered`, emit one |
//! | `Idle`                   | `reading < threshold`        | `Idle`                |
//! | `Triggered { rearm_at }` | `now < rearm_at`             | `Triggered` (ignored) |
//! | `Triggered { rearm_at }` | `now >= rearm_at`            | `Idle`, then evaluate |
//!
//! Light and sound run independent machines.  Re-arming is scheduled
//! against the monotonic clock instead of blocking the poll loop, so one
//! channel's dead time never delays the other channel.  Temperature is
//! sampled every poll purely as metadata for whichever event fires.

use core::fmt;

use heapless::Vec;
use log::debug;

use crate::calibration::Thresholds;
use crate::clock::Timestamp;
use crate::config::TemperatureTransform;
use crate::sensors::SensorReading;

/// Which channel fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Photodiode trigger.
    Light,
    /// Microphone trigger.
    Sound,
}

impl EventKind {
    /// One-character code used in log records.
    pub const fn code(self) -> char {
        match self {
            Self::Light => 'L',
            Self::Sound => 'S',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'L' => Some(Self::Light),
            'S' => Some(Self::Sound),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A trigger, immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub kind: EventKind,
    /// Temperature sampled in the same poll cycle (°C).
    pub temperature_c: f32,
}

/// State of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    /// Fired; ignores readings until the monotonic clock reaches `rearm_at_us`.
    Triggered { rearm_at_us: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Channel {
    kind: EventKind,
    threshold: f32,
    state: ChannelState,
}

impl Channel {
    fn new(kind: EventKind, threshold: f32) -> Self {
        Self {
            kind,
            threshold,
            state: ChannelState::Idle,
        }
    }

    /// Returns `true` when this poll enters `Triggered`.
    fn evaluate(&mut self, reading: f32, now_us: u64, dead_time_us: u64) -> bool {
        if let ChannelState::Triggered { rearm_at_us } = self.state {
            if now_us < rearm_at_us {
                return false;
            }
            debug!("{:?} channel re-armed", self.kind);
            self.state = ChannelState::Idle;
        }

        if reading >= self.threshold {
            self.state = ChannelState::Triggered {
                rearm_at_us: now_us.saturating_add(dead_time_us),
            };
            return true;
        }
        false
    }
}

/// Evaluates light and sound against calibrated thresholds.
pub struct Detector {
    light: Channel,
    sound: Channel,
    dead_time_us: u64,
    transform: TemperatureTransform,
}

impl Detector {
    pub fn new(thresholds: Thresholds, dead_time_us: u64, transform: TemperatureTransform) -> Self {
        Self {
            light: Channel::new(EventKind::Light, thresholds.light),
            sound: Channel::new(EventKind::Sound, thresholds.sound),
            dead_time_us,
            transform,
        }
    }

    /// Run both channel machines for one poll.
    ///
    /// `now_us` is monotonic time used for the dead time; `timestamp` is
    /// stamped on every event emitted by this poll.  Light is evaluated
    /// before sound, so a simultaneous pair is always returned `[L, S]`.
    pub fn evaluate(
        &mut self,
        reading: &SensorReading,
        now_us: u64,
        timestamp: Timestamp,
    ) -> Vec<Event, 2> {
        let temperature_c = self.transform.to_celsius(reading.temperature);
        let mut events = Vec::new();

        for (channel, value) in [
            (&mut self.light, reading.light),
            (&mut self.sound, reading.sound),
        ] {
            if channel.evaluate(value, now_us, self.dead_time_us) {
                // Capacity is exactly one slot per channel.
                let _ = events.push(Event {
                    timestamp,
                    kind: channel.kind,
                    temperature_c,
                });
            }
        }
        events
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            light: self.light.threshold,
            sound: self.sound.threshold,
        }
    }

    pub fn state(&self, kind: EventKind) -> ChannelState {
        match kind {
            EventKind::Light => self.light.state,
            EventKind::Sound => self.sound.state,
        }
    }
}
