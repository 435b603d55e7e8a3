//! Hexagonal port traits.
//!
//! The detection core only talks to the outside world through these
//! traits.  Concrete implementations live in [`crate::adapters`]; tests
//! provide scripted mocks.
//!
//! | Port          | Boundary                         |
//! |---------------|----------------------------------|
//! | `SensorPort`  | ADC channels (light/sound/temp)  |
//! | `LogSink`     | append-only durable storage      |
//! | `TimeSource`  | one-shot absolute time reference |
//! | `Monotonic`   | free-running microsecond timer   |
//! | `EventSink`   | console / telemetry mirror       |
//! | `ConfigPort`  | startup configuration            |

use std::time::Duration;

use crate::app::events::AppEvent;
use crate::config::StationConfig;
use crate::error::{CommsError, SensorError, StorageError};
use crate::sensors::SensorReading;

/// Sampling interface.  Every call is one poll of all three channels.
pub trait SensorPort {
    fn read(&mut self) -> Result<SensorReading, SensorError>;
}

/// Append-capable byte sink for the event log.
///
/// Implementations must not hold the underlying file open between calls.
pub trait LogSink {
    /// Open the sink for append and close it again.
    fn ensure_writable(&mut self) -> Result<(), StorageError>;

    /// Append one complete record.
    fn append(&mut self, record: &[u8]) -> Result<(), StorageError>;
}

/// External time authority, queried once at startup.
pub trait TimeSource {
    /// Time since the Unix epoch according to the authority.
    fn fetch(&mut self) -> Result<Duration, CommsError>;
}

/// Free-running microsecond counter (monotonic, never reset).
pub trait Monotonic: Send + Sync {
    fn now_us(&self) -> u64;
}

/// Receives application events for live observation.  Best-effort.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Startup configuration store.
pub trait ConfigPort {
    fn load(&self) -> Result<StationConfig, ConfigError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No stored configuration.
    NotFound,
    /// The store exists but could not be read.
    IoError,
    /// The stored configuration did not deserialize.
    Invalid(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::IoError => write!(f, "I/O error"),
            Self::Invalid(why) => write!(f, "invalid: {why}"),
        }
    }
}

impl<T: Monotonic + ?Sized> Monotonic for std::sync::Arc<T> {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
