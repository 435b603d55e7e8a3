//! Unified error types for the Flashbang detector.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! startup sequence and the poll loop's error handling uniform.  All
//! variants are `Copy` so they can be passed through the orchestrator and
//! the event sink without allocation.
//!
//! | Category      | Recovery                                   |
//! |---------------|--------------------------------------------|
//! | `Comms`       | local: continue on uncorrected local time  |
//! | `Sensor`      | fatal                                      |
//! | `Config`      | fatal                                      |
//! | `Storage`     | fatal                                      |

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the detector funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// The event log could not be opened or written.
    Storage(StorageError),
    /// The time reference could not be reached or answered nonsense.
    Comms(CommsError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl Error {
    /// Whether this error must halt the detector.
    ///
    /// Only connectivity problems are recovered locally.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Comms(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// The ADC returned something that is not a raw sample.
    Malformed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::Malformed => write!(f, "malformed ADC sample"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Failures of the append-only event log.  The `io::ErrorKind` is kept so
/// the fatal diagnostic says *why* the card/file went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The log could not be opened for append.
    Open(io::ErrorKind),
    /// The record could not be written or flushed.
    Write(io::ErrorKind),
    /// The formatted record did not fit the record buffer.
    RecordTooLong,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(kind) => write!(f, "unable to open log ({kind})"),
            Self::Write(kind) => write!(f, "unable to write log ({kind})"),
            Self::RecordTooLong => write!(f, "record exceeds buffer"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Host name did not resolve.
    Resolve,
    /// Socket could not be created, connected or written.
    Unreachable,
    /// No reply within the configured timeout.
    Timeout,
    /// Reply was short, not from a server, or a kiss-o'-death.
    BadReply,
    /// Time sync was disabled by configuration.
    Disabled,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "time server did not resolve"),
            Self::Unreachable => write!(f, "time server unreachable"),
            Self::Timeout => write!(f, "time server timed out"),
            Self::BadReply => write!(f, "bad time server reply"),
            Self::Disabled => write!(f, "time sync disabled"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
