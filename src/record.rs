//! Canonical text encoding of an [`Event`].
//!
//! One newline-terminated line per event:
//!
//! ```text
//! YYYY-MM-DD HH:MM:SS.ssssss <L|S> T.TT
//! 2024-03-01 12:00:00.250000 L 21.37
//! ```
//!
//! UTC calendar second, six-digit sub-second counter, event code,
//! temperature in °C to two decimals.  Records are appended and never
//! rewritten.

use core::fmt::{self, Write};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::clock::Timestamp;
use crate::detector::{Event, EventKind};
use crate::error::StorageError;

/// Longest line we will ever produce: 26 (time) + 3 (code) + 1 (space)
/// + a temperature that fits in an `f32` formatted to two decimals.
pub const MAX_RECORD_LEN: usize = 96;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

/// A formatted record, newline included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord(heapless::String<MAX_RECORD_LEN>);

impl LogRecord {
    pub fn from_event(event: &Event) -> Result<Self, StorageError> {
        let mut line = heapless::String::new();
        writeln!(
            line,
            "{} {}.{:06} {} {:.2}",
            event.timestamp.calendar.format(DATE_FMT),
            event.timestamp.calendar.format(TIME_FMT),
            event.timestamp.sub_second_micros,
            event.kind.code(),
            event.temperature_c,
        )
        .map_err(|_| StorageError::RecordTooLong)?;
        Ok(Self(line))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The record without its trailing newline (for console output).
    pub fn line(&self) -> &str {
        self.0.trim_end_matches('\n')
    }

    /// Parse one line back into its fields.  A trailing `\n` (or `\r\n`)
    /// is accepted.
    pub fn parse(line: &str) -> Result<ParsedRecord, RecordParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split(' ');
        let date = fields.next().ok_or(RecordParseError::MissingField)?;
        let time = fields.next().ok_or(RecordParseError::MissingField)?;
        let code = fields.next().ok_or(RecordParseError::MissingField)?;
        let temperature = fields.next().ok_or(RecordParseError::MissingField)?;
        if fields.next().is_some() {
            return Err(RecordParseError::TrailingData);
        }

        let date = NaiveDate::parse_from_str(date, DATE_FMT)
            .map_err(|_| RecordParseError::BadTimestamp)?;
        let (hms, micros) = time.split_once('.').ok_or(RecordParseError::BadTimestamp)?;
        let time = NaiveTime::parse_from_str(hms, TIME_FMT)
            .map_err(|_| RecordParseError::BadTimestamp)?;
        if micros.len() != 6 || !micros.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordParseError::BadTimestamp);
        }
        let sub_second_micros: u32 = micros.parse().map_err(|_| RecordParseError::BadTimestamp)?;

        let mut chars = code.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(c), None) => EventKind::from_code(c).ok_or(RecordParseError::BadKind)?,
            _ => return Err(RecordParseError::BadKind),
        };

        let temperature_c: f32 = temperature
            .parse()
            .map_err(|_| RecordParseError::BadTemperature)?;
        if !temperature_c.is_finite() {
            return Err(RecordParseError::BadTemperature);
        }

        Ok(ParsedRecord {
            timestamp: Timestamp {
                calendar: DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc),
                sub_second_micros,
            },
            kind,
            temperature_c,
        })
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.line())
    }
}

/// Fields recovered from a record line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRecord {
    pub timestamp: Timestamp,
    pub kind: EventKind,
    pub temperature_c: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordParseError {
    MissingField,
    TrailingData,
    BadTimestamp,
    BadKind,
    BadTemperature,
}

impl fmt::Display for RecordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "missing field"),
            Self::TrailingData => write!(f, "trailing data"),
            Self::BadTimestamp => write!(f, "bad timestamp"),
            Self::BadKind => write!(f, "bad event code"),
            Self::BadTemperature => write!(f, "bad temperature"),
        }
    }
}
