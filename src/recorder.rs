//! Event recorder.
//!
//! Formats each [`Event`] into a [`LogRecord`] and appends it to the
//! [`LogSink`].  Durable storage is the detector's only purpose, so any
//! sink failure is returned as a fatal [`Error::Storage`]: there is no
//! buffering and no retry.  After a successful append the record is
//! mirrored to the [`EventSink`]; that mirror is best-effort and never
//! affects the result.

use log::error;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LogSink};
use crate::detector::{Event, EventKind};
use crate::error::{Error, Result};
use crate::record::LogRecord;

#[derive(Debug, Default)]
pub struct Recorder {
    light_written: u64,
    sound_written: u64,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.  Returns the record that was written.
    pub fn record<K, E>(&mut self, event: &Event, sink: &mut K, mirror: &mut E) -> Result<LogRecord>
    where
        K: LogSink + ?Sized,
        E: EventSink + ?Sized,
    {
        let record = LogRecord::from_event(event)?;
        if let Err(e) = sink.append(record.as_bytes()) {
            error!("Unable to write event log ({}), dropping: {}", e, record);
            return Err(Error::Storage(e));
        }

        match event.kind {
            EventKind::Light => self.light_written += 1,
            EventKind::Sound => self.sound_written += 1,
        }
        mirror.emit(&AppEvent::Recorded(record.clone()));
        Ok(record)
    }

    /// Records successfully appended, by kind.
    pub fn written(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::Light => self.light_written,
            EventKind::Sound => self.sound_written,
        }
    }
}
