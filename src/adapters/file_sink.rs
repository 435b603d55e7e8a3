//! Append-only file sink for the event log.
//!
//! The file is opened for append (created if missing) on every call and
//! closed before returning, so a record that was acknowledged is on disk
//! even if the process dies right after.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::app::ports::LogSink;
use crate::error::StorageError;

pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<std::fs::File, StorageError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::Open(e.kind()))
    }
}

impl LogSink for FileLogSink {
    fn ensure_writable(&mut self) -> Result<(), StorageError> {
        self.open()?;
        debug!("Event log {} is writable", self.path.display());
        Ok(())
    }

    fn append(&mut self, record: &[u8]) -> Result<(), StorageError> {
        let mut file = self.open()?;
        file.write_all(record)
            .and_then(|()| file.flush())
            .map_err(|e| StorageError::Write(e.kind()))
    }
}
