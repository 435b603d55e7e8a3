//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  Omitted fields
//! take their defaults (`StationConfig` is `#[serde(default)]`), so an
//! operator only writes what they want to change:
//!
//! ```json
//! { "log_path": "/var/lib/flashbang/DATA.txt", "debounce_ms": 200 }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::StationConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file, falling back to defaults when it is absent or does
    /// not parse.  Values are not validated here.
    pub fn load_or_default(&self) -> StationConfig {
        match self.load() {
            Ok(cfg) => {
                info!("Config loaded from {}", self.path.display());
                cfg
            }
            Err(ConfigError::NotFound) => {
                info!("No config at {}, using defaults", self.path.display());
                StationConfig::default()
            }
            Err(e) => {
                warn!(
                    "Config {} unusable ({}), using defaults",
                    self.path.display(),
                    e
                );
                StationConfig::default()
            }
        }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<StationConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
