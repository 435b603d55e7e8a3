//! Ambient calibration.
//!
//! Runs exactly once at startup: average `window_size` samples of the
//! light and sound channels, then scale each mean by its multiplier.
//! Light events are rare, high-contrast flashes (large multiplier); sound
//! events are frequent and lower-contrast (multiplier close to 1).
//!
//! There is no re-calibration.  Drift, time of day and false positives are
//! all ignored, which suits short deployments under stable conditions.

use embedded_hal::delay::DelayNs;
use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::SensorPort;
use crate::config::StationConfig;
use crate::error::{Error, Result};
use crate::sensors::SensorReading;

/// Per-channel trigger levels, fixed after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub light: f32,
    pub sound: f32,
}

/// Calibration window parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationParams {
    pub window_size: u16,
    pub light_multiplier: f32,
    pub sound_multiplier: f32,
    pub sample_interval_ms: u32,
}

impl CalibrationParams {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            window_size: config.calibration_window,
            light_multiplier: config.light_multiplier,
            sound_multiplier: config.sound_multiplier,
            sample_interval_ms: config.calibration_interval_ms,
        }
    }
}

/// Running sums over the calibration window.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbientAccumulator {
    light: f32,
    sound: f32,
    samples: u32,
}

impl AmbientAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reading: &SensorReading) {
        self.light += reading.light;
        self.sound += reading.sound;
        self.samples += 1;
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// `mean * multiplier` per channel.  `None` on an empty window.
    pub fn thresholds(&self, light_multiplier: f32, sound_multiplier: f32) -> Option<Thresholds> {
        if self.samples == 0 {
            return None;
        }
        let n = self.samples as f32;
        Some(Thresholds {
            light: self.light / n * light_multiplier,
            sound: self.sound / n * sound_multiplier,
        })
    }
}

/// Sample the ambient levels and derive thresholds.
///
/// Blocks for roughly `window_size × sample_interval_ms`.  A sensor read
/// failure aborts the whole calibration; no partial result is returned.
/// An empty window is rejected without touching the sensors.
pub fn calibrate<S, D>(sensors: &mut S, delay: &mut D, params: &CalibrationParams) -> Result<Thresholds>
where
    S: SensorPort + ?Sized,
    D: DelayNs + ?Sized,
{
    info!(
        "Calibrating sensors ({} samples @ {} ms), please wait",
        params.window_size, params.sample_interval_ms
    );

    let mut acc = AmbientAccumulator::new();
    for _ in 0..params.window_size {
        let reading = sensors.read()?;
        acc.push(&reading);
        delay.delay_ms(params.sample_interval_ms);
    }

    let thresholds = acc
        .thresholds(params.light_multiplier, params.sound_multiplier)
        .ok_or(Error::Config("calibration window must be > 0"))?;

    info!(
        "Calibration complete: light >= {:.4}, sound >= {:.4}",
        thresholds.light, thresholds.sound
    );
    Ok(thresholds)
}
