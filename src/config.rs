//! Station configuration parameters
//!
//! All tunable parameters for the detector.  Values are loaded once at
//! startup through [`ConfigPort`](crate::app::ports::ConfigPort) and are
//! immutable for the lifetime of the process.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Linear ADC → °C transform for the temperature channel.
///
/// `(reading * full_scale_volts - offset_volts) * degrees_per_volt`,
/// taken from the sensor datasheet (TMP36 defaults).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureTransform {
    /// ADC reference voltage (reading 1.0 == this many volts).
    pub full_scale_volts: f32,
    /// Sensor output at 0 °C.
    pub offset_volts: f32,
    /// Sensor slope.
    pub degrees_per_volt: f32,
}

impl Default for TemperatureTransform {
    fn default() -> Self {
        Self {
            full_scale_volts: 3.3,
            offset_volts: 0.5,
            degrees_per_volt: 100.0,
        }
    }
}

impl TemperatureTransform {
    /// Convert a normalised reading into degrees Celsius.
    pub fn to_celsius(&self, reading: f32) -> f32 {
        (reading * self.full_scale_volts - self.offset_volts) * self.degrees_per_volt
    }
}

/// Where sensor samples come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum SensorBackend {
    /// Synthetic ambient noise with occasional spikes.
    Simulated {
        seed: u64,
        /// Probability that a poll produces a light spike.
        light_spike_rate: f64,
        /// Probability that a poll produces a sound spike.
        sound_spike_rate: f64,
    },
    /// Linux industrial-I/O ADC (`/sys/bus/iio/devices/iio:deviceN`).
    Iio {
        device_dir: String,
        light_channel: u8,
        sound_channel: u8,
        temperature_channel: u8,
        /// Raw count corresponding to full scale (4095 for 12-bit).
        full_scale_raw: u32,
    },
}

impl Default for SensorBackend {
    fn default() -> Self {
        Self::Simulated {
            seed: 0x5eed,
            light_spike_rate: 0.0005,
            sound_spike_rate: 0.002,
        }
    }
}

/// Core station configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Time reference ---
    /// SNTP server host name.
    pub time_server_host: String,
    /// SNTP server UDP port.
    pub time_server_port: u16,
    /// How long to wait for the SNTP reply (milliseconds).
    pub time_sync_timeout_ms: u32,
    /// Skip time sync entirely and run on local time.
    pub time_sync_enabled: bool,

    // --- Calibration ---
    /// Ambient samples taken per channel.
    pub calibration_window: u16,
    /// Light threshold = ambient mean × this.
    pub light_multiplier: f32,
    /// Sound threshold = ambient mean × this.
    pub sound_multiplier: f32,
    /// Pause between calibration samples (milliseconds).
    pub calibration_interval_ms: u32,

    // --- Detection ---
    /// Dead time after a trigger before the channel re-arms (milliseconds).
    pub debounce_ms: u32,
    /// Temperature channel transform.
    pub temperature: TemperatureTransform,
    /// Pause between polls (milliseconds, 0 = spin).
    pub poll_interval_ms: u32,

    // --- Storage ---
    /// Event log path.
    pub log_path: String,

    // --- Telemetry ---
    /// Telemetry report interval (seconds, 0 = off).
    pub telemetry_interval_secs: u32,

    // --- Hardware ---
    pub sensors: SensorBackend,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Time reference
            time_server_host: "0.uk.pool.ntp.org".into(),
            time_server_port: 123,
            time_sync_timeout_ms: 5000,
            time_sync_enabled: true,

            // Calibration
            calibration_window: 64,
            light_multiplier: 5.0,
            sound_multiplier: 1.2,
            calibration_interval_ms: 200, // 12.8 s window

            // Detection
            debounce_ms: 150,
            temperature: TemperatureTransform::default(),
            poll_interval_ms: 1,

            // Storage
            log_path: "DATA.txt".into(),

            // Telemetry
            telemetry_interval_secs: 60,

            sensors: SensorBackend::default(),
        }
    }
}

impl StationConfig {
    /// Reject values that would make the detector meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.calibration_window == 0 {
            return Err(Error::Config("calibration window must be > 0"));
        }
        if !(self.light_multiplier.is_finite() && self.light_multiplier > 0.0) {
            return Err(Error::Config("light multiplier must be positive"));
        }
        if !(self.sound_multiplier.is_finite() && self.sound_multiplier > 0.0) {
            return Err(Error::Config("sound multiplier must be positive"));
        }
        if self.debounce_ms == 0 {
            return Err(Error::Config("debounce must be > 0 ms"));
        }
        if self.log_path.is_empty() {
            return Err(Error::Config("log path is empty"));
        }
        if let SensorBackend::Iio { full_scale_raw, .. } = self.sensors {
            if full_scale_raw == 0 {
                return Err(Error::Config("IIO full scale must be > 0"));
            }
        }
        Ok(())
    }

    /// Dead time in microseconds.
    pub fn debounce_us(&self) -> u64 {
        u64::from(self.debounce_ms) * 1000
    }
}
