//! Linux industrial-I/O ADC backend.
//!
//! Reads `in_voltage<N>_raw` attributes from an IIO device directory such
//! as `/sys/bus/iio/devices/iio:device0`.  Each attribute is opened, read
//! and closed per sample; the kernel driver performs the conversion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::sensors::{SensorReading, normalise};

pub struct IioAdc {
    light: PathBuf,
    sound: PathBuf,
    temperature: PathBuf,
    full_scale_raw: u32,
}

impl IioAdc {
    pub fn new(
        device_dir: impl AsRef<Path>,
        light_channel: u8,
        sound_channel: u8,
        temperature_channel: u8,
        full_scale_raw: u32,
    ) -> Self {
        let dir = device_dir.as_ref();
        let attr = |ch: u8| dir.join(format!("in_voltage{ch}_raw"));
        Self {
            light: attr(light_channel),
            sound: attr(sound_channel),
            temperature: attr(temperature_channel),
            full_scale_raw: full_scale_raw.max(1),
        }
    }

    fn read_channel(&self, path: &Path) -> Result<f32, SensorError> {
        let text = fs::read_to_string(path).map_err(|_| SensorError::AdcReadFailed)?;
        let raw: u32 = text.trim().parse().map_err(|_| SensorError::Malformed)?;
        Ok(normalise(raw, self.full_scale_raw))
    }
}

impl SensorPort for IioAdc {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        Ok(SensorReading {
            light: self.read_channel(&self.light)?,
            sound: self.read_channel(&self.sound)?,
            temperature: self.read_channel(&self.temperature)?,
        })
    }
}
