//! Sensor channels and ADC backends.
//!
//! Every backend produces a [`SensorReading`] of three normalised
//! channels per poll.  Conversion to physical units (°C) happens in the
//! detector, not here.

pub mod iio;
pub mod simulated;

/// One poll of every channel, each normalised to `[0, 1]` of ADC full scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReading {
    /// Photodiode.
    pub light: f32,
    /// Microphone envelope.
    pub sound: f32,
    /// Temperature sensor output (raw, before the datasheet transform).
    pub temperature: f32,
}

impl SensorReading {
    pub fn new(light: f32, sound: f32, temperature: f32) -> Self {
        Self {
            light,
            sound,
            temperature,
        }
    }
}

/// Map a raw ADC count onto `[0, 1]`.
pub(crate) fn normalise(raw: u32, full_scale: u32) -> f32 {
    (raw.min(full_scale) as f32) / (full_scale as f32)
}
