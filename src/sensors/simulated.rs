//! Simulated ADC backend.
//!
//! Produces a noisy ambient floor on every channel with rare light and
//! sound spikes, so the whole startup → calibrate → detect → record chain
//! can run on a host with no hardware attached.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::sensors::SensorReading;

/// Ambient light floor (fraction of full scale).
const LIGHT_FLOOR: f32 = 0.08;
/// Ambient sound floor.
const SOUND_FLOOR: f32 = 0.30;
/// ~22 °C on a TMP36 behind a 3.3 V ADC.
const TEMPERATURE_RAW: f32 = 0.218;
/// Peak-to-peak noise as a fraction of the floor.
const NOISE: f32 = 0.10;

pub struct SimulatedSensors {
    rng: StdRng,
    light_spike_rate: f64,
    sound_spike_rate: f64,
}

impl SimulatedSensors {
    pub fn new(seed: u64, light_spike_rate: f64, sound_spike_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            light_spike_rate: light_spike_rate.clamp(0.0, 1.0),
            sound_spike_rate: sound_spike_rate.clamp(0.0, 1.0),
        }
    }

    fn jitter(&mut self, floor: f32) -> f32 {
        let n: f32 = self.rng.gen_range(-NOISE / 2.0..=NOISE / 2.0);
        (floor * (1.0 + n)).clamp(0.0, 1.0)
    }
}

impl SensorPort for SimulatedSensors {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        let light = if self.rng.gen_bool(self.light_spike_rate) {
            self.rng.gen_range(0.6..=1.0)
        } else {
            self.jitter(LIGHT_FLOOR)
        };
        let sound = if self.rng.gen_bool(self.sound_spike_rate) {
            self.rng.gen_range(0.5..=1.0)
        } else {
            self.jitter(SOUND_FLOOR)
        };
        let temperature = self.jitter(TEMPERATURE_RAW);
        Ok(SensorReading::new(light, sound, temperature))
    }
}
