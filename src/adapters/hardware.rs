//! Hardware adapter: bridges the configured ADC backend to [`SensorPort`].
//!
//! The backend is chosen once from [`SensorBackend`]; the poll loop only
//! sees the port.  This is the only module that decides which physical
//! (or simulated) channels feed the detector.

use log::info;

use crate::app::ports::SensorPort;
use crate::config::SensorBackend;
use crate::error::SensorError;
use crate::sensors::SensorReading;
use crate::sensors::iio::IioAdc;
use crate::sensors::simulated::SimulatedSensors;

/// Concrete adapter over whichever ADC backend the config selects.
pub enum HardwareAdapter {
    Iio(IioAdc),
    Simulated(SimulatedSensors),
}

impl HardwareAdapter {
    pub fn from_backend(backend: &SensorBackend) -> Self {
        match backend {
            SensorBackend::Iio {
                device_dir,
                light_channel,
                sound_channel,
                temperature_channel,
                full_scale_raw,
            } => {
                info!(
                    "Sensors: IIO {} (light=ch{}, sound=ch{}, temp=ch{}, full scale {})",
                    device_dir, light_channel, sound_channel, temperature_channel, full_scale_raw
                );
                Self::Iio(IioAdc::new(
                    device_dir,
                    *light_channel,
                    *sound_channel,
                    *temperature_channel,
                    *full_scale_raw,
                ))
            }
            SensorBackend::Simulated {
                seed,
                light_spike_rate,
                sound_spike_rate,
            } => {
                info!("Sensors: simulated (seed={:#x})", seed);
                Self::Simulated(SimulatedSensors::new(
                    *seed,
                    *light_spike_rate,
                    *sound_spike_rate,
                ))
            }
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated(_))
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        match self {
            Self::Iio(adc) => adc.read(),
            Self::Simulated(sim) => sim.read(),
        }
    }
}
