//! The station orchestrator.
//!
//! ```text
//!  start():  sync clock ──▶ calibrate ──▶ open log ──▶ Station
//!            (non-fatal)    (fatal)       (fatal)
//!
//!  run():    loop { read ──▶ detect ──▶ record* ──▶ telemetry? }
//! ```
//!
//! `Station` owns the detector, recorder and counters; ports are passed
//! in per call so the same instance runs against real adapters in `main`
//! and scripted mocks in tests.  There is no shutdown path: `run` only
//! returns with a fatal error.

use core::convert::Infallible;
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LogSink, Monotonic, SensorPort, TimeSource};
use crate::calibration::{self, CalibrationParams, Thresholds};
use crate::clock::Clock;
use crate::config::StationConfig;
use crate::detector::{ChannelState, Detector, EventKind};
use crate::diagnostics::RuntimeMetrics;
use crate::error::{CommsError, Error, Result};
use crate::recorder::Recorder;

pub struct Station<M: Monotonic> {
    config: StationConfig,
    clock: Arc<Clock<M>>,
    detector: Detector,
    recorder: Recorder,
    metrics: RuntimeMetrics,
    started_us: u64,
    last_telemetry_us: u64,
}

impl<M: Monotonic> Station<M> {
    /// Run the startup sequence.  Each step is a precondition for the next.
    ///
    /// 1. Synchronise the clock (falls back to local time).
    /// 2. Calibrate thresholds (fatal on sensor or window error).
    /// 3. Probe the log sink for writability (fatal).
    pub fn start<T, S, D, K, E>(
        config: StationConfig,
        clock: Arc<Clock<M>>,
        time: &mut T,
        sensors: &mut S,
        delay: &mut D,
        sink: &mut K,
        events: &mut E,
    ) -> Result<Self>
    where
        T: TimeSource + ?Sized,
        S: SensorPort + ?Sized,
        D: DelayNs + ?Sized,
        K: LogSink + ?Sized,
        E: EventSink + ?Sized,
    {
        config.validate()?;

        // ── 1. Time ──────────────────────────────────────────────
        let reference = if config.time_sync_enabled {
            info!(
                "Synchronizing clock with {}:{}",
                config.time_server_host, config.time_server_port
            );
            time.fetch()
        } else {
            Err(CommsError::Disabled)
        };
        let synchronized = clock.synchronize(reference);
        events.emit(&AppEvent::ClockSynced {
            synchronized,
            now: clock.now(),
        });

        // ── 2. Calibration ───────────────────────────────────────
        let thresholds = calibration::calibrate(
            sensors,
            delay,
            &CalibrationParams::from_config(&config),
        )?;
        events.emit(&AppEvent::Calibrated(thresholds));

        // ── 3. Log sink ──────────────────────────────────────────
        if let Err(e) = sink.ensure_writable() {
            error!("Unable to initialize event log '{}': {}", config.log_path, e);
            return Err(Error::Storage(e));
        }
        events.emit(&AppEvent::LogReady);

        let detector = Detector::new(thresholds, config.debounce_us(), config.temperature);
        let now = clock.uptime_us();
        let station = Self {
            metrics: RuntimeMetrics {
                clock_synchronized: synchronized,
                ..RuntimeMetrics::default()
            },
            config,
            clock,
            detector,
            recorder: Recorder::new(),
            started_us: now,
            last_telemetry_us: now,
        };

        events.emit(&AppEvent::Started {
            version: env!("CARGO_PKG_VERSION"),
        });
        Ok(station)
    }

    /// One poll cycle: read, detect, record.  Returns the number of
    /// records appended.
    pub fn poll_once<S, K, E>(&mut self, sensors: &mut S, sink: &mut K, events: &mut E) -> Result<usize>
    where
        S: SensorPort + ?Sized,
        K: LogSink + ?Sized,
        E: EventSink + ?Sized,
    {
        let reading = sensors.read()?;
        let now_us = self.clock.uptime_us();
        self.metrics.polls += 1;

        let fired = self.detector.evaluate(&reading, now_us, self.clock.now());
        for event in &fired {
            self.recorder.record(event, sink, events)?;
            self.metrics.count_event(event.kind);
        }

        self.maybe_emit_telemetry(now_us, events);
        Ok(fired.len())
    }

    /// The steady-state loop.  Only returns on a fatal error.
    pub fn run<S, K, E, D>(
        &mut self,
        sensors: &mut S,
        sink: &mut K,
        events: &mut E,
        delay: &mut D,
    ) -> Result<Infallible>
    where
        S: SensorPort + ?Sized,
        K: LogSink + ?Sized,
        E: EventSink + ?Sized,
        D: DelayNs + ?Sized,
    {
        info!("Entering detection loop");
        loop {
            self.poll_once(sensors, sink, events)?;
            if self.config.poll_interval_ms > 0 {
                delay.delay_ms(self.config.poll_interval_ms);
            }
        }
    }

    /// Snapshot of the runtime counters.
    pub fn metrics(&self) -> RuntimeMetrics {
        RuntimeMetrics {
            uptime_secs: self.clock.uptime_us().saturating_sub(self.started_us) / 1_000_000,
            tick_overruns: self.clock.tick_overruns(),
            ..self.metrics
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.detector.thresholds()
    }

    pub fn channel_state(&self, kind: EventKind) -> ChannelState {
        self.detector.state(kind)
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    fn maybe_emit_telemetry<E: EventSink + ?Sized>(&mut self, now_us: u64, events: &mut E) {
        let interval_us = u64::from(self.config.telemetry_interval_secs) * 1_000_000;
        if interval_us == 0 || now_us.saturating_sub(self.last_telemetry_us) < interval_us {
            return;
        }
        self.last_telemetry_us = now_us;
        events.emit(&AppEvent::Telemetry(self.metrics()));
    }
}
