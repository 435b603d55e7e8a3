//! Integration tests for the startup sequence and the detection loop.
//!
//! Each test drives `Station` through mock adapters and asserts on the
//! bytes that reach the log sink and the events that reach the console.

use std::io;
use std::time::Duration;

use flashbang::app::events::AppEvent;
use flashbang::app::service::Station;
use flashbang::config::{StationConfig, TemperatureTransform};
use flashbang::detector::{ChannelState, EventKind};
use flashbang::error::{CommsError, Error, SensorError, StorageError};
use flashbang::sensors::SensorReading;

use crate::mock_hw::{
    EPOCH_2024, FixedTime, MemorySink, RecordingEvents, ScriptedSensors, SimDelay, sim_clock,
};

const WINDOW: usize = 4;

fn config() -> StationConfig {
    StationConfig {
        calibration_window: WINDOW as u16,
        calibration_interval_ms: 0,
        telemetry_interval_secs: 0,
        ..StationConfig::default()
    }
}

/// Ambient light 0.10 and sound 0.30 give thresholds 0.50 and 0.36.
fn calibrated_sensors() -> ScriptedSensors {
    ScriptedSensors::new().ambient(WINDOW, 0.10, 0.30, 0.2)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn calibration_window_sets_inclusive_thresholds() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors()
        .then(SensorReading::new(0.49, 0.0, 0.2))
        .then(SensorReading::new(0.50, 0.0, 0.2));
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();

    let mut station = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono.clone()),
        &mut sink,
        &mut events,
    )
    .unwrap();

    assert_eq!(station.thresholds().light, 0.5);
    assert!((station.thresholds().sound - 0.36).abs() < 1e-6);

    mono.advance_us(1_000);
    assert_eq!(station.poll_once(&mut sensors, &mut sink, &mut events).unwrap(), 0);
    mono.advance_us(1_000);
    assert_eq!(station.poll_once(&mut sensors, &mut sink, &mut events).unwrap(), 1);
    assert_eq!(sink.lines().len(), 1);
    assert!(sink.lines()[0].contains(" L "));
}

#[test]
fn sensor_failure_during_calibration_is_fatal_before_log_opened() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = ScriptedSensors::new()
        .ambient(2, 0.1, 0.3, 0.2)
        .then_fail(SensorError::AdcReadFailed);
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();

    let result = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono),
        &mut sink,
        &mut events,
    );

    assert_eq!(
        result.err(),
        Some(Error::Sensor(SensorError::AdcReadFailed))
    );
    assert_eq!(sensors.reads, 3);
    assert_eq!(sink.opens, 0);
    assert!(!events.0.iter().any(|e| matches!(e, AppEvent::Calibrated(_))));
}

#[test]
fn unwritable_log_is_fatal_after_calibration() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors();
    let mut sink = MemorySink {
        fail_open: Some(io::ErrorKind::PermissionDenied),
        ..MemorySink::default()
    };
    let mut events = RecordingEvents::new();

    let result = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono),
        &mut sink,
        &mut events,
    );

    assert_eq!(
        result.err(),
        Some(Error::Storage(StorageError::Open(io::ErrorKind::PermissionDenied)))
    );
    assert_eq!(sensors.reads, WINDOW);
    assert!(events.0.iter().any(|e| matches!(e, AppEvent::Calibrated(_))));
    assert!(!events.0.contains(&AppEvent::LogReady));
}

#[test]
fn time_sync_failure_falls_back_to_local_time() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors().then(SensorReading::new(0.9, 0.0, 0.2));
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();

    let mut station = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Timeout)),
        &mut sensors,
        &mut SimDelay(mono),
        &mut sink,
        &mut events,
    )
    .unwrap();

    assert!(matches!(
        events.0[0],
        AppEvent::ClockSynced {
            synchronized: false,
            ..
        }
    ));
    assert!(!station.metrics().clock_synchronized);

    station.poll_once(&mut sensors, &mut sink, &mut events).unwrap();
    assert!(sink.text().starts_with("2024-03-01 12:00:00."));
}

#[test]
fn disabled_time_sync_never_queries_the_server() {
    struct Panicking;
    impl flashbang::app::ports::TimeSource for Panicking {
        fn fetch(&mut self) -> Result<Duration, CommsError> {
            panic!("time server must not be queried");
        }
    }

    let (clock, mono) = sim_clock(EPOCH_2024);
    let cfg = StationConfig {
        time_sync_enabled: false,
        ..config()
    };
    let station = Station::start(
        cfg,
        clock,
        &mut Panicking,
        &mut calibrated_sensors(),
        &mut SimDelay(mono),
        &mut MemorySink::new(),
        &mut RecordingEvents::new(),
    )
    .unwrap();
    assert!(!station.metrics().clock_synchronized);
}

// ── Recording ─────────────────────────────────────────────────

#[test]
fn light_trigger_produces_canonical_record() {
    // Server says 11:59:59 at mono 0, so mono 1 s is 12:00:00.
    let (clock, mono) = sim_clock(0);
    let mut sensors = calibrated_sensors().then(SensorReading::new(0.9, 0.0, 0.2137));
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();
    let cfg = StationConfig {
        temperature: TemperatureTransform {
            full_scale_volts: 1.0,
            offset_volts: 0.0,
            degrees_per_volt: 100.0,
        },
        ..config()
    };

    let mut station = Station::start(
        cfg,
        clock.clone(),
        &mut FixedTime(Ok(Duration::from_secs(EPOCH_2024 - 1))),
        &mut sensors,
        &mut SimDelay(mono.clone()),
        &mut sink,
        &mut events,
    )
    .unwrap();
    assert!(station.metrics().clock_synchronized);

    mono.set_us(1_000_000);
    clock.on_tick();
    mono.advance_us(250_000);
    assert_eq!(station.poll_once(&mut sensors, &mut sink, &mut events).unwrap(), 1);

    assert_eq!(sink.text(), "2024-03-01 12:00:00.250000 L 21.37\n");
    assert!(matches!(
        events.0.last(),
        Some(AppEvent::Recorded(r)) if r.line() == "2024-03-01 12:00:00.250000 L 21.37"
    ));
}

#[test]
fn simultaneous_triggers_record_light_then_sound() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors().then(SensorReading::new(0.9, 0.9, 0.2));
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();

    let mut station = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono),
        &mut sink,
        &mut events,
    )
    .unwrap();

    assert_eq!(station.poll_once(&mut sensors, &mut sink, &mut events).unwrap(), 2);
    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" L "));
    assert!(lines[1].contains(" S "));
    // Same poll: same timestamp and temperature.
    assert_eq!(lines[0].replace(" L ", " S "), lines[1]);
}

#[test]
fn sustained_flash_is_recorded_once_per_dead_time() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors().then(SensorReading::new(0.9, 0.0, 0.2));
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();

    let mut station = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono.clone()),
        &mut sink,
        &mut events,
    )
    .unwrap();

    // 200 ms of continuous light, polled every 10 ms: fires at 0 and 150 ms.
    for _ in 0..20 {
        station.poll_once(&mut sensors, &mut sink, &mut events).unwrap();
        mono.advance_us(10_000);
    }

    assert_eq!(sink.lines().len(), 2);
    assert_eq!(events.recorded(), 2);
    assert_eq!(station.metrics().light_events, 2);
    assert!(matches!(
        station.channel_state(EventKind::Light),
        ChannelState::Triggered { .. }
    ));
    assert_eq!(station.channel_state(EventKind::Sound), ChannelState::Idle);
}

// ── Fatal errors in the loop ──────────────────────────────────

#[test]
fn write_failure_on_first_event_stops_the_loop() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors().then(SensorReading::new(0.9, 0.0, 0.2));
    let mut sink = MemorySink::failing_writes(io::ErrorKind::StorageFull);
    let mut events = RecordingEvents::new();
    let mut delay = SimDelay(mono);

    let mut station = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut delay,
        &mut sink,
        &mut events,
    )
    .unwrap();
    assert_eq!(sensors.reads, WINDOW);

    let err = station
        .run(&mut sensors, &mut sink, &mut events, &mut delay)
        .unwrap_err();

    assert_eq!(err, Error::Storage(StorageError::Write(io::ErrorKind::StorageFull)));
    assert!(err.is_fatal());
    assert_eq!(sensors.reads, WINDOW + 1, "no polling after the failed write");
    assert_eq!(sink.appends, 1);
    assert!(sink.bytes.is_empty());
    assert_eq!(events.recorded(), 0);
}

#[test]
fn sensor_failure_in_loop_is_fatal() {
    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = calibrated_sensors()
        .then(SensorReading::new(0.0, 0.0, 0.2))
        .then_fail(SensorError::Malformed);
    let mut sink = MemorySink::new();
    let mut events = RecordingEvents::new();
    let mut delay = SimDelay(mono);

    let mut station = Station::start(
        config(),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut delay,
        &mut sink,
        &mut events,
    )
    .unwrap();

    let err = station
        .run(&mut sensors, &mut sink, &mut events, &mut delay)
        .unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Malformed));
    assert_eq!(station.metrics().polls, 1);
}
