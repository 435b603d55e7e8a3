//! End-to-end recording against a real file on disk.

use std::fs;

use flashbang::adapters::file_sink::FileLogSink;
use flashbang::adapters::hardware::HardwareAdapter;
use flashbang::app::service::Station;
use flashbang::config::{SensorBackend, StationConfig};
use flashbang::detector::EventKind;
use flashbang::error::CommsError;
use flashbang::record::LogRecord;
use flashbang::sensors::SensorReading;

use crate::mock_hw::{EPOCH_2024, FixedTime, RecordingEvents, ScriptedSensors, SimDelay, sim_clock};

fn config(log_path: String) -> StationConfig {
    StationConfig {
        calibration_window: 8,
        calibration_interval_ms: 0,
        telemetry_interval_secs: 0,
        log_path,
        ..StationConfig::default()
    }
}

#[test]
fn records_are_appended_after_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DATA.txt");
    fs::write(&path, "2024-02-29 23:59:59.999999 S 19.00\n").unwrap();

    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = ScriptedSensors::new()
        .ambient(8, 0.10, 0.30, 0.22)
        .then(SensorReading::new(0.9, 0.0, 0.22))
        .then(SensorReading::new(0.0, 0.0, 0.22))
        .then(SensorReading::new(0.0, 0.9, 0.22));
    let mut sink = FileLogSink::new(&path);
    let mut events = RecordingEvents::new();

    let mut station = Station::start(
        config(path.display().to_string()),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono.clone()),
        &mut sink,
        &mut events,
    )
    .unwrap();
    for _ in 0..3 {
        station.poll_once(&mut sensors, &mut sink, &mut events).unwrap();
        mono.advance_us(1_000);
    }

    let text = fs::read_to_string(&path).unwrap();
    let kinds: Vec<_> = text
        .lines()
        .map(|l| LogRecord::parse(l).unwrap().kind)
        .collect();
    assert_eq!(kinds, [EventKind::Sound, EventKind::Light, EventKind::Sound]);
    assert!(text.ends_with('\n'));
}

#[test]
fn simulated_backend_writes_only_parseable_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DATA.txt");
    let backend = SensorBackend::Simulated {
        seed: 7,
        light_spike_rate: 0.05,
        sound_spike_rate: 0.05,
    };

    let (clock, mono) = sim_clock(EPOCH_2024);
    let mut sensors = HardwareAdapter::from_backend(&backend);
    let mut sink = FileLogSink::new(&path);
    let mut events = RecordingEvents::new();

    let mut station = Station::start(
        config(path.display().to_string()),
        clock,
        &mut FixedTime(Err(CommsError::Unreachable)),
        &mut sensors,
        &mut SimDelay(mono.clone()),
        &mut sink,
        &mut events,
    )
    .unwrap();

    let mut written = 0;
    for _ in 0..2_000 {
        written += station.poll_once(&mut sensors, &mut sink, &mut events).unwrap();
        mono.advance_us(1_000);
    }

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert!(written > 0);
    assert_eq!(lines.len(), written);
    assert_eq!(events.recorded(), written);
    for line in lines {
        let parsed = LogRecord::parse(line).unwrap();
        assert!(parsed.timestamp.sub_second_micros < 1_000_000);
    }
    assert_eq!(
        station.metrics().total_events(),
        u64::try_from(written).unwrap()
    );
}
