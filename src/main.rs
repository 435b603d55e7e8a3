//! Flashbang: main entry point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter  FileLogSink  SntpTimeSource  LogEventSink  │
//! │  (SensorPort)     (LogSink)    (TimeSource)    (EventSink)   │
//! │  JsonConfigFile   SystemMonotonic                            │
//! │  (ConfigPort)     (Monotonic)                                │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            Station (pure logic)                        │  │
//! │  │  Clock · Calibration · Detector · Recorder             │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  rtc-tick thread (1 Hz) ──▶ Clock::on_tick                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use flashbang::adapters::config_file::JsonConfigFile;
use flashbang::adapters::console;
use flashbang::adapters::file_sink::FileLogSink;
use flashbang::adapters::hardware::HardwareAdapter;
use flashbang::adapters::log_sink::LogEventSink;
use flashbang::adapters::sntp::SntpTimeSource;
use flashbang::adapters::time::{SystemMonotonic, local_epoch};
use flashbang::app::service::Station;
use flashbang::clock::Clock;
use flashbang::config::{SensorBackend, StationConfig};
use flashbang::diagnostics;
use flashbang::drivers::delay::StdDelay;
use flashbang::drivers::rtc_tick::SecondTicker;

/// Light/sound event detector with an append-only event log.
#[derive(Parser, Debug)]
#[command(name = "flashbang", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, default_value = "flashbang.json")]
    config: PathBuf,

    /// Event log path (overrides the config file)
    #[arg(short, long)]
    log_path: Option<String>,

    /// Skip time-server synchronisation and run on local time
    #[arg(long)]
    no_time_sync: bool,

    /// Use the simulated sensor backend regardless of config
    #[arg(long)]
    simulate: bool,
}

impl Cli {
    fn apply(&self, config: &mut StationConfig) {
        if let Some(path) = &self.log_path {
            config.log_path.clone_from(path);
        }
        if self.no_time_sync {
            config.time_sync_enabled = false;
        }
        if self.simulate && !matches!(config.sensors, SensorBackend::Simulated { .. }) {
            config.sensors = SensorBackend::default();
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = console::init(console::DEFAULT_FILTER) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    diagnostics::install_panic_handler();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!("╔══════════════════════════════════════╗");
    info!("║  Flashbang v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1. Config (file, then CLI overrides) ──────────────────
    let mut config = JsonConfigFile::new(&cli.config).load_or_default();
    cli.apply(&mut config);

    // ── 2. Clock (runs on local time until synchronised) ──────
    let clock = Arc::new(Clock::new(SystemMonotonic::new(), local_epoch()));

    // ── 3. Adapters ───────────────────────────────────────────
    let mut time = SntpTimeSource::new(
        config.time_server_host.clone(),
        config.time_server_port,
        Duration::from_millis(u64::from(config.time_sync_timeout_ms)),
    );
    let mut sensors = HardwareAdapter::from_backend(&config.sensors);
    let mut sink = FileLogSink::new(config.log_path.clone());
    let mut events = LogEventSink::new();
    let mut delay = StdDelay;

    // ── 4. Startup sequence ───────────────────────────────────
    let mut station = Station::start(
        config,
        Arc::clone(&clock),
        &mut time,
        &mut sensors,
        &mut delay,
        &mut sink,
        &mut events,
    )
    .context("startup failed")?;

    // The tick aligns to the synchronised second, so it starts after sync.
    let _ticker = SecondTicker::start(clock).context("starting rtc-tick thread")?;

    // ── 5. Detection loop (returns only on a fatal error) ─────
    match station.run(&mut sensors, &mut sink, &mut events, &mut delay) {
        Ok(never) => match never {},
        Err(e) => {
            let m = station.metrics();
            info!(
                "Stopped after {} polls, {} events ({}s)",
                m.polls,
                m.total_events(),
                m.uptime_secs
            );
            Err(e).context("detection loop")
        }
    }
}
