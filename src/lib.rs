//! Flashbang: an autonomous light/sound event detector.
//!
//! Calibrates per-channel thresholds against the ambient environment,
//! then polls the light, sound and temperature channels and appends one
//! timestamped line per trigger to an append-only event log.  The
//! library exposes every module for integration testing; `main.rs` only
//! wires adapters together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod calibration;
pub mod clock;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod record;
pub mod recorder;
pub mod sensors;

pub use error::{Error, Result};
