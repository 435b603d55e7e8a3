//! Host drivers: blocking delay and the once-per-second tick source.

pub mod delay;
pub mod rtc_tick;
