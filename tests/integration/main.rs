//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the station against
//! mock adapters.  All tests run on the host with no hardware required.

mod mock_hw;
mod recording_tests;
mod station_tests;
