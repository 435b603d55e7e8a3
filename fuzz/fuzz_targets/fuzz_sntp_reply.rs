//! Fuzz target: `sntp::parse_reply`
//!
//! Arbitrary datagrams from the network must be rejected or converted,
//! never panic.  Accepted replies always carry a whole-nanosecond
//! fraction below one second.
//!
//! cargo fuzz run fuzz_sntp_reply

#![no_main]

use flashbang::adapters::sntp::parse_reply;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(epoch) = parse_reply(data) {
        assert!(epoch.subsec_nanos() < 1_000_000_000);
        assert!(data.len() >= 48);
    }
});
