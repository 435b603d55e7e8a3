//! Fuzz target: `LogRecord::parse`
//!
//! Feeds arbitrary text to the record parser.  It must never panic, and
//! any line it accepts must survive a format → parse cycle unchanged.
//!
//! cargo fuzz run fuzz_log_record

#![no_main]

use flashbang::detector::Event;
use flashbang::record::LogRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(parsed) = LogRecord::parse(line) else {
        return;
    };

    let event = Event {
        timestamp: parsed.timestamp,
        kind: parsed.kind,
        temperature_c: parsed.temperature_c,
    };
    // Huge temperatures may not fit the fixed-capacity line.
    let Ok(record) = LogRecord::from_event(&event) else {
        return;
    };
    let again = LogRecord::parse(record.as_str()).expect("formatted record must parse");
    assert_eq!(again.timestamp, parsed.timestamp);
    assert_eq!(again.kind, parsed.kind);
});
