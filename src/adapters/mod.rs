//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements  | Connects to                      |
//! |---------------|-------------|----------------------------------|
//! | `config_file` | ConfigPort  | JSON file on disk                |
//! | `console`     | log::Log    | stderr with ANSI level colours   |
//! | `file_sink`   | LogSink     | append-only text file            |
//! | `hardware`    | SensorPort  | IIO ADC or simulated channels    |
//! | `log_sink`    | EventSink   | `log` facade (console)           |
//! | `sntp`        | TimeSource  | SNTP server over UDP             |
//! | `time`        | Monotonic   | `std::time::Instant` / simulated |

pub mod config_file;
pub mod console;
pub mod file_sink;
pub mod hardware;
pub mod log_sink;
pub mod sntp;
pub mod time;
