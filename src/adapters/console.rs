//! Console logging backend.
//!
//! Everything in the crate logs through the `log` facade.  On the host
//! the records are printed by a `tracing-subscriber` formatter on stderr,
//! coloured by level when attached to a terminal.  `RUST_LOG` overrides
//! the default filter.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install the console logger.  Must be called once, before any logging.
pub fn init(default_filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("console logger: {e}"))
}
