//! Simarray Tools
//!
//! Command-line front ends for generating and maintaining simulation folders.

pub mod cli;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging on stderr for a `--verbose` level.
///
/// `0` shows warnings and errors only, `1` adds progress summaries and `2`
/// reports every folder and file touched. The `RUST_LOG` environment
/// variable overrides the level when set.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
