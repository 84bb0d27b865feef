//! Telemetry initialisation for the demo program.
//!
//! Structured JSON logs on stderr, so the sealed record printed on stdout
//! stays machine-readable.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Targets that log at the configured level. Everything else logs at `warn`.
const TARGETS: [&str; 2] = ["cryptostruct", "cryptostruct_demo"];

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured `log_level`.
///
/// # Errors
///
/// Returns an error if `log_level` is not a valid level or the subscriber has
/// already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives(log_level))
            .with_context(|| format!("LOG_LEVEL {log_level:?} is not a valid level"))?,
    };

    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise demo tracing subscriber: {e}"))
}

fn directives(log_level: &str) -> String {
    TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={log_level}"))
}
