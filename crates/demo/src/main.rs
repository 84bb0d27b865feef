//! `cryptostruct-demo`: seal an example customer record and reopen it.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Seal the customer, print the sealed record on stdout, parse it back and
//!    verify that it reopens to the original.

mod config;
mod data;
mod round_trip;
mod telemetry;

use anyhow::Result;
use cryptostruct::Engine;
use tracing::info;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: cryptostruct-demo configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Round trip
    // -----------------------------------------------------------------------
    let customer = match &cfg.input_path {
        Some(path) => {
            info!(path = %path, "loading customer");
            data::load(path)?
        }
        None => data::sample(),
    };

    let engine = Engine::new();
    let rendered = round_trip::run(&engine, &cfg, &customer)?;
    println!("{rendered}");
    Ok(())
}
