//! Seal a customer, render the sealed record, parse it back, and reopen it.

use anyhow::{Context, Result};
use cryptostruct::Engine;
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::data::{Customer, SealedCustomer};

/// Run the full round trip and return the rendered sealed record.
///
/// # Errors
///
/// Fails if sealing, rendering, parsing or opening fails, or if the reopened
/// record differs from `customer`.
pub fn run(engine: &Engine, cfg: &Config, customer: &Customer) -> Result<String> {
    let master = cfg.master_secret()?;
    let suite = cfg.suite()?;
    let format = cfg.output_format()?;

    let sealed = engine
        .seal_with_secret(&master, suite, customer)
        .context("failed to seal customer")?;
    let rendered = render(&sealed, format)?;
    info!(suite = %suite, format = ?format, bytes = rendered.len(), "sealed customer");

    let parsed = parse(&rendered, format)?;
    let reopened = engine
        .open_with_secret(&master, &parsed)
        .context("failed to open customer")?;
    if &reopened != customer {
        anyhow::bail!("reopened customer differs from the original");
    }
    info!(
        record_types = engine.policies().len(),
        "reopened customer matches original"
    );

    Ok(rendered)
}

fn render(sealed: &SealedCustomer, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(sealed).context("failed to render sealed customer as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(sealed).context("failed to render sealed customer as YAML")
        }
    }
}

fn parse(text: &str, format: OutputFormat) -> Result<SealedCustomer> {
    match format {
        OutputFormat::Json => {
            serde_json::from_str(text).context("failed to parse sealed customer JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::from_str(text).context("failed to parse sealed customer YAML")
        }
    }
}
