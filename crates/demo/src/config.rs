//! Configuration loading and validation for the demo program.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if any required variable is missing or
//! invalid.

use std::{fmt, str::FromStr};

use anyhow::{Context, Result};
use cryptostruct::{CipherSuite, MasterSecret};
use serde::Deserialize;

/// Validated demo configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded master secret. **Required.**
    pub master_key_hex: String,

    /// Cipher suite the record is sealed with.
    #[serde(default = "default_cipher_suite")]
    pub cipher_suite: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Serialisation of the printed sealed record: `json` or `yaml`.
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// JSON file holding the customer record to seal. The built-in sample is
    /// used when unset.
    #[serde(default)]
    pub input_path: Option<String>,
}

fn default_cipher_suite() -> String {
    CipherSuite::Aes256Gcm.name().into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_output_format() -> String {
    "json".into()
}

/// Wire format of the printed sealed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => anyhow::bail!("OUTPUT_FORMAT must be json or yaml, got {other:?}"),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build demo configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise demo configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Decode the master secret.
    pub fn master_secret(&self) -> Result<MasterSecret> {
        MasterSecret::from_hex(&self.master_key_hex).context("MASTER_KEY_HEX is invalid")
    }

    pub fn suite(&self) -> Result<CipherSuite> {
        self.cipher_suite
            .parse::<CipherSuite>()
            .context("CIPHER_SUITE is not a supported cipher suite")
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        self.output_format.parse()
    }

    fn validate(&self) -> Result<()> {
        if self.master_key_hex.trim().is_empty() {
            anyhow::bail!("MASTER_KEY_HEX is required and must not be empty");
        }
        self.master_secret()?;
        self.suite()?;
        self.output_format()?;
        if let Some(path) = &self.input_path {
            if path.trim().is_empty() {
                anyhow::bail!("INPUT_PATH must not be empty when set");
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("master_key_hex", &"[REDACTED]")
            .field("cipher_suite", &self.cipher_suite)
            .field("log_level", &self.log_level)
            .field("output_format", &self.output_format)
            .field("input_path", &self.input_path)
            .finish()
    }
}
