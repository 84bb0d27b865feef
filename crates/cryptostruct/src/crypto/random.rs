//! Randomness for salts and nonces.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use thiserror::Error;

/// The random number generator could not fill a buffer.
#[derive(Debug, Error)]
#[error("random number generator failed: {0}")]
pub struct RandomError(pub String);

/// A cryptographically secure source of random bytes.
///
/// Implementations must be safe to share between threads; independent
/// transforms draw salts and nonces from the same source concurrently.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<(), RandomError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), RandomError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| RandomError(e.to_string()))
    }
}
