//! Key derivation from the master secret and a per-record salt.

use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;

/// Errors produced by a key derivation function.
#[derive(Debug, Error)]
pub enum KdfError {
    /// The requested output is longer than the KDF can produce.
    #[error("cannot derive {0} bytes of key material")]
    InvalidOutputLength(usize),
}

/// A deterministic key derivation function.
///
/// Identical `ikm` and `salt` must always fill `okm` with identical bytes;
/// the open path relies on recomputing the key the seal path used.
#[cfg_attr(test, mockall::automock)]
pub trait Kdf: Send + Sync {
    /// Fill `okm` with key material derived from `ikm` and `salt`.
    fn derive(&self, ikm: &[u8], salt: &[u8], okm: &mut [u8]) -> Result<(), KdfError>;
}

/// HKDF (RFC 5869) over SHA-256 with empty `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HkdfSha256;

impl Kdf for HkdfSha256 {
    fn derive(&self, ikm: &[u8], salt: &[u8], okm: &mut [u8]) -> Result<(), KdfError> {
        let len = okm.len();
        Hkdf::<Sha256>::new(Some(salt), ikm)
            .expand(&[], okm)
            .map_err(|_| KdfError::InvalidOutputLength(len))
    }
}
