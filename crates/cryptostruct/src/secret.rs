//! Key material: the caller's master secret and per-record derived keys.
//!
//! # Security invariants
//!
//! - Neither type is ever written to logs or traces; `Debug` prints a
//!   placeholder.
//! - Both are zeroed when dropped.
//! - Derived keys live only for the duration of one record's transform.

use std::fmt;

use common::ErrorKind;
use zeroize::Zeroizing;

/// Byte length of a derived symmetric key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// The shared secret every record key is derived from.
///
/// Decoded once per top-level transform and passed by reference through the
/// whole record tree.
pub struct MasterSecret(Zeroizing<Vec<u8>>);

impl MasterSecret {
    /// Decode a hex-encoded master secret.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidMasterSecret`] if `hex_secret` is empty or
    /// not valid hex. The message never echoes the offending input.
    pub fn from_hex(hex_secret: &str) -> Result<Self, ErrorKind> {
        let bytes = hex::decode(hex_secret.trim()).map_err(|e| {
            let reason = match e {
                hex::FromHexError::InvalidHexCharacter { index, .. } => {
                    format!("invalid hex digit at position {index}")
                }
                hex::FromHexError::OddLength => "odd number of hex digits".to_owned(),
                hex::FromHexError::InvalidStringLength => "invalid length".to_owned(),
            };
            ErrorKind::InvalidMasterSecret(reason)
        })?;
        Self::from_bytes(bytes)
    }

    /// Wrap raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidMasterSecret`] if `bytes` is empty.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ErrorKind> {
        let bytes = Zeroizing::new(bytes);
        if bytes.is_empty() {
            return Err(ErrorKind::InvalidMasterSecret("secret is empty".to_owned()));
        }
        Ok(Self(bytes))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret([REDACTED])")
    }
}

/// A record's symmetric key, derived from the master secret and the record's
/// salt.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}
