//! Types that appear in the sealed wire shape of a record.
//!
//! These types are serialised by whatever external serialiser stores or
//! transports sealed records (JSON, YAML, ...). Field names are stable; field
//! order is irrelevant.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

// ---------------------------------------------------------------------------
// Cipher suites
// ---------------------------------------------------------------------------

/// The closed set of authenticated ciphers a record can be sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    /// AES-256 in Galois/Counter Mode.
    #[serde(rename = "AES_256_GCM")]
    Aes256Gcm,
    /// ChaCha20 stream cipher with a Poly1305 authenticator.
    #[serde(rename = "CHACHA20_POLY1305")]
    ChaCha20Poly1305,
    /// Nonce-misuse-resistant AES-256-GCM-SIV (RFC 8452).
    #[serde(rename = "AES_256_GCM_SIV")]
    Aes256GcmSiv,
}

impl CipherSuite {
    /// Every supported suite.
    pub const ALL: [CipherSuite; 3] = [
        CipherSuite::Aes256Gcm,
        CipherSuite::ChaCha20Poly1305,
        CipherSuite::Aes256GcmSiv,
    ];

    /// The identifier used on the wire and in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            CipherSuite::Aes256Gcm => "AES_256_GCM",
            CipherSuite::ChaCha20Poly1305 => "CHACHA20_POLY1305",
            CipherSuite::Aes256GcmSiv => "AES_256_GCM_SIV",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.name() == s)
            .ok_or_else(|| ErrorKind::UnknownCipherSuite(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Crypto context
// ---------------------------------------------------------------------------

/// Per-record cryptographic context stamped into every sealed record.
///
/// Together with the caller's master secret it determines the record's
/// symmetric key. It holds no key material itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoContext {
    /// Cipher used for every leaf of the record.
    pub cipher_suite: CipherSuite,
    /// Hex-encoded random salt fed to the key derivation function.
    /// Older payloads name this field `nonce`.
    #[serde(alias = "nonce")]
    pub salt: String,
}

// ---------------------------------------------------------------------------
// Ciphertext leaf
// ---------------------------------------------------------------------------

/// The sealed representation of one sensitive scalar: hex text of its
/// authenticated ciphertext.
///
/// Serialises as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherLeaf(String);

impl CipherLeaf {
    /// Hex-encode raw ciphertext bytes.
    pub fn from_ciphertext(ciphertext: &[u8]) -> Self {
        Self(hex::encode(ciphertext))
    }

    /// Wrap already-encoded hex text without validating it.
    ///
    /// Validation happens when the leaf is decoded.
    pub fn from_hex(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the hex text back into ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::MalformedHex`] if the text is not valid hex.
    pub fn to_ciphertext(&self) -> Result<Vec<u8>, ErrorKind> {
        hex::decode(&self.0).map_err(|e| ErrorKind::MalformedHex(e.to_string()))
    }
}

impl fmt::Display for CipherLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
