//! Authenticated encryption of individual field values.
//!
//! Every suite takes a 256-bit key and a 96-bit nonce. A fresh random nonce is
//! drawn for every call, so sealing the same plaintext twice under the same
//! key never yields the same ciphertext.
//!
//! **Do NOT reuse a nonce with AES-256-GCM or ChaCha20-Poly1305.** Nonce reuse
//! breaks both confidentiality and authentication for those suites.

use aes_gcm::aead::{generic_array::GenericArray, Aead, KeyInit, Payload};
use aes_gcm::Aes256Gcm;
use aes_gcm_siv::Aes256GcmSiv;
use chacha20poly1305::ChaCha20Poly1305;
use common::{CipherSuite, ErrorKind};
use thiserror::Error;

use super::random::{RandomError, RandomSource};
use crate::secret::DerivedKey;

/// Byte length of the nonce prepended to every ciphertext.
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended by every suite.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key does not fit the suite.
    #[error("invalid key length for cipher suite")]
    InvalidKeyLength,

    /// The input is too short to contain a nonce and a tag.
    #[error("ciphertext shorter than nonce and tag")]
    Truncated,

    /// AEAD encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// No nonce could be generated.
    #[error(transparent)]
    Randomness(#[from] RandomError),
}

impl From<CipherError> for ErrorKind {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidKeyLength => ErrorKind::KeyDerivationFailed,
            CipherError::Truncated | CipherError::AeadFailure => ErrorKind::AuthenticationFailed,
            CipherError::Randomness(_) => ErrorKind::RandomnessUnavailable,
        }
    }
}

/// Encrypt `plaintext` under `key` with the given suite.
///
/// Returns `nonce || ciphertext || tag`.
///
/// # Errors
///
/// Returns [`CipherError::Randomness`] if no nonce could be drawn, or
/// [`CipherError::AeadFailure`] on an internal AEAD error.
pub fn seal(
    key: &DerivedKey,
    suite: CipherSuite,
    plaintext: &[u8],
    random: &dyn RandomSource,
) -> Result<Vec<u8>, CipherError> {
    let mut nonce = [0u8; NONCE_LEN];
    random.fill(&mut nonce)?;

    let payload = Payload {
        msg: plaintext,
        aad: suite.name().as_bytes(),
    };
    let ciphertext = match suite {
        CipherSuite::Aes256Gcm => encrypt_with::<Aes256Gcm>(key, &nonce, payload),
        CipherSuite::ChaCha20Poly1305 => encrypt_with::<ChaCha20Poly1305>(key, &nonce, payload),
        CipherSuite::Aes256GcmSiv => encrypt_with::<Aes256GcmSiv>(key, &nonce, payload),
    }?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt the output of [`seal`].
///
/// # Errors
///
/// Returns [`CipherError::Truncated`] if the input cannot hold a nonce and a
/// tag, and [`CipherError::AeadFailure`] if authentication fails (wrong key,
/// wrong suite, or tampered data).
pub fn open(key: &DerivedKey, suite: CipherSuite, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CipherError::Truncated);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

    let payload = Payload {
        msg: ciphertext,
        aad: suite.name().as_bytes(),
    };
    match suite {
        CipherSuite::Aes256Gcm => decrypt_with::<Aes256Gcm>(key, nonce, payload),
        CipherSuite::ChaCha20Poly1305 => decrypt_with::<ChaCha20Poly1305>(key, nonce, payload),
        CipherSuite::Aes256GcmSiv => decrypt_with::<Aes256GcmSiv>(key, nonce, payload),
    }
}

fn encrypt_with<C: Aead + KeyInit>(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    payload: Payload<'_, '_>,
) -> Result<Vec<u8>, CipherError> {
    let cipher = C::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKeyLength)?;
    cipher
        .encrypt(GenericArray::from_slice(&nonce[..]), payload)
        .map_err(|_| CipherError::AeadFailure)
}

fn decrypt_with<C: Aead + KeyInit>(
    key: &DerivedKey,
    nonce: &[u8],
    payload: Payload<'_, '_>,
) -> Result<Vec<u8>, CipherError> {
    let cipher = C::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKeyLength)?;
    cipher
        .decrypt(GenericArray::from_slice(nonce), payload)
        .map_err(|_| CipherError::AeadFailure)
}
