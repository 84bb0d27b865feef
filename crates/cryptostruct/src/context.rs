//! Creation of per-record crypto contexts and key derivation from them.
//!
//! A context is created once per sealed record instance and persisted inside
//! it. Opening never creates a context; it re-derives the same key from the
//! persisted one, so no key material is ever stored.

use common::{CipherSuite, CryptoContext, ErrorKind};
use zeroize::Zeroizing;

use crate::crypto::{Kdf, RandomSource};
use crate::secret::{DerivedKey, MasterSecret, KEY_LEN};

/// Byte length of the random salt in every context.
pub const SALT_LEN: usize = 32;

/// Create a fresh context for the suite named `suite`.
///
/// # Errors
///
/// Returns [`ErrorKind::UnknownCipherSuite`] if `suite` is not a supported
/// identifier, or [`ErrorKind::RandomnessUnavailable`] if no salt could be
/// generated.
pub fn create(suite: &str, random: &dyn RandomSource) -> Result<CryptoContext, ErrorKind> {
    create_for(suite.parse()?, random)
}

/// Create a fresh context for an already validated suite.
///
/// # Errors
///
/// Returns [`ErrorKind::RandomnessUnavailable`] if no salt could be generated.
pub fn create_for(
    suite: CipherSuite,
    random: &dyn RandomSource,
) -> Result<CryptoContext, ErrorKind> {
    let mut salt = [0u8; SALT_LEN];
    random
        .fill(&mut salt)
        .map_err(|_| ErrorKind::RandomnessUnavailable)?;
    Ok(CryptoContext {
        cipher_suite: suite,
        salt: hex::encode(salt),
    })
}

/// Derive the symmetric key of the record that carries `context`.
///
/// Used identically on the seal and open paths.
///
/// # Errors
///
/// Returns [`ErrorKind::MissingSalt`] if the context has no salt,
/// [`ErrorKind::MalformedHex`] if the salt is not hex, and
/// [`ErrorKind::KeyDerivationFailed`] if the KDF fails.
pub fn derive_key(
    context: &CryptoContext,
    master: &MasterSecret,
    kdf: &dyn Kdf,
) -> Result<DerivedKey, ErrorKind> {
    if context.salt.is_empty() {
        return Err(ErrorKind::MissingSalt);
    }
    let salt = hex::decode(&context.salt).map_err(|e| ErrorKind::MalformedHex(e.to_string()))?;

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    kdf.derive(master.expose(), &salt, &mut okm[..])
        .map_err(|_| ErrorKind::KeyDerivationFailed)?;
    Ok(DerivedKey::from_bytes(*okm))
}
