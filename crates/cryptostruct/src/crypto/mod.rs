//! Cryptographic primitives used by the transform engine.
//!
//! This module is free of any knowledge about records or field policy. It
//! provides the opaque seal/open cipher, the key derivation function, and the
//! randomness source for salts and nonces.
//!
//! # Ciphertext format
//!
//! ```text
//! <nonce: 12 bytes><ciphertext + tag: len(plaintext) + 16 bytes>
//! ```
//!
//! The cipher suite name is authenticated as associated data.

pub mod cipher;
pub mod kdf;
pub mod random;

pub use cipher::{CipherError, NONCE_LEN, TAG_LEN};
pub use kdf::{HkdfSha256, Kdf, KdfError};
pub use random::{OsRandom, RandomError, RandomSource};
