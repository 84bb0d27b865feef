//! Field-selective, structure-preserving encryption of typed records.
//!
//! A record type declares an Open (plaintext) form and a Sealed form through
//! the [`Record`] and [`SealedRecord`] traits. Sealing replaces every field
//! tagged sensitive with authenticated ciphertext, recursing into nested
//! records and sequences of records, each of which gets a crypto context of
//! its own. Opening reverses the transform using only the caller's master
//! secret and the contexts stamped into the sealed record.
//!
//! # Module layout
//!
//! - [`crypto`]: cipher, key derivation and randomness primitives.
//! - [`context`]: per-record crypto contexts and key derivation from them.
//! - [`codec`]: canonical scalar bytes and the hex form of ciphertext leaves.
//! - [`schema`]: shape descriptors, field policy and the per-type cache.
//! - [`engine`]: the seal and open transforms.

pub mod codec;
pub mod context;
pub mod crypto;
pub mod engine;
pub mod record;
pub mod schema;
pub mod secret;

pub use common::{
    CipherLeaf, CipherSuite, CryptoContext, Error, ErrorKind, FieldPath, PathSegment, Result,
};
pub use codec::{Scalar, ScalarKind};
pub use engine::{open, seal, Engine, Opener, Sealer};
pub use record::{Record, SealedRecord};
pub use schema::{FieldPolicy, FieldType, Shape, ShapeBuilder};
pub use secret::MasterSecret;
