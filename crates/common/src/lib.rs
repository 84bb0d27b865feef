//! Wire types and errors shared across `cryptostruct` crates.

pub mod error;
pub mod protocol;

pub use error::{Error, ErrorKind, FieldPath, PathSegment, Result};
pub use protocol::{CipherLeaf, CipherSuite, CryptoContext};
