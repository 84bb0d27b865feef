//! Transform errors and the field path that locates them.

use std::fmt;

use thiserror::Error;

/// The condition that aborted a seal or open transform.
///
/// Every variant is terminal: the engine never recovers from one internally
/// and never returns a partially transformed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The cipher suite name is not one of the supported identifiers.
    #[error("unknown cipher suite: {0}")]
    UnknownCipherSuite(String),

    /// The master secret is empty or is not valid hex.
    #[error("invalid master secret: {0}")]
    InvalidMasterSecret(String),

    /// A crypto context carries no salt, so no key can be derived from it.
    #[error("crypto context has no salt")]
    MissingSalt,

    /// The key derivation primitive failed.
    #[error("key derivation failed")]
    KeyDerivationFailed,

    /// A ciphertext leaf or salt is not valid hex.
    #[error("malformed hex: {0}")]
    MalformedHex(String),

    /// Decrypted bytes do not have the fixed width of the integer target.
    #[error("decoded value is {actual} bytes, expected {expected}")]
    DecodeLengthMismatch { expected: usize, actual: usize },

    /// Decrypted bytes for a text target are not UTF-8.
    #[error("decoded text is not valid UTF-8")]
    InvalidText,

    /// The ciphertext was tampered with, truncated, or sealed under another key.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The open and sealed shapes of a record disagree, or a field mapping
    /// contradicts the declared policy.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The OS random number generator could not produce a salt or nonce.
    #[error("system randomness unavailable")]
    RandomnessUnavailable,
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field of a record.
    Field(&'static str),
    /// An element of a sequence field.
    Index(usize),
}

/// Location of a field relative to the top-level record, e.g.
/// `details.addresses[1].street`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The path of the top-level record itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if the path points at the top-level record.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments from the root downwards.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn prepend(&mut self, segment: PathSegment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A transform failure together with the path of the field that caused it.
///
/// Nested records report their failures relative to themselves; each parent
/// prefixes its own field name on the way out, so the caller sees the full
/// path while the [`ErrorKind`] is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at {path})")]
pub struct Error {
    path: FieldPath,
    kind: ErrorKind,
}

impl Error {
    /// Create an error located at the record root.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            path: FieldPath::root(),
            kind,
        }
    }

    /// The condition that aborted the transform.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Where the failure happened.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Prefix the path with a field name.
    pub fn at_field(mut self, name: &'static str) -> Self {
        self.path.prepend(PathSegment::Field(name));
        self
    }

    /// Prefix the path with a sequence index.
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.prepend(PathSegment::Index(index));
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, Error>;
