//! Canonical byte encoding of scalar field values, and the hex text form of
//! ciphertext leaves.
//!
//! Integers encode as fixed-width big-endian bytes of their Rust type; text
//! encodes as UTF-8. The set of scalars is closed by the [`Scalar`] trait, so
//! an unsupported field type is a compile error rather than a runtime one.

use common::{CipherLeaf, ErrorKind};

/// The kind of a scalar, used to check that open and sealed shapes agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// A fixed-width integer.
    Int { width: usize, signed: bool },
    /// UTF-8 text.
    Text,
}

/// A field value that can be sealed into a single ciphertext leaf.
pub trait Scalar: Clone + Sized + 'static {
    /// The kind recorded in shape descriptors.
    const KIND: ScalarKind;

    /// The canonical byte encoding.
    fn encode(&self) -> Vec<u8>;

    /// Inverse of [`Scalar::encode`].
    fn decode(bytes: &[u8]) -> Result<Self, ErrorKind>;
}

macro_rules! int_scalar {
    ($($ty:ty => $signed:expr),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::Int {
                    width: std::mem::size_of::<$ty>(),
                    signed: $signed,
                };

                fn encode(&self) -> Vec<u8> {
                    self.to_be_bytes().to_vec()
                }

                fn decode(bytes: &[u8]) -> Result<Self, ErrorKind> {
                    let raw: [u8; std::mem::size_of::<$ty>()] =
                        bytes
                            .try_into()
                            .map_err(|_| ErrorKind::DecodeLengthMismatch {
                                expected: std::mem::size_of::<$ty>(),
                                actual: bytes.len(),
                            })?;
                    Ok(<$ty>::from_be_bytes(raw))
                }
            }
        )*
    };
}

int_scalar!(
    i8 => true,
    i16 => true,
    i32 => true,
    i64 => true,
    u8 => false,
    u16 => false,
    u32 => false,
    u64 => false,
);

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self, ErrorKind> {
        String::from_utf8(bytes.to_vec()).map_err(|_| ErrorKind::InvalidText)
    }
}

/// Encode a scalar to its canonical bytes.
pub fn encode_scalar<T: Scalar>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Decode canonical bytes into a scalar of type `T`.
///
/// # Errors
///
/// Returns [`ErrorKind::DecodeLengthMismatch`] if an integer target receives
/// the wrong number of bytes, or [`ErrorKind::InvalidText`] if a text target
/// receives bytes that are not UTF-8.
pub fn decode_scalar<T: Scalar>(bytes: &[u8]) -> Result<T, ErrorKind> {
    T::decode(bytes)
}

/// Render ciphertext bytes as a leaf.
pub fn leaf_to_text(ciphertext: &[u8]) -> CipherLeaf {
    CipherLeaf::from_ciphertext(ciphertext)
}

/// Recover ciphertext bytes from a leaf.
///
/// # Errors
///
/// Returns [`ErrorKind::MalformedHex`] if the leaf is not valid hex.
pub fn text_to_leaf(leaf: &CipherLeaf) -> Result<Vec<u8>, ErrorKind> {
    leaf.to_ciphertext()
}
