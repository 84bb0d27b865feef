//! Field mapping on the seal path.

use std::any::type_name;

use common::{CipherLeaf, CryptoContext, Error, ErrorKind, Result};
use zeroize::Zeroizing;

use super::{expect_pass, expect_sensitive, Engine, Mapped};
use crate::codec::{encode_scalar, leaf_to_text, Scalar};
use crate::crypto::cipher;
use crate::record::Record;
use crate::schema::{FieldType, ResolvedShape};
use crate::secret::{DerivedKey, MasterSecret};

/// Seals the fields of one record instance.
///
/// Handed to [`Record::seal_fields`]; every call names the field it maps and
/// is checked against the record's resolved policy before anything is
/// encrypted.
pub struct Sealer<'a> {
    engine: &'a Engine,
    master: &'a MasterSecret,
    key: DerivedKey,
    context: CryptoContext,
    shape: &'a ResolvedShape,
    depth: usize,
    mapped: Mapped,
}

impl<'a> Sealer<'a> {
    pub(super) fn new(
        engine: &'a Engine,
        master: &'a MasterSecret,
        key: DerivedKey,
        context: CryptoContext,
        shape: &'a ResolvedShape,
        depth: usize,
    ) -> Self {
        Self {
            engine,
            master,
            key,
            context,
            shape,
            depth,
            mapped: Mapped::default(),
        }
    }

    /// The freshly created context this record is sealed under. Store it in
    /// the Sealed record's context field.
    pub fn context(&self) -> CryptoContext {
        self.context.clone()
    }

    /// Copy a pass-through field unchanged.
    pub fn pass<T: Clone>(&self, field: &'static str, value: &T) -> Result<T> {
        expect_pass(self.shape, &self.mapped, field)?;
        Ok(value.clone())
    }

    /// Encrypt a sensitive scalar into a leaf.
    pub fn scalar<T: Scalar>(&self, field: &'static str, value: &T) -> Result<CipherLeaf> {
        expect_sensitive(self.shape, &self.mapped, field, FieldType::Scalar(T::KIND))?;
        self.seal_scalar(value)
            .map_err(|kind| Error::new(kind).at_field(field))
    }

    /// Encrypt a sensitive sequence of scalars element-wise.
    pub fn scalars<T: Scalar>(&self, field: &'static str, values: &[T]) -> Result<Vec<CipherLeaf>> {
        expect_sensitive(self.shape, &self.mapped, field, FieldType::Scalars(T::KIND))?;
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                self.seal_scalar(value)
                    .map_err(|kind| Error::new(kind).at_index(i).at_field(field))
            })
            .collect()
    }

    /// Seal a sensitive nested record under a context of its own.
    pub fn record<R: Record>(&self, field: &'static str, value: &R) -> Result<R::Sealed> {
        expect_sensitive(self.shape, &self.mapped, field, FieldType::Record(type_name::<R>()))?;
        self.seal_nested(value).map_err(|e| e.at_field(field))
    }

    /// Seal a sensitive sequence of nested records, each under a context of
    /// its own.
    pub fn records<R: Record>(&self, field: &'static str, values: &[R]) -> Result<Vec<R::Sealed>> {
        expect_sensitive(self.shape, &self.mapped, field, FieldType::Records(type_name::<R>()))?;
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                self.seal_nested(value)
                    .map_err(|e| e.at_index(i).at_field(field))
            })
            .collect()
    }

    pub(super) fn ensure_complete(&self) -> Result<()> {
        self.mapped.ensure_complete(self.shape)
    }

    fn seal_scalar<T: Scalar>(&self, value: &T) -> std::result::Result<CipherLeaf, ErrorKind> {
        let plaintext = Zeroizing::new(encode_scalar(value));
        let ciphertext = cipher::seal(
            &self.key,
            self.context.cipher_suite,
            &plaintext,
            self.engine.random(),
        )?;
        Ok(leaf_to_text(&ciphertext))
    }

    // Nested records inherit the suite but never the salt.
    fn seal_nested<R: Record>(&self, value: &R) -> Result<R::Sealed> {
        self.engine
            .seal_record(self.master, self.context.cipher_suite, value, self.depth + 1)
    }
}
