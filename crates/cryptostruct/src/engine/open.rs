//! Field mapping on the open path.

use std::any::type_name;

use common::{CipherLeaf, CipherSuite, Error, ErrorKind, Result};
use zeroize::Zeroizing;

use super::{expect_pass, expect_sensitive, Engine, Mapped};
use crate::codec::{decode_scalar, text_to_leaf, Scalar};
use crate::crypto::cipher;
use crate::record::SealedRecord;
use crate::schema::{FieldType, ResolvedShape};
use crate::secret::{DerivedKey, MasterSecret};

/// Opens the fields of one sealed record instance.
///
/// Handed to [`SealedRecord::open_fields`]. The key was re-derived from the
/// record's own stamped context; nested records re-derive theirs.
pub struct Opener<'a> {
    engine: &'a Engine,
    master: &'a MasterSecret,
    key: DerivedKey,
    suite: CipherSuite,
    shape: &'a ResolvedShape,
    depth: usize,
    mapped: Mapped,
}

impl<'a> Opener<'a> {
    pub(super) fn new(
        engine: &'a Engine,
        master: &'a MasterSecret,
        key: DerivedKey,
        suite: CipherSuite,
        shape: &'a ResolvedShape,
        depth: usize,
    ) -> Self {
        Self {
            engine,
            master,
            key,
            suite,
            shape,
            depth,
            mapped: Mapped::default(),
        }
    }

    /// Copy a pass-through field unchanged.
    pub fn pass<T: Clone>(&self, field: &'static str, value: &T) -> Result<T> {
        expect_pass(self.shape, &self.mapped, field)?;
        Ok(value.clone())
    }

    /// Decrypt a leaf back into a scalar.
    pub fn scalar<T: Scalar>(&self, field: &'static str, leaf: &CipherLeaf) -> Result<T> {
        expect_sensitive(self.shape, &self.mapped, field, FieldType::Scalar(T::KIND))?;
        self.open_scalar(leaf)
            .map_err(|kind| Error::new(kind).at_field(field))
    }

    /// Decrypt a sequence of leaves element-wise.
    pub fn scalars<T: Scalar>(&self, field: &'static str, leaves: &[CipherLeaf]) -> Result<Vec<T>> {
        expect_sensitive(self.shape, &self.mapped, field, FieldType::Scalars(T::KIND))?;
        leaves
            .iter()
            .enumerate()
            .map(|(i, leaf)| {
                self.open_scalar(leaf)
                    .map_err(|kind| Error::new(kind).at_index(i).at_field(field))
            })
            .collect()
    }

    /// Open a nested sealed record under its own context.
    pub fn record<S: SealedRecord>(&self, field: &'static str, sealed: &S) -> Result<S::Open> {
        expect_sensitive(
            self.shape,
            &self.mapped,
            field,
            FieldType::Record(type_name::<S::Open>()),
        )?;
        self.engine
            .open_record(self.master, sealed, self.depth + 1)
            .map_err(|e| e.at_field(field))
    }

    /// Open a sequence of nested sealed records, each under its own context.
    pub fn records<S: SealedRecord>(&self, field: &'static str, sealed: &[S]) -> Result<Vec<S::Open>> {
        expect_sensitive(
            self.shape,
            &self.mapped,
            field,
            FieldType::Records(type_name::<S::Open>()),
        )?;
        sealed
            .iter()
            .enumerate()
            .map(|(i, element)| {
                self.engine
                    .open_record(self.master, element, self.depth + 1)
                    .map_err(|e| e.at_index(i).at_field(field))
            })
            .collect()
    }

    pub(super) fn ensure_complete(&self) -> Result<()> {
        self.mapped.ensure_complete(self.shape)
    }

    fn open_scalar<T: Scalar>(&self, leaf: &CipherLeaf) -> std::result::Result<T, ErrorKind> {
        let ciphertext = text_to_leaf(leaf)?;
        let plaintext = Zeroizing::new(cipher::open(&self.key, self.suite, &ciphertext)?);
        decode_scalar(&plaintext)
    }
}
