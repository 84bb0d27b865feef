//! Record shape descriptors, field policy resolution, and the per-type cache.
//!
//! # Responsibilities
//!
//! - Describe the Open and Sealed shapes of a record type field by field.
//! - Derive the field policy (which fields are sensitive) from the tags on the
//!   Open shape.
//! - Validate an Open/Sealed pair against each other and against the policy,
//!   once per type, and cache the result.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** This module must not import anything from
//!   `crate::crypto`, `crate::context` or `crate::secret`.

pub mod cache;
pub mod resolver;

pub use cache::{PolicyCache, ResolvedShape};
pub use resolver::{resolve_policy, FieldPolicy};

use std::any::type_name;
use std::collections::HashSet;

use common::{Error, ErrorKind};

use crate::codec::{Scalar, ScalarKind};
use crate::record::Record;

/// The declared type of one field in a shape descriptor.
///
/// Nested records are identified by the type name of their Open type in both
/// shapes, so an Open field and its sealed counterpart can be matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarKind),
    /// A sequence of scalars.
    Scalars(ScalarKind),
    /// A nested Open record.
    Record(&'static str),
    /// A sequence of nested Open records.
    Records(&'static str),
    /// Any other value, copied as is. Never sensitive.
    Opaque(&'static str),
    /// A ciphertext leaf.
    Leaf,
    /// A sequence of ciphertext leaves.
    Leaves,
    /// A nested Sealed record.
    SealedRecord(&'static str),
    /// A sequence of nested Sealed records.
    SealedRecords(&'static str),
    /// The record's own crypto context.
    Context,
}

impl FieldType {
    /// The Sealed field type a sensitive field of this Open type must map to.
    fn sealed_form(self) -> Option<FieldType> {
        match self {
            FieldType::Scalar(_) => Some(FieldType::Leaf),
            FieldType::Scalars(_) => Some(FieldType::Leaves),
            FieldType::Record(name) => Some(FieldType::SealedRecord(name)),
            FieldType::Records(name) => Some(FieldType::SealedRecords(name)),
            _ => None,
        }
    }

    fn is_sealed_only(self) -> bool {
        matches!(
            self,
            FieldType::Leaf
                | FieldType::Leaves
                | FieldType::SealedRecord(_)
                | FieldType::SealedRecords(_)
                | FieldType::Context
        )
    }
}

/// One field of a shape descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    /// The declared sensitivity tag, if any. Untagged fields are pass-through.
    pub sensitive: Option<bool>,
}

/// The descriptor of one side of a record shape pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    name: &'static str,
    fields: Vec<FieldSpec>,
    stray_tag: bool,
}

impl Shape {
    /// Start describing a shape called `name`.
    pub fn builder(name: &'static str) -> ShapeBuilder {
        ShapeBuilder {
            shape: Shape {
                name,
                fields: Vec::new(),
                stray_tag: false,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Fluent construction of a [`Shape`].
///
/// ```ignore
/// Shape::builder("Person")
///     .scalar::<String>("name").sensitive(true)
///     .scalar::<String>("note")
///     .build()
/// ```
#[derive(Debug)]
pub struct ShapeBuilder {
    shape: Shape,
}

impl ShapeBuilder {
    /// Declare a field with an explicit type.
    pub fn field(mut self, name: &'static str, ty: FieldType) -> Self {
        self.shape.fields.push(FieldSpec {
            name,
            ty,
            sensitive: None,
        });
        self
    }

    pub fn scalar<T: Scalar>(self, name: &'static str) -> Self {
        self.field(name, FieldType::Scalar(T::KIND))
    }

    pub fn scalars<T: Scalar>(self, name: &'static str) -> Self {
        self.field(name, FieldType::Scalars(T::KIND))
    }

    pub fn record<R: Record>(self, name: &'static str) -> Self {
        self.field(name, FieldType::Record(type_name::<R>()))
    }

    pub fn records<R: Record>(self, name: &'static str) -> Self {
        self.field(name, FieldType::Records(type_name::<R>()))
    }

    pub fn opaque<T: 'static>(self, name: &'static str) -> Self {
        self.field(name, FieldType::Opaque(type_name::<T>()))
    }

    pub fn leaf(self, name: &'static str) -> Self {
        self.field(name, FieldType::Leaf)
    }

    pub fn leaves(self, name: &'static str) -> Self {
        self.field(name, FieldType::Leaves)
    }

    /// Declare the sealed form of the nested record `R`.
    pub fn sealed<R: Record>(self, name: &'static str) -> Self {
        self.field(name, FieldType::SealedRecord(type_name::<R>()))
    }

    /// Declare a sequence of sealed forms of the nested record `R`.
    pub fn sealed_seq<R: Record>(self, name: &'static str) -> Self {
        self.field(name, FieldType::SealedRecords(type_name::<R>()))
    }

    pub fn context(self, name: &'static str) -> Self {
        self.field(name, FieldType::Context)
    }

    /// Tag the most recently declared field.
    pub fn sensitive(mut self, flag: bool) -> Self {
        match self.shape.fields.last_mut() {
            Some(field) => field.sensitive = Some(flag),
            None => self.shape.stray_tag = true,
        }
        self
    }

    pub fn build(self) -> Shape {
        self.shape
    }
}

/// Check that `sealed` is the sealed counterpart of `open` under `policy`.
///
/// # Errors
///
/// Returns [`ErrorKind::ShapeMismatch`], located at the offending field where
/// there is one, if:
///
/// - a field name is declared twice, or a tag precedes every field;
/// - the Open shape declares a sealed-only field type, or the Sealed shape
///   carries a sensitivity tag;
/// - the Sealed shape does not have exactly one context field;
/// - an Open field is missing from the Sealed shape, or the Sealed shape has a
///   field the Open shape lacks;
/// - a sensitive field does not map to the sealed form of its type, or an
///   opaque field is tagged sensitive;
/// - a pass-through field's type differs between the shapes.
pub fn validate(open: &Shape, sealed: &Shape, policy: &FieldPolicy) -> Result<(), Error> {
    check_well_formed(open)?;
    check_well_formed(sealed)?;

    if let Some(f) = open.fields.iter().find(|f| f.ty.is_sealed_only()) {
        return Err(mismatch(format!(
            "open shape {} declares sealed-only type {:?}",
            open.name, f.ty
        ))
        .at_field(f.name));
    }
    if let Some(f) = sealed.fields.iter().find(|f| f.sensitive.is_some()) {
        return Err(mismatch(format!(
            "sealed shape {} carries a sensitivity tag",
            sealed.name
        ))
        .at_field(f.name));
    }

    let contexts = sealed
        .fields
        .iter()
        .filter(|f| f.ty == FieldType::Context)
        .count();
    if contexts != 1 {
        return Err(mismatch(format!(
            "sealed shape {} declares {contexts} context fields, expected 1",
            sealed.name
        )));
    }

    for field in &open.fields {
        let counterpart = sealed.field(field.name).ok_or_else(|| {
            mismatch(format!("missing from sealed shape {}", sealed.name)).at_field(field.name)
        })?;

        let expected = if policy.is_sensitive(field.name) {
            field.ty.sealed_form().ok_or_else(|| {
                mismatch(format!("{:?} cannot be sensitive", field.ty)).at_field(field.name)
            })?
        } else {
            field.ty
        };
        if counterpart.ty != expected {
            return Err(mismatch(format!(
                "sealed type {:?} does not match expected {expected:?}",
                counterpart.ty
            ))
            .at_field(field.name));
        }
    }

    for field in &sealed.fields {
        if field.ty != FieldType::Context && open.field(field.name).is_none() {
            return Err(
                mismatch(format!("not present in open shape {}", open.name)).at_field(field.name)
            );
        }
    }

    Ok(())
}

fn check_well_formed(shape: &Shape) -> Result<(), Error> {
    if shape.stray_tag {
        return Err(mismatch(format!(
            "shape {} has a sensitivity tag before any field",
            shape.name
        )));
    }
    let mut seen = HashSet::new();
    for field in &shape.fields {
        if !seen.insert(field.name) {
            return Err(
                mismatch(format!("declared twice in shape {}", shape.name)).at_field(field.name)
            );
        }
    }
    Ok(())
}

fn mismatch(detail: String) -> Error {
    Error::new(ErrorKind::ShapeMismatch(detail))
}
