//! The record shape pair traits.
//!
//! A type takes part in sealing by implementing [`Record`] for its Open form
//! and [`SealedRecord`] for its Sealed form. The two associated types tie the
//! pair together at compile time; the shape descriptors tie them together
//! field by field and are checked once per type at run time.
//!
//! Field mapping is written out per type against a [`Sealer`] or [`Opener`],
//! which applies the cryptographic transform and checks each call against
//! the resolved policy:
//!
//! ```ignore
//! impl Record for Sample {
//!     type Sealed = SealedSample;
//!
//!     fn shape() -> Shape {
//!         Shape::builder("Sample")
//!             .scalar::<String>("name").sensitive(true)
//!             .scalar::<String>("note")
//!             .build()
//!     }
//!
//!     fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<SealedSample> {
//!         Ok(SealedSample {
//!             crypto: sealer.context(),
//!             name: sealer.scalar("name", &self.name)?,
//!             note: sealer.pass("note", &self.note)?,
//!         })
//!     }
//! }
//! ```

use common::{CryptoContext, Result};

use crate::engine::{Opener, Sealer};
use crate::schema::Shape;

/// The Open (plaintext) form of a record.
pub trait Record: Sized + 'static {
    /// The Sealed form of this record.
    type Sealed: SealedRecord<Open = Self>;

    /// Describe the fields of the Open form, with sensitivity tags.
    fn shape() -> Shape;

    /// Build the Sealed form, one [`Sealer`] call per field.
    fn seal_fields(&self, sealer: &Sealer<'_>) -> Result<Self::Sealed>;
}

/// The Sealed form of a record, carrying its own crypto context.
pub trait SealedRecord: Sized + 'static {
    /// The Open form of this record.
    type Open: Record<Sealed = Self>;

    /// Describe the fields of the Sealed form, context field included.
    fn shape() -> Shape;

    /// The context this record was sealed under.
    fn crypto_context(&self) -> &CryptoContext;

    /// Rebuild the Open form, one [`Opener`] call per field.
    fn open_fields(&self, opener: &Opener<'_>) -> Result<Self::Open>;
}
