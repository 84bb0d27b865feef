//! The seal and open transforms.
//!
//! # Responsibilities
//!
//! - Seal: create a fresh context per record instance, derive its key, and
//!   hand a [`Sealer`] to the record's field mapping. Nested records recurse
//!   with a context of their own.
//! - Open: re-derive each record's key from its stamped context and the
//!   caller's master secret, and hand an [`Opener`] to the field mapping.
//!
//! # Security invariants
//!
//! - The master secret is decoded once per top-level call and passed down by
//!   reference; it is never cached.
//! - Derived keys and plaintext buffers are zeroed when dropped.
//! - The first failure aborts the whole transform; no partial record is ever
//!   returned.
//! - Log fields never include key material, salts or plaintext.

mod open;
mod seal;

#[cfg(test)]
pub(crate) mod fixtures;

pub use open::Opener;
pub use seal::Sealer;

use std::{any::type_name, cell::RefCell, collections::HashSet, fmt, sync::Arc, sync::OnceLock};

use common::{CipherSuite, Error, ErrorKind, Result};
use tracing::{debug, warn};

use crate::context;
use crate::crypto::{HkdfSha256, Kdf, OsRandom, RandomSource};
use crate::record::{Record, SealedRecord};
use crate::schema::{FieldType, PolicyCache, ResolvedShape};
use crate::secret::MasterSecret;

static DEFAULT_ENGINE: OnceLock<Engine> = OnceLock::new();

/// Seal `record` with the shared default engine.
///
/// See [`Engine::seal`].
pub fn seal<R: Record>(master_hex: &str, suite: &str, record: &R) -> Result<R::Sealed> {
    default_engine().seal(master_hex, suite, record)
}

/// Open `sealed` with the shared default engine.
///
/// See [`Engine::open`].
pub fn open<S: SealedRecord>(master_hex: &str, sealed: &S) -> Result<S::Open> {
    default_engine().open(master_hex, sealed)
}

fn default_engine() -> &'static Engine {
    DEFAULT_ENGINE.get_or_init(Engine::new)
}

/// Owns the cryptographic primitives and the per-type policy cache.
///
/// Cheap to share: every method takes `&self`, and independent transforms may
/// run on the same engine from many threads at once.
pub struct Engine {
    kdf: Arc<dyn Kdf>,
    random: Arc<dyn RandomSource>,
    policies: PolicyCache,
}

impl Engine {
    /// An engine using HKDF-SHA256 and the OS random number generator.
    pub fn new() -> Self {
        Self::with_primitives(Arc::new(HkdfSha256), Arc::new(OsRandom))
    }

    /// An engine using the given primitives.
    pub fn with_primitives(kdf: Arc<dyn Kdf>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            kdf,
            random,
            policies: PolicyCache::new(),
        }
    }

    /// The resolved shapes of every record type this engine has seen.
    pub fn policies(&self) -> &PolicyCache {
        &self.policies
    }

    /// Seal `record` and every nested record under `suite`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownCipherSuite`] for an unrecognised suite,
    /// [`ErrorKind::InvalidMasterSecret`] if `master_hex` is not valid hex, and
    /// otherwise any error of [`Engine::seal_with_secret`].
    pub fn seal<R: Record>(&self, master_hex: &str, suite: &str, record: &R) -> Result<R::Sealed> {
        let suite = suite
            .parse::<CipherSuite>()
            .map_err(|kind| report("seal", type_name::<R>(), Error::new(kind)))?;
        let master = MasterSecret::from_hex(master_hex)
            .map_err(|kind| report("seal", type_name::<R>(), Error::new(kind)))?;
        self.seal_with_secret(&master, suite, record)
    }

    /// Seal `record` with an already decoded master secret.
    ///
    /// # Errors
    ///
    /// Returns the first failure, located by its field path:
    /// [`ErrorKind::RandomnessUnavailable`], [`ErrorKind::KeyDerivationFailed`]
    /// or [`ErrorKind::ShapeMismatch`].
    pub fn seal_with_secret<R: Record>(
        &self,
        master: &MasterSecret,
        suite: CipherSuite,
        record: &R,
    ) -> Result<R::Sealed> {
        self.seal_record(master, suite, record, 0)
            .map_err(|e| report("seal", type_name::<R>(), e))
    }

    /// Open `sealed` and every nested record.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidMasterSecret`] if `master_hex` is not valid
    /// hex, and otherwise any error of [`Engine::open_with_secret`].
    pub fn open<S: SealedRecord>(&self, master_hex: &str, sealed: &S) -> Result<S::Open> {
        let master = MasterSecret::from_hex(master_hex)
            .map_err(|kind| report("open", type_name::<S::Open>(), Error::new(kind)))?;
        self.open_with_secret(&master, sealed)
    }

    /// Open `sealed` with an already decoded master secret.
    ///
    /// # Errors
    ///
    /// Returns the first failure, located by its field path:
    /// [`ErrorKind::MissingSalt`], [`ErrorKind::MalformedHex`],
    /// [`ErrorKind::KeyDerivationFailed`], [`ErrorKind::AuthenticationFailed`],
    /// [`ErrorKind::DecodeLengthMismatch`], [`ErrorKind::InvalidText`] or
    /// [`ErrorKind::ShapeMismatch`].
    pub fn open_with_secret<S: SealedRecord>(
        &self,
        master: &MasterSecret,
        sealed: &S,
    ) -> Result<S::Open> {
        self.open_record(master, sealed, 0)
            .map_err(|e| report("open", type_name::<S::Open>(), e))
    }

    pub(crate) fn random(&self) -> &dyn RandomSource {
        self.random.as_ref()
    }

    pub(crate) fn seal_record<R: Record>(
        &self,
        master: &MasterSecret,
        suite: CipherSuite,
        record: &R,
        depth: usize,
    ) -> Result<R::Sealed> {
        let context = context::create_for(suite, self.random.as_ref())?;
        let key = context::derive_key(&context, master, self.kdf.as_ref())?;
        let shape = self.policies.resolve::<R>()?;

        debug!(record = shape.open.name(), suite = %suite, depth, "sealing record");

        let sealer = Sealer::new(self, master, key, context.clone(), &shape, depth);
        let sealed = record.seal_fields(&sealer)?;
        sealer.ensure_complete()?;
        if sealed.crypto_context() != &context {
            return Err(Error::new(ErrorKind::ShapeMismatch(format!(
                "{} is not stamped with the context it was sealed under",
                shape.sealed.name()
            ))));
        }
        Ok(sealed)
    }

    pub(crate) fn open_record<S: SealedRecord>(
        &self,
        master: &MasterSecret,
        sealed: &S,
        depth: usize,
    ) -> Result<S::Open> {
        let context = sealed.crypto_context();
        let key = context::derive_key(context, master, self.kdf.as_ref())?;
        let shape = self.policies.resolve::<S::Open>()?;

        debug!(
            record = shape.open.name(),
            suite = %context.cipher_suite,
            depth,
            "opening record"
        );

        let opener = Opener::new(self, master, key, context.cipher_suite, &shape, depth);
        let open = sealed.open_fields(&opener)?;
        opener.ensure_complete()?;
        Ok(open)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

fn report(operation: &'static str, record: &'static str, err: Error) -> Error {
    warn!(
        operation,
        record,
        path = %err.path(),
        error = %err.kind(),
        "transform failed"
    );
    err
}

/// The fields one record's mapping has routed through its [`Sealer`] or
/// [`Opener`]. Every declared field must be mapped exactly once.
#[derive(Debug, Default)]
struct Mapped(RefCell<HashSet<&'static str>>);

impl Mapped {
    fn mark(&self, field: &'static str) -> Result<()> {
        if !self.0.borrow_mut().insert(field) {
            return Err(mapping_mismatch("was mapped more than once", field));
        }
        Ok(())
    }

    /// Fails at the first declared field, in declaration order, that was
    /// never mapped.
    fn ensure_complete(&self, shape: &ResolvedShape) -> Result<()> {
        let mapped = self.0.borrow();
        match shape.open.fields().iter().find(|f| !mapped.contains(f.name)) {
            Some(unmapped) => Err(mapping_mismatch("was never mapped", unmapped.name)),
            None => Ok(()),
        }
    }
}

/// Check that a pass-through mapping call matches the policy.
fn expect_pass(shape: &ResolvedShape, mapped: &Mapped, field: &'static str) -> Result<()> {
    declared(shape, field)?;
    if shape.policy.is_sensitive(field) {
        return Err(mapping_mismatch("is sensitive but was passed through", field));
    }
    mapped.mark(field)
}

/// Check that a sensitive mapping call matches the policy and the declared
/// Open type.
fn expect_sensitive(
    shape: &ResolvedShape,
    mapped: &Mapped,
    field: &'static str,
    ty: FieldType,
) -> Result<()> {
    let declared = declared(shape, field)?;
    if !shape.policy.is_sensitive(field) {
        return Err(mapping_mismatch("is pass-through but was transformed", field));
    }
    if declared != ty {
        return Err(Error::new(ErrorKind::ShapeMismatch(format!(
            "declared as {declared:?} but mapped as {ty:?}"
        )))
        .at_field(field));
    }
    mapped.mark(field)
}

fn declared(shape: &ResolvedShape, field: &'static str) -> Result<FieldType> {
    shape.open_type(field).ok_or_else(|| {
        Error::new(ErrorKind::ShapeMismatch(format!(
            "not declared by {}",
            shape.open.name()
        )))
        .at_field(field)
    })
}

fn mapping_mismatch(detail: &str, field: &'static str) -> Error {
    Error::new(ErrorKind::ShapeMismatch(format!("field {detail}"))).at_field(field)
}
