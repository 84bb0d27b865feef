//! In-memory cache of validated shape pairs and their policies, keyed by
//! record type.
//!
//! Entries are resolved on the first transform of a type and never change
//! afterwards. The cache uses `arc-swap` for lock-free reads on the hot path.

use std::{any::TypeId, collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use common::Error;
use tracing::debug;

use super::resolver::{resolve_policy, FieldPolicy};
use super::{validate, FieldType, Shape};
use crate::record::{Record, SealedRecord};

/// A validated shape pair together with the policy of its Open shape.
#[derive(Debug, Clone)]
pub struct ResolvedShape {
    pub open: Shape,
    pub sealed: Shape,
    pub policy: FieldPolicy,
}

impl ResolvedShape {
    /// The Open type of `field`, if the Open shape declares it.
    pub fn open_type(&self, field: &str) -> Option<FieldType> {
        self.open.field(field).map(|f| f.ty)
    }
}

/// Shared, lock-free cache of resolved shapes keyed by the Open record type.
///
/// Internally backed by [`ArcSwap`] so readers never block; a miss resolves
/// the type and atomically swaps in a copy of the map with the new entry.
#[derive(Clone, Debug)]
pub struct PolicyCache {
    inner: Arc<ArcSwap<HashMap<TypeId, Arc<ResolvedShape>>>>,
}

impl PolicyCache {
    /// Create a new, empty [`PolicyCache`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Return the number of record types currently cached.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if no record types are cached.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Look up the resolved shape pair of `R`, validating and caching it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns [`common::ErrorKind::ShapeMismatch`] if the shapes of `R` and
    /// `R::Sealed` do not validate. Failed types are not cached.
    pub fn resolve<R: Record>(&self) -> Result<Arc<ResolvedShape>, Error> {
        let id = TypeId::of::<R>();
        if let Some(hit) = self.inner.load().get(&id) {
            return Ok(Arc::clone(hit));
        }

        let open = R::shape();
        let sealed = <R::Sealed as SealedRecord>::shape();
        let policy = resolve_policy(&open);
        validate(&open, &sealed, &policy)?;

        debug!(
            record = open.name(),
            sensitive_fields = policy.len(),
            "resolved record shape"
        );

        let entry = Arc::new(ResolvedShape {
            open,
            sealed,
            policy,
        });
        self.inner.rcu(|current| {
            let mut next = (**current).clone();
            next.entry(id).or_insert_with(|| Arc::clone(&entry));
            next
        });

        // A concurrent miss may have inserted first; hand out the stored entry.
        Ok(self.inner.load().get(&id).map(Arc::clone).unwrap_or(entry))
    }
}

impl Default for PolicyCache {
    fn default() -> Self {
        Self::new()
    }
}
