//! Field policy resolution from shape descriptors.
//!
//! Given the Open [`Shape`] of a record, this module produces the map of
//! field names to their declared sensitivity tag.

use std::collections::HashMap;

use super::Shape;

/// Declared sensitivity per field name.
///
/// Untagged fields are absent and treated as pass-through by
/// [`FieldPolicy::is_sensitive`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPolicy(HashMap<&'static str, bool>);

impl FieldPolicy {
    /// Returns `true` if `field` was tagged sensitive.
    pub fn is_sensitive(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(false)
    }

    /// The declared tag of `field`, or `None` if it is untagged.
    pub fn get(&self, field: &str) -> Option<bool> {
        self.0.get(field).copied()
    }

    /// Number of tagged fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Collect the sensitivity tags of every field of `shape`.
pub fn resolve_policy(shape: &Shape) -> FieldPolicy {
    FieldPolicy(
        shape
            .fields()
            .iter()
            .filter_map(|field| field.sensitive.map(|flag| (field.name, flag)))
            .collect(),
    )
}
