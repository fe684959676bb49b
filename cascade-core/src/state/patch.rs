//! Patches
//!
//! A patch is the partial state change handed to one update call. It is
//! either a literal set of values or a function of the state as it was
//! before the update.

use indexmap::IndexMap;

use super::store::State;
use super::Key;

type DeriveFn<'p, K, V> = Box<dyn FnOnce(&State<'_, K, V>) -> IndexMap<K, V> + 'p>;

/// Partial change applied by [`Engine::update`](super::Engine::update).
///
/// Repeated keys keep their first position and their last value.
pub enum Patch<'p, K, V> {
    /// Literal values; may be empty.
    Values(IndexMap<K, V>),

    /// Values computed from the pre-update state.
    Derive(DeriveFn<'p, K, V>),
}

impl<'p, K: Key, V> Patch<'p, K, V> {
    /// A patch that changes nothing.
    pub fn empty() -> Self {
        Self::Values(IndexMap::new())
    }

    pub fn values(values: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Values(values.into_iter().collect())
    }

    /// A patch computed against the state as it stands before the update.
    pub fn derive<F>(f: F) -> Self
    where
        F: FnOnce(&State<'_, K, V>) -> IndexMap<K, V> + 'p,
    {
        Self::Derive(Box::new(f))
    }

    /// Resolve into concrete values against the pre-update state.
    pub(crate) fn resolve(self, current: &State<'_, K, V>) -> IndexMap<K, V> {
        match self {
            Self::Values(values) => values,
            Self::Derive(derive) => derive(current),
        }
    }
}

impl<K: Key, V> Default for Patch<'_, K, V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V> std::fmt::Debug for Patch<'_, K, V>
where
    K: Key,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Values(values) => f.debug_tuple("Values").field(values).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

impl<K: Key, V> From<IndexMap<K, V>> for Patch<'_, K, V> {
    fn from(values: IndexMap<K, V>) -> Self {
        Self::Values(values)
    }
}

impl<K: Key, V> From<Vec<(K, V)>> for Patch<'_, K, V> {
    fn from(values: Vec<(K, V)>) -> Self {
        Self::values(values)
    }
}

impl<K: Key, V, const N: usize> From<[(K, V); N]> for Patch<'_, K, V> {
    fn from(values: [(K, V); N]) -> Self {
        Self::values(values)
    }
}

impl<'p, K: Key, V> From<Option<Patch<'p, K, V>>> for Patch<'p, K, V> {
    fn from(patch: Option<Patch<'p, K, V>>) -> Self {
        patch.unwrap_or_default()
    }
}

impl<K: Key, V> From<()> for Patch<'_, K, V> {
    fn from((): ()) -> Self {
        Self::empty()
    }
}
