//! Value Store
//!
//! The mutable half of an engine: one value slot per registered item,
//! indexed by [`ItemId`]. The key set is fixed when the store is created.

use indexmap::IndexSet;

use crate::graph::ItemId;

use super::Key;

/// Read-only view of the merged state.
///
/// Handed to round-count functions, prepass hooks, effects and derived
/// patches. Items declared without a value, and the root, read as `None`.
pub struct State<'a, K, V> {
    keys: &'a IndexSet<K>,
    values: &'a [Option<V>],
}

impl<K, V> Clone for State<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for State<'_, K, V> {}

impl<'a, K: Key, V> State<'a, K, V> {
    /// Current value of `key`.
    pub fn get(&self, key: &K) -> Option<&'a V> {
        let index = self.keys.get_index_of(key)?;
        self.values[index].as_ref()
    }

    /// Current value by dense id.
    pub fn get_by_id(&self, id: ItemId) -> Option<&'a V> {
        self.values.get(id.index())?.as_ref()
    }

    /// Whether `key` is registered (not whether it holds a value).
    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    /// Every registered key with its value, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a K, Option<&'a V>)> + 'a {
        let (keys, values) = (self.keys, self.values);
        keys.iter()
            .enumerate()
            .map(move |(index, key)| (key, values[index].as_ref()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Key, V: std::fmt::Debug> std::fmt::Debug for State<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Owned value slots plus the key index.
#[derive(Debug)]
pub(crate) struct Store<K, V> {
    keys: IndexSet<K>,
    values: Vec<Option<V>>,
}

impl<K: Key, V> Store<K, V> {
    /// `keys` and `values` must have the same length and order.
    pub(crate) fn new(keys: IndexSet<K>, values: Vec<Option<V>>) -> Self {
        debug_assert_eq!(keys.len(), values.len(), "one value slot per key");
        Self { keys, values }
    }

    pub(crate) fn view(&self) -> State<'_, K, V> {
        State {
            keys: &self.keys,
            values: &self.values,
        }
    }

    pub(crate) fn id_of(&self, key: &K) -> Option<ItemId> {
        self.keys.get_index_of(key).map(ItemId::new)
    }

    pub(crate) fn key(&self, id: ItemId) -> Option<&K> {
        self.keys.get_index(id.index())
    }

    pub(crate) fn write(&mut self, id: ItemId, value: V) {
        if let Some(slot) = self.values.get_mut(id.index()) {
            *slot = Some(value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store<&'static str, i32> {
        let keys: IndexSet<_> = ["root", "a", "b"].into_iter().collect();
        Store::new(keys, vec![None, Some(1), None])
    }

    #[test]
    fn view_reads_slots() {
        let store = store();
        let state = store.view();

        assert_eq!(state.get(&"a"), Some(&1));
        assert_eq!(state.get(&"b"), None);
        assert_eq!(state.get(&"missing"), None);
        assert!(state.contains(&"b"));
        assert!(!state.contains(&"missing"));
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn write_replaces_value() {
        let mut store = store();
        let id = store.id_of(&"b").unwrap();
        store.write(id, 7);

        assert_eq!(store.view().get(&"b"), Some(&7));
        assert_eq!(store.view().get_by_id(id), Some(&7));
        assert_eq!(store.key(id), Some(&"b"));
    }

    #[test]
    fn iter_follows_registration_order() {
        let store = store();
        let entries: Vec<_> = store.view().iter().collect();

        assert_eq!(entries, vec![(&"root", None), (&"a", Some(&1)), (&"b", None)]);
    }
}
