//! Insertion-ordered key/value map.
//!
//! Property cases, event binds and emitter listeners are all applied in the
//! order they were registered. [`OrderedMap`] wraps an [`IndexMap`] and
//! exposes only the operations that keep that order meaningful: inserting an
//! existing key keeps its original slot, and removal shifts later entries
//! down instead of swapping the last entry into the hole.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

// ---------------------------------------------------------------------------
// OrderedMap
// ---------------------------------------------------------------------------

/// A key/value map that iterates in insertion order.
#[derive(Clone, PartialEq)]
pub struct OrderedMap<K: Hash + Eq, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert or replace a value.
    ///
    /// Replacing keeps the key at its original position. Returns the
    /// previous value, if any.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Look up a value by key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Mutable lookup by key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key)
    }

    /// Whether the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Remove a key, preserving the relative order of the remaining entries.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.shift_remove(key)
    }

    /// Position of a key in iteration order.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_index_of(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Mutable values in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Remove every entry, yielding them in insertion order.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.drain(..)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Hash + Eq, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Hash + Eq, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedMap<String, i32> {
        let mut map = OrderedMap::new();
        map.set("c".to_owned(), 3);
        map.set("a".to_owned(), 1);
        map.set("b".to_owned(), 2);
        map
    }

    #[test]
    fn iterates_in_insertion_order() {
        let map = sample();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn replacing_keeps_position() {
        let mut map = sample();
        let previous = map.set("c".to_owned(), 30);
        assert_eq!(previous, Some(3));
        assert_eq!(map.position("c"), Some(0));
        assert_eq!(map.get("c"), Some(&30));
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut map = sample();
        assert_eq!(map.remove("c"), Some(3));
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn remove_missing_is_none() {
        let mut map = sample();
        assert_eq!(map.remove("zzz"), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut map = sample();
        let drained: Vec<i32> = map.drain().map(|(_, v)| v).collect();
        assert_eq!(drained, vec![3, 1, 2]);
        assert!(map.is_empty());
    }

    #[test]
    fn collect_from_iterator() {
        let map: OrderedMap<&str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key("y"));
    }
}
