//! Insertion-ordered keyed collections.

use crate::error::{Side, SyncError, SyncResult};
use crate::result::SynchronizationResult;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// How a side that yields the same key twice is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeyPolicy {
    /// The later item replaces the earlier one, keeping its position.
    #[default]
    LastWins,
    /// The collection is rejected with [`SyncError::DuplicateKey`].
    Reject,
}

/// A key to item mapping that iterates in first-seen order.
///
/// Lookups go through a hash index; entries are stored in a vector so that
/// iteration order is the order in which keys were first inserted.
#[derive(Clone)]
pub struct KeyedCollection<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> KeyedCollection<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates an empty collection with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Builds a collection from raw items, computing each item's key.
    pub fn build<I, F>(side: Side, items: I, key_fn: F, policy: DuplicateKeyPolicy) -> SyncResult<Self>
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
        K: fmt::Debug,
    {
        let items = items.into_iter();
        let mut collection = Self::with_capacity(items.size_hint().0);
        for item in items {
            let key = key_fn(&item);
            if policy == DuplicateKeyPolicy::Reject && collection.contains_key(&key) {
                return Err(SyncError::DuplicateKey {
                    side,
                    key: format!("{:?}", key),
                });
            }
            collection.insert(key, item);
        }
        Ok(collection)
    }

    /// Inserts an item, returning the replaced item if the key was present.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes an item by key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(k) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, (key, _)) in self.entries.iter().enumerate() {
            self.index.insert(key.clone(), pos);
        }
    }

    /// Gets an item by key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Applies a synchronization delta to this collection.
    ///
    /// Removed keys are dropped, modified keys take the merged item in place
    /// and added keys are appended in delta order.
    pub fn apply(&mut self, result: &SynchronizationResult<K, V>)
    where
        V: Clone,
    {
        let removed = result.to_remove();
        if !removed.is_empty() {
            self.entries.retain(|(key, _)| !removed.contains_key(key));
            self.reindex();
        }
        for (key, item) in result.modified().iter().chain(result.to_add().iter()) {
            self.insert(key.clone(), item.clone());
        }
    }
}

impl<K, V> KeyedCollection<K, V> {
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over items in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Consumes the collection, returning its items in insertion order.
    pub fn into_values(self) -> Vec<V> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }
}

impl<K, V> Default for KeyedCollection<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for KeyedCollection<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for KeyedCollection<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for KeyedCollection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for KeyedCollection<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (key, value) in iter {
            collection.insert(key, value);
        }
        collection
    }
}

impl<K, V> IntoIterator for KeyedCollection<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
