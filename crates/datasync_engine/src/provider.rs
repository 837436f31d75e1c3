//! Data providers for the two sides of a synchronization.

use crate::error::{Side, SyncResult};
use crate::keyed::{DuplicateKeyPolicy, KeyedCollection};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

type FetchFn<V> = Arc<dyn Fn() -> SyncResult<Vec<V>> + Send + Sync>;
type KeyFn<K, V> = Arc<dyn Fn(&V) -> K + Send + Sync>;

/// Binds a fetch operation to a key extraction function.
///
/// Both functions are fixed at construction. Cloning is cheap and shares them.
pub struct SynchronizationDataProvider<K, V> {
    fetch: FetchFn<V>,
    key_fn: KeyFn<K, V>,
}

impl<K, V> SynchronizationDataProvider<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates a provider from a fetch operation and a key extractor.
    pub fn new<F, E>(fetch: F, key_fn: E) -> Self
    where
        F: Fn() -> SyncResult<Vec<V>> + Send + Sync + 'static,
        E: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self {
            fetch: Arc::new(fetch),
            key_fn: Arc::new(key_fn),
        }
    }

    /// Creates a provider over a fixed set of items.
    pub fn from_items<E>(items: Vec<V>, key_fn: E) -> Self
    where
        V: Clone + Send + Sync + 'static,
        E: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self::new(move || Ok(items.clone()), key_fn)
    }

    /// Fetches the raw items.
    pub fn fetch(&self) -> SyncResult<Vec<V>> {
        (self.fetch)()
    }

    /// Computes the key of an item.
    pub fn key_of(&self, item: &V) -> K {
        (self.key_fn)(item)
    }

    /// Fetches the items and indexes them by key.
    ///
    /// Fetch failures are returned as produced by the fetch operation.
    pub fn fetch_keyed(
        &self,
        side: Side,
        policy: DuplicateKeyPolicy,
    ) -> SyncResult<KeyedCollection<K, V>> {
        let items = self.fetch()?;
        KeyedCollection::build(side, items, |item| self.key_of(item), policy)
    }
}

impl<K, V> Clone for SynchronizationDataProvider<K, V> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            key_fn: Arc::clone(&self.key_fn),
        }
    }
}

impl<K, V> fmt::Debug for SynchronizationDataProvider<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizationDataProvider").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    #[test]
    fn fetch_keyed_indexes_items() {
        let provider =
            SynchronizationDataProvider::from_items(vec!["alice", "bob"], |name: &&str| name.len());
        let keyed = provider
            .fetch_keyed(Side::Source, DuplicateKeyPolicy::LastWins)
            .unwrap();
        assert_eq!(keyed.get(&5), Some(&"alice"));
        assert_eq!(keyed.get(&3), Some(&"bob"));
    }

    #[test]
    fn fetch_failure_is_passed_through() {
        let provider: SynchronizationDataProvider<u32, u32> = SynchronizationDataProvider::new(
            || Err(SyncError::data_retrieval(Side::Destination, "timeout")),
            |item| *item,
        );
        let err = provider
            .fetch_keyed(Side::Destination, DuplicateKeyPolicy::LastWins)
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::DataRetrieval {
                side: Side::Destination,
                ..
            }
        ));
    }
}
