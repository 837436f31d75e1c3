//! The diff engine.
//!
//! A pure function over two keyed collections. Equality is delegated to the
//! comparator and conflicts to the optional merge function; the engine itself
//! never fails.

use crate::keyed::KeyedCollection;
use crate::result::SynchronizationResult;
use std::hash::Hash;
use std::sync::Arc;

/// Value equality used for keys present on both sides.
pub type Comparator<V> = Arc<dyn Fn(&V, &V) -> bool + Send + Sync>;

/// Conflict resolution: `(destination, source) -> merged`.
pub type MergeFn<V> = Arc<dyn Fn(&V, &V) -> V + Send + Sync>;

/// Computes the delta that brings `destination` in line with `source`.
///
/// Keys only in the source go to `to_add`, keys only in the destination go
/// to `to_remove`. Keys on both sides whose items differ per `comparator`
/// go to `modified`, holding `merge(destination, source)` when a merge
/// function is given and the source item otherwise.
pub fn diff<K, V>(
    source: &KeyedCollection<K, V>,
    destination: &KeyedCollection<K, V>,
    comparator: &dyn Fn(&V, &V) -> bool,
    merge: Option<&dyn Fn(&V, &V) -> V>,
) -> SynchronizationResult<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    let mut to_add = KeyedCollection::new();
    let mut to_remove = KeyedCollection::new();
    let mut modified = KeyedCollection::new();

    for (key, source_item) in source.iter() {
        match destination.get(key) {
            None => {
                to_add.insert(key.clone(), source_item.clone());
            }
            Some(destination_item) => {
                if comparator(source_item, destination_item) {
                    continue;
                }
                let item = match merge {
                    Some(merge) => merge(destination_item, source_item),
                    None => source_item.clone(),
                };
                modified.insert(key.clone(), item);
            }
        }
    }

    for (key, destination_item) in destination.iter() {
        if !source.contains_key(key) {
            to_remove.insert(key.clone(), destination_item.clone());
        }
    }

    SynchronizationResult::new(to_add, to_remove, modified)
}
