//! Synchronization definitions.

use crate::context::RunContext;
use crate::diff::{Comparator, MergeFn};
use crate::error::SyncResult;
use crate::keyed::DuplicateKeyPolicy;
use crate::provider::SynchronizationDataProvider;
use crate::result::SynchronizationResult;
use std::fmt;
use std::sync::Arc;

type SaveFn<K, V> =
    Arc<dyn Fn(&SynchronizationResult<K, V>, &RunContext) -> SyncResult<()> + Send + Sync>;

/// A named unit of synchronization.
///
/// Owns the source and destination providers, the comparator used for keys
/// present on both sides, an optional merge function and the save callback.
pub struct SynchronizationConfiguration<K, V> {
    name: String,
    source: SynchronizationDataProvider<K, V>,
    destination: SynchronizationDataProvider<K, V>,
    comparator: Comparator<V>,
    merge: Option<MergeFn<V>>,
    save: SaveFn<K, V>,
    duplicate_keys: DuplicateKeyPolicy,
}

impl<K, V> SynchronizationConfiguration<K, V> {
    /// Creates a configuration without merge support.
    ///
    /// Modified keys carry the source item unless a merge function is set
    /// with [`with_merge`](Self::with_merge).
    pub fn new<C, S>(
        name: impl Into<String>,
        source: SynchronizationDataProvider<K, V>,
        destination: SynchronizationDataProvider<K, V>,
        comparator: C,
        save: S,
    ) -> Self
    where
        C: Fn(&V, &V) -> bool + Send + Sync + 'static,
        S: Fn(&SynchronizationResult<K, V>, &RunContext) -> SyncResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            source,
            destination,
            comparator: Arc::new(comparator),
            merge: None,
            save: Arc::new(save),
            duplicate_keys: DuplicateKeyPolicy::default(),
        }
    }

    /// Enables merging with `merge(destination, source)`.
    pub fn with_merge<M>(mut self, merge: M) -> Self
    where
        M: Fn(&V, &V) -> V + Send + Sync + 'static,
    {
        self.merge = Some(Arc::new(merge));
        self
    }

    /// Sets how duplicate keys within one side are handled.
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }

    /// The unique name of this configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source provider.
    pub fn source(&self) -> &SynchronizationDataProvider<K, V> {
        &self.source
    }

    /// The destination provider.
    pub fn destination(&self) -> &SynchronizationDataProvider<K, V> {
        &self.destination
    }

    /// Returns true if a merge function is configured.
    pub fn is_merge_supported(&self) -> bool {
        self.merge.is_some()
    }

    /// The duplicate key policy applied to both sides.
    pub fn duplicate_keys(&self) -> DuplicateKeyPolicy {
        self.duplicate_keys
    }

    /// Compares two items.
    pub fn are_equal(&self, a: &V, b: &V) -> bool {
        (self.comparator)(a, b)
    }

    pub(crate) fn comparator(&self) -> &(dyn Fn(&V, &V) -> bool + Send + Sync) {
        self.comparator.as_ref()
    }

    pub(crate) fn merge_fn(&self) -> Option<&(dyn Fn(&V, &V) -> V + Send + Sync)> {
        self.merge.as_deref()
    }

    /// Persists a computed delta.
    pub fn save(&self, result: &SynchronizationResult<K, V>, context: &RunContext) -> SyncResult<()> {
        (self.save)(result, context)
    }
}

impl<K, V> fmt::Debug for SynchronizationConfiguration<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizationConfiguration")
            .field("name", &self.name)
            .field("merge_supported", &self.merge.is_some())
            .field("duplicate_keys", &self.duplicate_keys)
            .finish_non_exhaustive()
    }
}
