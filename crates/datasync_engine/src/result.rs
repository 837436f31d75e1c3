//! Outcome types of a synchronization pass.

use crate::error::SyncError;
use crate::keyed::KeyedCollection;
use std::hash::Hash;
use std::time::Duration;
use uuid::Uuid;

/// The delta computed by one diff pass.
///
/// Entries of all three maps follow the source iteration order, with
/// removal-only keys in destination iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SynchronizationResult<K, V> {
    to_add: KeyedCollection<K, V>,
    to_remove: KeyedCollection<K, V>,
    modified: KeyedCollection<K, V>,
}

impl<K, V> SynchronizationResult<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a result from the three delta maps.
    pub fn new(
        to_add: KeyedCollection<K, V>,
        to_remove: KeyedCollection<K, V>,
        modified: KeyedCollection<K, V>,
    ) -> Self {
        Self {
            to_add,
            to_remove,
            modified,
        }
    }

    /// Creates a result with no changes.
    pub fn empty() -> Self {
        Self::new(KeyedCollection::new(), KeyedCollection::new(), KeyedCollection::new())
    }
}

impl<K, V> SynchronizationResult<K, V> {
    /// Source items whose keys are missing from the destination.
    pub fn to_add(&self) -> &KeyedCollection<K, V> {
        &self.to_add
    }

    /// Destination items whose keys are missing from the source.
    pub fn to_remove(&self) -> &KeyedCollection<K, V> {
        &self.to_remove
    }

    /// Merged (or source) items for keys present on both sides with differing values.
    pub fn modified(&self) -> &KeyedCollection<K, V> {
        &self.modified
    }

    /// Returns true if any of the delta maps is non-empty.
    pub fn has_changes(&self) -> bool {
        !(self.to_add.is_empty() && self.to_remove.is_empty() && self.modified.is_empty())
    }

    /// Total number of entries across the delta maps.
    pub fn change_count(&self) -> usize {
        self.to_add.len() + self.to_remove.len() + self.modified.len()
    }

    /// Splits the result into `(to_add, to_remove, modified)`.
    pub fn into_parts(
        self,
    ) -> (
        KeyedCollection<K, V>,
        KeyedCollection<K, V>,
        KeyedCollection<K, V>,
    ) {
        (self.to_add, self.to_remove, self.modified)
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome<K, V> {
    /// Diff succeeded and the save either succeeded or was skipped.
    Completed(SynchronizationResult<K, V>),
    /// A fetch, diff or save stage failed.
    Failed(SyncError),
    /// No configuration is registered under the requested name.
    UnknownConfiguration,
}

/// Terminal outcome of one run, as handed back to the caller.
#[derive(Debug)]
pub struct SynchronizationResultState<K, V> {
    name: String,
    run_id: Uuid,
    duration: Duration,
    outcome: RunOutcome<K, V>,
}

impl<K, V> SynchronizationResultState<K, V> {
    pub(crate) fn new(
        name: impl Into<String>,
        run_id: Uuid,
        duration: Duration,
        outcome: RunOutcome<K, V>,
    ) -> Self {
        Self {
            name: name.into(),
            run_id,
            duration,
            outcome,
        }
    }

    /// Name of the configuration that was requested.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the run, as passed to the save callback.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Wall-clock time spent on the run.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The computed delta, if the run succeeded.
    pub fn result(&self) -> Option<&SynchronizationResult<K, V>> {
        match &self.outcome {
            RunOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// The failure, if the run failed.
    pub fn error(&self) -> Option<&SyncError> {
        match &self.outcome {
            RunOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if the run failed. This is the only failure signal.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Failed(_))
    }

    /// Returns true if the requested name was not registered.
    pub fn is_unknown_configuration(&self) -> bool {
        matches!(self.outcome, RunOutcome::UnknownConfiguration)
    }

    /// Borrows the outcome.
    pub fn outcome(&self) -> &RunOutcome<K, V> {
        &self.outcome
    }

    /// Consumes the state, returning the outcome.
    pub fn into_outcome(self) -> RunOutcome<K, V> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(add: &[(u32, &'static str)]) -> SynchronizationResult<u32, &'static str> {
        SynchronizationResult::new(
            add.iter().copied().collect(),
            KeyedCollection::new(),
            KeyedCollection::new(),
        )
    }

    #[test]
    fn empty_result_has_no_changes() {
        let result: SynchronizationResult<u32, u32> = SynchronizationResult::empty();
        assert!(!result.has_changes());
        assert_eq!(result.change_count(), 0);
    }

    #[test]
    fn any_map_counts_as_change() {
        let result = result_with(&[(1, "a"), (2, "b")]);
        assert!(result.has_changes());
        assert_eq!(result.change_count(), 2);

        let removal = SynchronizationResult::new(
            KeyedCollection::new(),
            [(9u32, "z")].into_iter().collect(),
            KeyedCollection::new(),
        );
        assert!(removal.has_changes());
    }

    #[test]
    fn state_accessors_are_exclusive() {
        let ok = SynchronizationResultState::new(
            "users",
            Uuid::new_v4(),
            Duration::ZERO,
            RunOutcome::Completed(result_with(&[(1, "a")])),
        );
        assert!(ok.result().is_some());
        assert!(ok.error().is_none());
        assert!(!ok.is_failed());

        let failed: SynchronizationResultState<u32, &str> = SynchronizationResultState::new(
            "users",
            Uuid::new_v4(),
            Duration::ZERO,
            RunOutcome::Failed(SyncError::save("disk full")),
        );
        assert!(failed.result().is_none());
        assert!(failed.error().is_some());
        assert!(failed.is_failed());

        let unknown: SynchronizationResultState<u32, &str> = SynchronizationResultState::new(
            "nope",
            Uuid::new_v4(),
            Duration::ZERO,
            RunOutcome::UnknownConfiguration,
        );
        assert!(unknown.result().is_none());
        assert!(unknown.error().is_none());
        assert!(!unknown.is_failed());
        assert!(unknown.is_unknown_configuration());
    }
}
