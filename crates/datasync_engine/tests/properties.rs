//! Property-based tests for the diff engine.

use datasync_engine::{diff, KeyedCollection};
use proptest::prelude::*;
use std::collections::HashSet;

/// Strategy for a keyed dataset with small keys so that sides overlap.
fn dataset_strategy() -> impl Strategy<Value = KeyedCollection<u8, i16>> {
    prop::collection::vec((0u8..32, -4i16..4), 0..48)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn eq(a: &i16, b: &i16) -> bool {
    a == b
}

fn sum(destination: &i16, source: &i16) -> i16 {
    destination.saturating_add(*source)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn diff_is_deterministic(source in dataset_strategy(), destination in dataset_strategy()) {
        let first = diff(&source, &destination, &eq, Some(&sum));
        let second = diff(&source, &destination, &eq, Some(&sum));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn keys_are_partitioned(source in dataset_strategy(), destination in dataset_strategy()) {
        let result = diff(&source, &destination, &eq, None);

        for key in result.to_add().keys() {
            prop_assert!(source.contains_key(key));
            prop_assert!(!destination.contains_key(key));
        }
        for key in result.to_remove().keys() {
            prop_assert!(destination.contains_key(key));
            prop_assert!(!source.contains_key(key));
        }
        for (key, item) in result.modified().iter() {
            prop_assert_eq!(source.get(key), Some(item));
            prop_assert_ne!(destination.get(key), Some(item));
        }

        let mut seen = HashSet::new();
        let all = result
            .to_add()
            .keys()
            .chain(result.to_remove().keys())
            .chain(result.modified().keys());
        for key in all {
            prop_assert!(seen.insert(*key), "key {} in more than one map", key);
        }
    }

    #[test]
    fn self_diff_is_empty(data in dataset_strategy()) {
        let result = diff(&data, &data, &eq, None);
        prop_assert!(!result.has_changes());
    }

    #[test]
    fn applying_delta_converges(source in dataset_strategy(), destination in dataset_strategy()) {
        let result = diff(&source, &destination, &eq, None);
        let mut reconciled = destination.clone();
        reconciled.apply(&result);

        prop_assert_eq!(reconciled.len(), source.len());
        prop_assert!(!diff(&source, &reconciled, &eq, None).has_changes());
    }
}
