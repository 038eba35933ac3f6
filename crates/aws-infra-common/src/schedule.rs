//! Storage-class transition schedule
//!
//! Builds the lifecycle timeline that moves newly written objects into
//! progressively colder storage classes.

use crate::storage_class::StorageClass;
use serde::Serialize;

/// A single `(storage class, day offset)` step of a lifecycle rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TierTransition {
    pub storage_class: StorageClass,
    pub transition_in_days: u64,
}

/// Compute the transition schedule for an ordered tier sequence.
///
/// The tier at index `i` is entered `unit_days * i` days after creation, so
/// the first tier applies immediately and each later tier follows after one
/// more unit. An empty sequence yields an empty schedule.
pub fn transition_schedule(tiers: &[StorageClass], unit_days: u32) -> Vec<TierTransition> {
    tiers
        .iter()
        .enumerate()
        .map(|(index, &storage_class)| TierTransition {
            storage_class,
            transition_in_days: u64::from(unit_days) * index as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_glacier_then_deep_archive() {
        let schedule =
            transition_schedule(&[StorageClass::Glacier, StorageClass::DeepArchive], 90);
        assert_eq!(
            schedule,
            vec![
                TierTransition {
                    storage_class: StorageClass::Glacier,
                    transition_in_days: 0,
                },
                TierTransition {
                    storage_class: StorageClass::DeepArchive,
                    transition_in_days: 90,
                },
            ]
        );
    }

    #[test]
    fn test_empty_sequence() {
        assert!(transition_schedule(&[], 90).is_empty());
    }

    #[test]
    fn test_single_tier_is_immediate() {
        let schedule = transition_schedule(&[StorageClass::DeepArchive], 30);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].transition_in_days, 0);
    }

    #[test]
    fn test_zero_unit_keeps_every_offset_at_zero() {
        let schedule = transition_schedule(
            &[StorageClass::StandardIa, StorageClass::Glacier, StorageClass::DeepArchive],
            0,
        );
        assert!(schedule.iter().all(|t| t.transition_in_days == 0));
    }

    fn tier() -> impl Strategy<Value = StorageClass> {
        prop_oneof![
            Just(StorageClass::StandardIa),
            Just(StorageClass::GlacierIr),
            Just(StorageClass::Glacier),
            Just(StorageClass::DeepArchive),
        ]
    }

    proptest! {
        #[test]
        fn prop_offsets_are_multiples_of_unit(
            tiers in proptest::collection::vec(tier(), 0..12),
            unit in 0u32..10_000,
        ) {
            let schedule = transition_schedule(&tiers, unit);
            prop_assert_eq!(schedule.len(), tiers.len());
            for (i, step) in schedule.iter().enumerate() {
                prop_assert_eq!(step.storage_class, tiers[i]);
                prop_assert_eq!(step.transition_in_days, u64::from(unit) * i as u64);
            }
            prop_assert!(schedule
                .windows(2)
                .all(|w| w[0].transition_in_days <= w[1].transition_in_days));
        }
    }
}
