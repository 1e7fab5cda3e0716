//! Property-based test generators using proptest.

use chrono::{DateTime, Utc};
use foodwaste_core::{Membership, ProxyId, TemperatureRange};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for generating identifiers.
pub fn proxy_id_strategy() -> impl Strategy<Value = ProxyId> {
    prop::array::uniform16(any::<u8>()).prop_map(ProxyId::from_bytes)
}

/// Strategy for generating culture names such as `da-DK`.
pub fn culture_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{2}-[A-Z]{2}").expect("Invalid regex")
}

/// Strategy for generating translated texts, quotes included.
pub fn translation_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ',.]{0,40}").expect("Invalid regex")
}

/// Strategy for generating times between 1970 and 2100, sub-second part
/// included.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap_or_default())
}

/// Strategy for generating membership levels.
pub fn membership_strategy() -> impl Strategy<Value = Membership> {
    prop_oneof![
        Just(Membership::Basic),
        Just(Membership::Deluxe),
        Just(Membership::Premium),
    ]
}

/// Strategy for generating non-empty temperature ranges.
pub fn temperature_range_strategy() -> impl Strategy<Value = TemperatureRange> {
    (-30i32..10, 0i32..30).prop_map(|(start, width)| TemperatureRange::new(start, start + width))
}

/// Strategy for generating the type names a foreign key applies to.
pub fn key_types_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("[A-Z][A-Za-z]{0,11}").expect("Invalid regex"),
        1..4,
    )
}

/// A selection of groups from a pool of `pool` groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSelection {
    /// Index of the primary group.
    pub primary: usize,
    /// Indexes of the other groups, never containing `primary`.
    pub others: BTreeSet<usize>,
}

impl GroupSelection {
    /// Every selected index, primary first.
    pub fn all(&self) -> Vec<usize> {
        std::iter::once(self.primary)
            .chain(self.others.iter().copied())
            .collect()
    }
}

/// Strategy for generating a primary group plus other groups from a pool.
pub fn group_selection_strategy(pool: usize) -> impl Strategy<Value = GroupSelection> {
    assert!(pool > 0, "pool must not be empty");
    (0..pool, prop::collection::btree_set(0..pool, 0..pool)).prop_map(|(primary, mut others)| {
        others.remove(&primary);
        GroupSelection { primary, others }
    })
}
