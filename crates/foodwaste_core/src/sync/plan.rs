//! Set difference keyed by target identifier.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// Outcome of diffing a desired set against stored rows.
#[derive(Debug)]
pub struct Plan<D, E> {
    /// Desired entries with no stored row.
    pub inserts: Vec<D>,
    /// Desired entries whose stored row differs, with that row.
    pub updates: Vec<(D, E)>,
    /// Stored rows with no desired entry, including duplicate rows.
    pub deletes: Vec<E>,
    /// Number of desired entries whose stored row already matches.
    pub unchanged: usize,
    /// Number of desired entries dropped because their key repeated.
    pub duplicates: usize,
}

/// Diffs `desired` against `existing` by key.
///
/// The first desired entry for a key wins; later ones are dropped with a
/// warning. When several stored rows share a key the first is matched and
/// the others are scheduled for deletion. Stored rows are deleted in the
/// order they were given.
pub fn plan<K, D, E>(
    desired: impl IntoIterator<Item = (K, D)>,
    existing: impl IntoIterator<Item = (K, E)>,
    same: impl Fn(&D, &E) -> bool,
) -> Plan<D, E>
where
    K: Ord + Copy + fmt::Debug,
{
    let mut slots: Vec<Option<E>> = Vec::new();
    let mut index: BTreeMap<K, usize> = BTreeMap::new();
    let mut extra = Vec::new();
    for (key, row) in existing {
        if index.contains_key(&key) {
            extra.push(row);
        } else {
            index.insert(key, slots.len());
            slots.push(Some(row));
        }
    }

    let mut result = Plan {
        inserts: Vec::new(),
        updates: Vec::new(),
        deletes: Vec::new(),
        unchanged: 0,
        duplicates: 0,
    };
    let mut seen = BTreeSet::new();
    for (key, entry) in desired {
        if !seen.insert(key) {
            warn!(key = ?key, "duplicate relation target ignored");
            result.duplicates += 1;
            continue;
        }
        match index.get(&key).and_then(|&i| slots[i].take()) {
            Some(row) if same(&entry, &row) => result.unchanged += 1,
            Some(row) => result.updates.push((entry, row)),
            None => result.inserts.push(entry),
        }
    }
    result.deletes = slots.into_iter().flatten().chain(extra).collect();
    result
}
