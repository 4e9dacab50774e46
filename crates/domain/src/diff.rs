//! Name-set difference used to apply structural updates.

use std::collections::BTreeSet;

/// Result of comparing a fresh name set against the cached one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDiff {
    /// In the fresh set only.
    pub added: Vec<String>,
    /// In the cached set only.
    pub removed: Vec<String>,
    /// In both sets.
    pub remaining: Vec<String>,
}

impl NameDiff {
    /// Compare `fresh` names against `cached` names.
    ///
    /// Output vectors are sorted and free of duplicates.
    pub fn compute<'a, F, C>(fresh: F, cached: C) -> Self
    where
        F: IntoIterator<Item = &'a str>,
        C: IntoIterator<Item = &'a str>,
    {
        let fresh: BTreeSet<&str> = fresh.into_iter().collect();
        let cached: BTreeSet<&str> = cached.into_iter().collect();

        Self {
            added: fresh.difference(&cached).map(|s| (*s).to_string()).collect(),
            removed: cached.difference(&fresh).map(|s| (*s).to_string()).collect(),
            remaining: fresh.intersection(&cached).map(|s| (*s).to_string()).collect(),
        }
    }
}
