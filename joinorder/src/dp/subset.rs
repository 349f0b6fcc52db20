use std::fmt::{Debug, Formatter};

use derive_more::{BitAnd, BitOr};

use crate::query::RelationId;

/// Canonical key of a set of relations.
///
/// Bit `i` is set when relation `i` is a member. Two sets with the same members always have the
/// same key, whatever order they were assembled in.
#[derive(Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, BitOr, BitAnd)]
pub struct RelationSet(u64);

impl RelationSet {
    /// Max number of relations a set can hold.
    pub const CAPACITY: usize = u64::BITS as usize;

    pub fn empty() -> Self {
        RelationSet(0)
    }

    pub fn singleton(id: RelationId) -> Self {
        debug_assert!(id < Self::CAPACITY);
        RelationSet(1 << id)
    }

    /// Set containing relations `0..count`.
    pub fn full(count: usize) -> Self {
        debug_assert!(count <= Self::CAPACITY);
        if count == Self::CAPACITY {
            RelationSet(u64::MAX)
        } else {
            RelationSet((1u64 << count) - 1)
        }
    }

    pub fn with(self, id: RelationId) -> Self {
        self | Self::singleton(id)
    }

    pub fn contains(self, id: RelationId) -> bool {
        id < Self::CAPACITY && self.0 & (1 << id) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_subset_of(self, other: RelationSet) -> bool {
        self & other == self
    }

    /// Members in ascending id order.
    pub fn iter(self) -> RelationSetIter {
        RelationSetIter(self.0)
    }
}

impl FromIterator<RelationId> for RelationSet {
    fn from_iter<I: IntoIterator<Item = RelationId>>(iter: I) -> Self {
        iter.into_iter().fold(RelationSet::empty(), RelationSet::with)
    }
}

impl Debug for RelationSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub struct RelationSetIter(u64);

impl Iterator for RelationSetIter {
    type Item = RelationId;

    fn next(&mut self) -> Option<RelationId> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros() as RelationId;
        // Clear lowest set bit.
        self.0 &= self.0 - 1;
        Some(id)
    }
}
