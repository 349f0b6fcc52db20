use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use itertools::Itertools;
use log::trace;
use prettytable::{row, Table};

use crate::dp::{PlanFragment, RelationSet};

/// Fragments of one subset size, keyed and iterated by canonical subset key.
pub type Level = BTreeMap<RelationSet, PlanFragment>;

/// Dynamic programming table, one level per subset size.
///
/// Levels are committed whole and in size order; a level is never written after the next one
/// has been started.
#[derive(Default)]
pub struct DpTable {
    levels: Vec<Level>,
    /// Set when the step budget stopped enumeration before the full relation set was reached.
    truncated: bool,
}

impl DpTable {
    pub(super) fn commit(&mut self, level: Level) {
        debug_assert!(level
            .keys()
            .all(|key| key.len() == self.levels.len() + 1));
        self.levels.push(level);
    }

    pub(super) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub(super) fn last_level(&self) -> Option<&Level> {
        self.levels.last()
    }

    /// Fragments covering exactly `size` relations.
    pub fn level(&self, size: usize) -> Option<&Level> {
        size.checked_sub(1).and_then(|idx| self.levels.get(idx))
    }

    pub fn get(&self, key: RelationSet) -> Option<&PlanFragment> {
        self.level(key.len())?.get(&key)
    }

    /// Largest committed subset size.
    pub fn max_size(&self) -> usize {
        self.levels.len()
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelationSet, &PlanFragment)> {
        self.levels.iter().flat_map(|level| level.iter())
    }

    /// Cheapest fragment of the largest committed size, first in key order on ties.
    pub fn best_of_largest(&self) -> Option<&PlanFragment> {
        self.levels.last()?.values().fold(None, |best, fragment| match best {
            Some(b) if b.cost() <= fragment.cost() => Some(b),
            _ => Some(fragment),
        })
    }
}

/// Offers a candidate for its subset and returns whether it was kept.
///
/// A candidate whose last step is cartesian never replaces one attached through a predicate,
/// and is always replaced by one. Otherwise only a strictly cheaper candidate replaces the
/// entry, so ties keep the first candidate.
pub(super) fn offer(level: &mut Level, candidate: PlanFragment) -> bool {
    match level.entry(candidate.relations()) {
        Entry::Vacant(entry) => {
            entry.insert(candidate);
            true
        }
        Entry::Occupied(mut entry) => {
            let existing = entry.get();
            let replace = match (existing.ends_with_cartesian(), candidate.ends_with_cartesian()) {
                (false, true) => false,
                (true, false) => true,
                _ => existing.cost() > candidate.cost(),
            };
            if replace {
                trace!(
                    "Replacing fragment {:?} of cost {} with {:?} of cost {}",
                    existing.join_order().collect_vec(),
                    existing.cost(),
                    candidate.join_order().collect_vec(),
                    candidate.cost()
                );
                entry.insert(candidate);
            }
            replace
        }
    }
}

impl Debug for DpTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DpTable {{ truncated: {} }}", self.truncated)?;
        let mut table = Table::new();
        table.add_row(row!["Subset", "Join Order", "Predicates", "Cost"]);
        for (key, fragment) in self.iter() {
            table.add_row(row![
                format!("{:?}", key),
                format!("{:?}", fragment.join_order().collect_vec()),
                format!("{:?}", fragment.predicates_applied().collect_vec()),
                fragment.cost()
            ]);
        }
        writeln!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use crate::cost::CardinalityCostModel;
    use crate::dp::table::{offer, Level};
    use crate::dp::{DpTable, PlanFragment, RelationSet};
    use crate::graph::JoinGraph;
    use crate::query::QuerySpec;

    #[test]
    fn test_offer_keeps_first_on_tie() {
        let query = QuerySpec::builder()
            .relation("a", 10)
            .relation("b", 10)
            .predicate("a.x", "b.x")
            .build()
            .unwrap();
        let graph = JoinGraph::new(&query);
        let model = CardinalityCostModel::default();

        let a_then_b = PlanFragment::scan(&query, &model, 0).extend(&query, &graph, &model, 1);
        let b_then_a = PlanFragment::scan(&query, &model, 1).extend(&query, &graph, &model, 0);

        let mut level = Level::new();
        assert!(offer(&mut level, a_then_b.clone()));
        assert!(!offer(&mut level, b_then_a));
        assert_eq!(Some(&a_then_b), level.get(&RelationSet::full(2)));
    }

    #[test]
    fn test_offer_prefers_attached_step() {
        let query = QuerySpec::builder()
            .relation("a", 1)
            .relation("b", 1000)
            .relation("c", 1000)
            .predicate("b.x", "c.x")
            .build()
            .unwrap();
        let graph = JoinGraph::new(&query);
        let model = CardinalityCostModel::default();

        // a, b then c through b.x = c.x: 1 + 1 * 1000 + 1000 * 1000
        let attached = PlanFragment::scan(&query, &model, 0)
            .extend(&query, &graph, &model, 1)
            .extend(&query, &graph, &model, 2);
        // b, c then a as a cartesian step: 1000 + 1000 * 1000 + 2000 * 1
        let cartesian = PlanFragment::scan(&query, &model, 1)
            .extend(&query, &graph, &model, 2)
            .extend(&query, &graph, &model, 0);
        assert!(cartesian.ends_with_cartesian());

        let mut level = Level::new();
        assert!(offer(&mut level, cartesian));
        assert!(offer(&mut level, attached.clone()));
        assert_eq!(Some(&attached), level.get(&RelationSet::full(3)));
    }

    #[test]
    fn test_levels_by_size() {
        let query = QuerySpec::builder()
            .relation("a", 3)
            .relation("b", 5)
            .build()
            .unwrap();
        let model = CardinalityCostModel::default();

        let mut table = DpTable::default();
        let mut level = Level::new();
        offer(&mut level, PlanFragment::scan(&query, &model, 0));
        offer(&mut level, PlanFragment::scan(&query, &model, 1));
        table.commit(level);

        assert_eq!(1, table.max_size());
        assert_eq!(2, table.len());
        assert!(table.level(0).is_none());
        assert_eq!(
            Some(&PlanFragment::scan(&query, &model, 0)),
            table.best_of_largest()
        );
        assert!(table.get(RelationSet::singleton(1)).is_some());
    }
}
