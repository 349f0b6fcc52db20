use crate::cost::{Cost, CostModel};
use crate::dp::PlanFragment;
use crate::query::{PredicateId, QuerySpec, RelationId};

/// Cardinality product cost model.
///
/// A join through predicates costs `anchor_rows * rows * selectivity^predicates`, where the
/// anchor is the smallest relation of the fragment that one of the predicates reaches. A
/// cartesian step costs the sum of the fragment's row counts times `rows`, which is never
/// cheaper than any anchored join of the same relation.
#[derive(Clone, Debug)]
pub struct CardinalityCostModel {
    selectivity: f64,
}

impl Default for CardinalityCostModel {
    fn default() -> Self {
        Self { selectivity: 1.0 }
    }
}

impl CardinalityCostModel {
    pub fn new(selectivity: f64) -> Self {
        Self { selectivity }
    }

    pub fn selectivity(&self) -> f64 {
        self.selectivity
    }
}

impl CostModel for CardinalityCostModel {
    fn combine(
        &self,
        query: &QuerySpec,
        fragment: &PlanFragment,
        relation: RelationId,
        attached: &[PredicateId],
    ) -> Cost {
        let rows = query.relation(relation).estimated_rows() as f64;

        if attached.is_empty() {
            let fragment_rows: f64 = fragment
                .relations()
                .iter()
                .map(|id| query.relation(id).estimated_rows() as f64)
                .sum();
            return Cost::from(fragment_rows * rows);
        }

        let anchor_rows = attached
            .iter()
            .map(|&predicate| {
                let (left, right) = query.predicate_ends(predicate);
                if left == relation {
                    right
                } else {
                    left
                }
            })
            .filter(|anchor| fragment.relations().contains(*anchor))
            .map(|anchor| query.relation(anchor).estimated_rows())
            .min()
            .unwrap_or_default() as f64;

        let reduction = self.selectivity.powi(attached.len() as i32);
        Cost::from(anchor_rows * rows * reduction)
    }
}
