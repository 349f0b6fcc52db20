//! Defines cost model.

use std::fmt::{Display, Formatter};

use crate::dp::PlanFragment;
use crate::query::{PredicateId, QuerySpec, Relation, RelationId};

mod cardinality;
pub use cardinality::*;

use derive_more::{Add, AddAssign, Sub, SubAssign, Sum};

#[derive(
    Copy, Clone, Debug, Default, PartialOrd, PartialEq, Add, Sub, Sum, AddAssign, SubAssign,
)]
pub struct Cost(f64);

impl Cost {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Cost {
    fn from(c: f64) -> Self {
        Cost(c)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Estimates cost of growing a plan fragment by one relation.
///
/// Implementations must return non-negative costs, which keeps fragment costs monotonically
/// non-decreasing as fragments grow.
pub trait CostModel: Send + Sync {
    /// Cost of reading a single relation, used to seed one-relation fragments.
    fn scan(&self, relation: &Relation) -> Cost {
        Cost::from(relation.estimated_rows() as f64)
    }

    /// Cost of joining `relation` onto `fragment` through `attached` predicates, without the
    /// fragment's own accumulated cost. `attached` is empty for a cartesian step.
    fn combine(
        &self,
        query: &QuerySpec,
        fragment: &PlanFragment,
        relation: RelationId,
        attached: &[PredicateId],
    ) -> Cost;
}
