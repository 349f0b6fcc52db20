//! Materializing an optimized join order.
//!
//! [`RenderedPlan`] is the structured result consumed by executors; its `Display` impl writes
//! the equivalent `SELECT .. FROM .. WHERE ..` text.

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::dp::JoinPlan;
use crate::query::{JoinPredicate, QuerySpec};

pub mod explain;

/// Projected columns, tables in join order and predicates in the order they were applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPlan {
    columns: Vec<String>,
    tables: Vec<String>,
    predicates: Vec<JoinPredicate>,
}

impl RenderedPlan {
    /// Performs no optimization of its own, the order recorded in `plan` is kept as is.
    pub fn new(query: &QuerySpec, plan: &JoinPlan) -> Self {
        let (tables, predicates) = match plan {
            JoinPlan::Empty => (vec![], vec![]),
            JoinPlan::Joined(fragment) => (
                fragment
                    .join_order()
                    .map(|id| query.relation(id).name().to_string())
                    .collect(),
                fragment
                    .predicates_applied()
                    .map(|id| query.predicate(id).clone())
                    .collect(),
            ),
        };

        Self {
            columns: query.projected_columns().to_vec(),
            tables,
            predicates,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn predicates(&self) -> &[JoinPredicate] {
        &self.predicates
    }
}

impl Display for RenderedPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.columns.is_empty() {
            write!(f, "SELECT *")?;
        } else {
            write!(f, "SELECT {}", self.columns.iter().join(", "))?;
        }
        if !self.tables.is_empty() {
            write!(f, " FROM {}", self.tables.iter().join(", "))?;
        }
        if !self.predicates.is_empty() {
            write!(f, " WHERE {}", self.predicates.iter().join(" AND "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dp::{DpOptimizer, JoinPlan};
    use crate::optimizer::{JoinOrderOptimizer, OptimizerConfig};
    use crate::plan::RenderedPlan;
    use crate::query::QuerySpec;

    fn render(query: &QuerySpec) -> String {
        let plan = DpOptimizer::new(OptimizerConfig::default())
            .unwrap()
            .optimize(query)
            .unwrap();
        RenderedPlan::new(query, &plan).to_string()
    }

    #[test]
    fn test_render_join_order() {
        let query = QuerySpec::builder()
            .columns(vec!["column1", "column2"])
            .relation("table1", 1000)
            .relation("table2", 500)
            .relation("table3", 2000)
            .predicate("table1.column1", "table2.column1")
            .predicate("table2.column2", "table3.column2")
            .build()
            .unwrap();

        assert_eq!(
            "SELECT column1, column2 FROM table2, table1, table3 \
             WHERE table1.column1 = table2.column1 AND table2.column2 = table3.column2",
            render(&query)
        );
    }

    #[test]
    fn test_render_single_elements() {
        let query = QuerySpec::builder()
            .column("c")
            .relation("t", 1)
            .build()
            .unwrap();
        assert_eq!("SELECT c FROM t", render(&query));
    }

    #[test]
    fn test_render_cartesian() {
        let query = QuerySpec::builder()
            .columns(vec!["a.x", "b.y"])
            .relation("a", 2)
            .relation("b", 1)
            .build()
            .unwrap();
        assert_eq!("SELECT a.x, b.y FROM b, a", render(&query));
    }

    #[test]
    fn test_render_empty_plan() {
        let query = QuerySpec::builder().build().unwrap();
        let rendered = RenderedPlan::new(&query, &JoinPlan::Empty);
        assert!(rendered.tables().is_empty());
        assert_eq!("SELECT *", rendered.to_string());
    }
}
