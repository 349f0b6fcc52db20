use itertools::Itertools;
use log::debug;

use crate::cost::{CardinalityCostModel, CostModel};
use crate::dp::{JoinPlan, PlanFragment};
use crate::error::OptResult;
use crate::graph::JoinGraph;
use crate::optimizer::{JoinOrderOptimizer, OptimizerConfig};
use crate::query::{QuerySpec, RelationId};

/// Joins relations in ascending order of estimated rows.
pub struct HeuristicOptimizer<C = CardinalityCostModel> {
    cost_model: C,
}

impl HeuristicOptimizer<CardinalityCostModel> {
    pub fn new(config: &OptimizerConfig) -> OptResult<Self> {
        config.validate()?;
        Ok(Self {
            cost_model: CardinalityCostModel::new(config.selectivity),
        })
    }
}

impl<C: CostModel> HeuristicOptimizer<C> {
    pub fn with_cost_model(cost_model: C) -> Self {
        Self { cost_model }
    }

    /// Relation ids by ascending row count, ties in declaration order.
    pub fn join_order(query: &QuerySpec) -> Vec<RelationId> {
        (0..query.relation_count())
            .sorted_by_key(|id| query.relation(*id).estimated_rows())
            .collect()
    }
}

impl<C: CostModel> JoinOrderOptimizer for HeuristicOptimizer<C> {
    fn optimize(&self, query: &QuerySpec) -> OptResult<JoinPlan> {
        let order = Self::join_order(query);
        let (first, rest) = match order.split_first() {
            Some(split) => split,
            None => return Ok(JoinPlan::Empty),
        };

        let graph = JoinGraph::new(query);
        let fragment = rest.iter().fold(
            PlanFragment::scan(query, &self.cost_model, *first),
            |fragment, relation| fragment.extend(query, &graph, &self.cost_model, *relation),
        );

        debug!(
            "Heuristic join order {:?} with cost {}",
            fragment.join_order().collect_vec(),
            fragment.cost()
        );
        Ok(JoinPlan::Joined(fragment))
    }
}
