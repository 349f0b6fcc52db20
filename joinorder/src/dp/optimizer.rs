use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;

use crate::cost::{CardinalityCostModel, CostModel};
use crate::dp::table::offer;
use crate::dp::{DpTable, JoinPlan, Level, PlanFragment};
use crate::error::OptResult;
use crate::graph::JoinGraph;
use crate::optimizer::{JoinOrderOptimizer, OptimizerConfig};
use crate::query::QuerySpec;

/// Counts down fragment extensions.
struct StepBudget(Option<usize>);

impl StepBudget {
    fn try_take(&mut self) -> bool {
        match &mut self.0 {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        }
    }
}

/// Cost based join order optimizer using dynamic programming over relation subsets.
pub struct DpOptimizer<C = CardinalityCostModel> {
    cost_model: C,
    config: OptimizerConfig,
}

impl DpOptimizer<CardinalityCostModel> {
    pub fn new(config: OptimizerConfig) -> OptResult<Self> {
        let cost_model = CardinalityCostModel::new(config.selectivity);
        Self::with_cost_model(cost_model, config)
    }
}

impl Default for DpOptimizer<CardinalityCostModel> {
    fn default() -> Self {
        Self {
            cost_model: CardinalityCostModel::default(),
            config: OptimizerConfig::default(),
        }
    }
}

impl<C: CostModel> DpOptimizer<C> {
    pub fn with_cost_model(cost_model: C, config: OptimizerConfig) -> OptResult<Self> {
        config.validate()?;
        Ok(Self { cost_model, config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Runs every phase and returns the filled table.
    ///
    /// Without a step budget the last level holds exactly one fragment, covering every
    /// relation. When the budget runs out the table is marked truncated and stops at the last
    /// size that got any fragment.
    pub fn build_table(&self, query: &QuerySpec, graph: &JoinGraph) -> DpTable {
        let mut table = DpTable::default();
        let relation_count = query.relation_count();
        if relation_count == 0 {
            return table;
        }

        let mut budget = StepBudget(self.config.step_budget);

        let seeds: Level = (0..relation_count)
            .map(|relation| {
                let fragment = PlanFragment::scan(query, &self.cost_model, relation);
                (fragment.relations(), fragment)
            })
            .collect();
        table.commit(seeds);

        for size in 2..=relation_count {
            let mut working = Level::new();
            let mut exhausted = false;

            if let Some(previous) = table.last_level() {
                let candidates: Box<dyn Iterator<Item = PlanFragment> + '_> = if self.config.parallel {
                    let fragments = previous.values().collect_vec();
                    let buffers: Vec<Vec<PlanFragment>> = fragments
                        .par_iter()
                        .map(|fragment| self.extensions(query, graph, fragment).collect())
                        .collect();
                    Box::new(buffers.into_iter().flatten())
                } else {
                    Box::new(
                        previous
                            .values()
                            .flat_map(|fragment| self.extensions(query, graph, fragment)),
                    )
                };

                for candidate in candidates {
                    if !budget.try_take() {
                        exhausted = true;
                        break;
                    }
                    offer(&mut working, candidate);
                }
            }

            if !working.is_empty() {
                debug!("Committing {} fragments of size {}", working.len(), size);
                table.commit(working);
            }

            if exhausted {
                warn!(
                    "Step budget {:?} exhausted while building subsets of size {}",
                    self.config.step_budget, size
                );
                table.mark_truncated();
                break;
            }
        }

        table
    }

    /// Candidates from joining each missing relation onto `fragment`, in relation order.
    fn extensions<'a>(
        &'a self,
        query: &'a QuerySpec,
        graph: &'a JoinGraph,
        fragment: &'a PlanFragment,
    ) -> impl Iterator<Item = PlanFragment> + 'a {
        (0..query.relation_count())
            .filter(move |relation| !fragment.relations().contains(*relation))
            .map(move |relation| fragment.extend(query, graph, &self.cost_model, relation))
    }
}

impl<C: CostModel> JoinOrderOptimizer for DpOptimizer<C> {
    fn optimize(&self, query: &QuerySpec) -> OptResult<JoinPlan> {
        if query.relation_count() == 0 {
            return Ok(JoinPlan::Empty);
        }

        let graph = JoinGraph::new(query);
        if !graph.is_connected() {
            warn!(
                "Join graph has {} components, cartesian steps are unavoidable",
                graph.component_count()
            );
        }

        let table = self.build_table(query, &graph);
        debug!("DP table after optimization: {:?}", table);

        let winner = match table.get(query.all_relations()) {
            Some(fragment) => fragment.clone(),
            None => match table.best_of_largest() {
                Some(partial) => {
                    partial
                        .clone()
                        .complete_greedily(query, &graph, &self.cost_model)
                }
                // A non-empty query always seeds level one.
                None => return Ok(JoinPlan::Empty),
            },
        };

        Ok(JoinPlan::Joined(winner))
    }
}
