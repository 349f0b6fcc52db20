//! SQL frontend of the `joinorder` optimizer.
//!
//! Parses a select-project-join query, looks up row counts in [`catalog::Settings`], runs the
//! chosen optimizer and renders the optimized query.

pub mod catalog;
pub mod error;
pub mod planner;

use joinorder::dp::{DpOptimizer, JoinPlan};
use joinorder::heuristic::HeuristicOptimizer;
use joinorder::optimizer::JoinOrderOptimizer;
use joinorder::plan::explain::explain_to_string;
use joinorder::plan::RenderedPlan;
use joinorder::query::QuerySpec;

use crate::catalog::Settings;
use crate::error::SqlResult;
use crate::planner::SqlPlanner;

/// Search strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Dynamic programming over relation subsets.
    #[default]
    CostBased,
    /// Smallest relation first.
    Heuristic,
}

pub struct OptimizedQuery {
    pub spec: QuerySpec,
    pub plan: JoinPlan,
    pub rendered: RenderedPlan,
}

impl OptimizedQuery {
    pub fn explain(&self) -> std::io::Result<String> {
        explain_to_string(&self.spec, &self.plan)
    }
}

pub fn optimize_sql(sql: &str, settings: &Settings, strategy: Strategy) -> SqlResult<OptimizedQuery> {
    let spec = SqlPlanner::new(settings).plan(sql)?;

    let plan = match strategy {
        Strategy::CostBased => DpOptimizer::new(settings.optimizer.clone())?.optimize(&spec)?,
        Strategy::Heuristic => HeuristicOptimizer::new(&settings.optimizer)?.optimize(&spec)?,
    };
    let rendered = RenderedPlan::new(&spec, &plan);

    Ok(OptimizedQuery {
        spec,
        plan,
        rendered,
    })
}
