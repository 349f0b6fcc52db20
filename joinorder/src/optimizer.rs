use serde::Deserialize;

use crate::dp::JoinPlan;
use crate::error::{OptError, OptResult};
use crate::query::QuerySpec;

/// Knobs shared by optimizers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Row reduction applied once per join predicate, in `(0, 1]`.
    pub selectivity: f64,
    /// Max number of fragment extensions to evaluate. Unlimited when `None`.
    pub step_budget: Option<usize>,
    /// Evaluate the extensions of one subset size on the rayon thread pool.
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            selectivity: 1.0,
            step_budget: None,
            parallel: false,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> OptResult<()> {
        if !(self.selectivity > 0.0 && self.selectivity <= 1.0) {
            return Err(OptError::InvalidConfig(format!(
                "selectivity must be in (0, 1], got {}",
                self.selectivity
            )));
        }
        Ok(())
    }
}

/// Join order optimizer interface.
///
/// Implementations validate nothing about the query itself, a [`QuerySpec`] is valid by
/// construction. Every call builds its own state; nothing is cached between calls.
pub trait JoinOrderOptimizer {
    fn optimize(&self, query: &QuerySpec) -> OptResult<JoinPlan>;
}
