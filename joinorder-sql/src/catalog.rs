//! Row count statistics and optimizer settings loaded from YAML.

use std::collections::HashMap;

use joinorder::optimizer::OptimizerConfig;
use serde::Deserialize;

use crate::error::SqlResult;

/// Row count assumed for tables without statistics.
pub const DEFAULT_ROWS: u64 = 1000;

/// ```yaml
/// default_rows: 1000
/// tables:
///   orders: 150000
///   customer: 15000
/// optimizer:
///   step_budget: 100000
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Used for tables missing from `tables`. `None` makes such tables an error.
    pub default_rows: Option<u64>,
    pub tables: HashMap<String, u64>,
    pub optimizer: OptimizerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_rows: Some(DEFAULT_ROWS),
            tables: HashMap::new(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> SqlResult<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.optimizer.validate()?;
        Ok(settings)
    }

    pub fn row_count(&self, table: &str) -> Option<u64> {
        self.tables.get(table).copied().or(self.default_rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Settings, DEFAULT_ROWS};
    use crate::error::SqlError;
    use maplit::hashmap;

    #[test]
    fn test_load_settings() {
        let settings = Settings::from_yaml(
            "\
default_rows: ~
tables:
  orders: 150000
optimizer:
  parallel: true
",
        )
        .unwrap();

        assert_eq!(hashmap! { "orders".to_string() => 150000 }, settings.tables);
        assert_eq!(Some(150000), settings.row_count("orders"));
        assert_eq!(None, settings.row_count("customer"));
        assert!(settings.optimizer.parallel);
    }

    #[test]
    fn test_default_rows() {
        let settings = Settings::from_yaml("tables: {}").unwrap();
        assert_eq!(Some(DEFAULT_ROWS), settings.row_count("anything"));
    }

    #[test]
    fn test_reject_bad_settings() {
        assert!(matches!(
            Settings::from_yaml("unknown: 1"),
            Err(SqlError::Settings(_))
        ));
        assert!(matches!(
            Settings::from_yaml("optimizer:\n  selectivity: 0\n"),
            Err(SqlError::Optimizer(_))
        ));
    }
}
