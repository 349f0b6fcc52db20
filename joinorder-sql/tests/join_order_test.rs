use crate::utils::TestCaseRunner;
use joinorder_sql::catalog::Settings;
use joinorder_sql::error::SqlError;
use joinorder_sql::{optimize_sql, Strategy};
use maplit::hashmap;
use std::path::PathBuf;

mod utils;

fn settings() -> Settings {
    Settings {
        tables: hashmap! {
            "table1".to_string() => 1000,
            "table2".to_string() => 500,
            "table3".to_string() => 2000,
            "lineitem".to_string() => 600000,
            "orders".to_string() => 100000,
            "customer".to_string() => 5000,
            "nation".to_string() => 25,
        },
        ..Default::default()
    }
}

#[test]
fn test_join_order() {
    let runner = TestCaseRunner {
        paths: vec![PathBuf::from("resources/join_order.yaml")],
        settings: settings(),
    };

    runner.run()
}

#[test]
fn test_strict_catalog() {
    let settings = Settings {
        default_rows: None,
        ..settings()
    };

    let result = optimize_sql("SELECT * FROM x, table1", &settings, Strategy::CostBased);
    assert!(matches!(result, Err(SqlError::UnknownTable(name)) if name == "x"));
}

#[test]
fn test_budgeted_search_covers_all_relations() {
    let mut settings = settings();
    settings.optimizer.step_budget = Some(3);

    let optimized = optimize_sql(
        "SELECT customer.name FROM lineitem, orders, customer, nation \
         WHERE lineitem.order_id = orders.id AND orders.customer_id = customer.id \
         AND customer.nation_id = nation.id",
        &settings,
        Strategy::CostBased,
    )
    .unwrap();

    assert_eq!(4, optimized.rendered.tables().len());
    assert_eq!(3, optimized.rendered.predicates().len());
}
