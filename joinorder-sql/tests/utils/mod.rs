use joinorder_sql::catalog::Settings;
use joinorder_sql::{optimize_sql, Strategy};
use serde::Deserialize;
use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
pub struct TestCase {
    pub sql: String,
    #[serde(default)]
    pub heuristic: bool,
    pub expected_query: String,
    pub expected_cost: f64,
    #[serde(default)]
    pub expected_explain: Option<String>,
}

pub struct TestCaseRunner {
    /// Input file path.
    pub paths: Vec<PathBuf>,
    pub settings: Settings,
}

impl TestCaseRunner {
    pub fn run(self) {
        for path in &self.paths {
            let file = File::options()
                .read(true)
                .open(path)
                .unwrap_or_else(|e| panic!("Failed to open test case file {:?}: {}", path, e));

            let test_cases: Vec<TestCase> = serde_yaml::from_reader(file)
                .unwrap_or_else(|e| panic!("Failed to load test cases from {:?}: {}", path, e));

            for test_case in test_cases {
                self.run_case(path, test_case);
            }
        }
    }

    fn run_case<P: AsRef<Path> + Debug>(&self, path: &P, test_case: TestCase) {
        let strategy = if test_case.heuristic {
            Strategy::Heuristic
        } else {
            Strategy::CostBased
        };
        let optimized = optimize_sql(&test_case.sql, &self.settings, strategy).unwrap();

        assert_eq!(
            test_case.expected_query,
            optimized.rendered.to_string(),
            "Optimized query for {} in {:?} is different.",
            test_case.sql,
            path
        );
        assert_eq!(
            test_case.expected_cost,
            optimized.plan.cost().value(),
            "Cost for {} in {:?} is different.",
            test_case.sql,
            path
        );
        if let Some(expected_explain) = &test_case.expected_explain {
            assert_eq!(
                expected_explain,
                &optimized.explain().unwrap(),
                "Explain for {} in {:?} is different.",
                test_case.sql,
                path
            );
        }
    }
}
