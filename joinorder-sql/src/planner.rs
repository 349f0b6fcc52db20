//! Converts SQL text into a [`QuerySpec`].
//!
//! Only the select-project-join subset is understood: one `SELECT` over a comma separated list
//! of tables, with a `WHERE` clause made of equalities between qualified columns joined by
//! `AND`.

use itertools::Itertools;
use joinorder::query::{ColumnRef, JoinPredicate, QuerySpec, Relation};
use log::debug;
use sqlparser::ast as sp;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::catalog::Settings;
use crate::error::{SqlError, SqlResult};

pub struct SqlPlanner<'a> {
    settings: &'a Settings,
}

impl<'a> SqlPlanner<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn plan(&self, sql: &str) -> SqlResult<QuerySpec> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptyQuery);
        }

        let statements = Parser::parse_sql(&GenericDialect {}, sql)?;
        match statements.as_slice() {
            [] => Err(SqlError::EmptyQuery),
            [statement] => self.plan_statement(statement),
            _ => Err(SqlError::MultipleStatements),
        }
    }

    fn plan_statement(&self, statement: &sp::Statement) -> SqlResult<QuerySpec> {
        let query = match statement {
            sp::Statement::Query(query) => query,
            other => {
                return Err(SqlError::Unsupported(format!("statement {}", other)));
            }
        };
        if query.with.is_some() {
            return Err(SqlError::Unsupported("WITH clause".into()));
        }
        if query.order_by.is_some() {
            return Err(SqlError::Unsupported("ORDER BY clause".into()));
        }
        if query.limit.is_some() || query.offset.is_some() || query.fetch.is_some() {
            return Err(SqlError::Unsupported("LIMIT, OFFSET or FETCH clause".into()));
        }

        let select = match query.body.as_ref() {
            sp::SetExpr::Select(select) => select,
            other => {
                return Err(SqlError::Unsupported(format!("query body {}", other)));
            }
        };
        if select.having.is_some() {
            return Err(SqlError::Unsupported("HAVING clause".into()));
        }
        if select.distinct.is_some() {
            return Err(SqlError::Unsupported("DISTINCT".into()));
        }
        match &select.group_by {
            sp::GroupByExpr::Expressions(exprs, modifiers)
                if exprs.is_empty() && modifiers.is_empty() => {}
            other => {
                return Err(SqlError::Unsupported(format!("{}", other)));
            }
        }

        let columns = select
            .projection
            .iter()
            .map(|item| item.to_string())
            .collect_vec();

        let relations = select
            .from
            .iter()
            .map(|table| self.convert_relation(table))
            .collect::<SqlResult<Vec<_>>>()?;

        let mut conjuncts = vec![];
        if let Some(selection) = &select.selection {
            split_conjunction(selection, &mut conjuncts);
        }
        let predicates = conjuncts
            .into_iter()
            .map(convert_predicate)
            .collect::<SqlResult<Vec<_>>>()?;

        debug!(
            "Planned {} relations and {} join predicates",
            relations.len(),
            predicates.len()
        );
        Ok(QuerySpec::try_new(columns, relations, predicates)?)
    }

    fn convert_relation(&self, table: &sp::TableWithJoins) -> SqlResult<Relation> {
        if !table.joins.is_empty() {
            return Err(SqlError::Unsupported(format!(
                "explicit JOIN in {}, list tables in FROM and join them in WHERE",
                table
            )));
        }

        match &table.relation {
            sp::TableFactor::Table { name, alias, .. } => {
                if let Some(alias) = alias {
                    return Err(SqlError::Unsupported(format!("table alias {}", alias)));
                }
                let name = object_name(name);
                let rows = self
                    .settings
                    .row_count(&name)
                    .ok_or_else(|| SqlError::UnknownTable(name.clone()))?;
                Ok(Relation::new(name, rows))
            }
            other => Err(SqlError::Unsupported(format!("FROM item {}", other))),
        }
    }
}

fn object_name(name: &sp::ObjectName) -> String {
    name.0
        .iter()
        .map(|part| {
            part.as_ident()
                .map(|ident| ident.value.clone())
                .unwrap_or_else(|| part.to_string())
        })
        .join(".")
}

/// Flattens nested `AND`s and parentheses into a list of conjuncts.
fn split_conjunction<'e>(expr: &'e sp::Expr, conjuncts: &mut Vec<&'e sp::Expr>) {
    match expr {
        sp::Expr::BinaryOp {
            left,
            op: sp::BinaryOperator::And,
            right,
        } => {
            split_conjunction(left, conjuncts);
            split_conjunction(right, conjuncts);
        }
        sp::Expr::Nested(inner) => split_conjunction(inner, conjuncts),
        other => conjuncts.push(other),
    }
}

fn convert_predicate(expr: &sp::Expr) -> SqlResult<JoinPredicate> {
    match expr {
        sp::Expr::BinaryOp {
            left,
            op: sp::BinaryOperator::Eq,
            right,
        } => match (column_ref(left), column_ref(right)) {
            (Some(left), Some(right)) => Ok(JoinPredicate::new(left, right)),
            _ => Err(not_a_join_predicate(expr)),
        },
        _ => Err(not_a_join_predicate(expr)),
    }
}

fn column_ref(expr: &sp::Expr) -> Option<ColumnRef> {
    match expr {
        sp::Expr::CompoundIdentifier(parts) if parts.len() >= 2 => {
            let (column, relation) = parts.split_last()?;
            Some(ColumnRef::new(
                relation.iter().map(|ident| ident.value.as_str()).join("."),
                column.value.clone(),
            ))
        }
        sp::Expr::Nested(inner) => column_ref(inner),
        _ => None,
    }
}

fn not_a_join_predicate(expr: &sp::Expr) -> SqlError {
    SqlError::Unsupported(format!(
        "WHERE condition {} is not an equality between two qualified columns",
        expr
    ))
}

#[cfg(test)]
mod tests {
    use crate::catalog::Settings;
    use crate::error::SqlError;
    use crate::planner::SqlPlanner;
    use joinorder::query::QuerySpec;
    use maplit::hashmap;

    fn settings() -> Settings {
        Settings {
            default_rows: None,
            tables: hashmap! {
                "table1".to_string() => 1000,
                "table2".to_string() => 500,
                "table3".to_string() => 2000,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_select_project_join() {
        let settings = settings();
        let spec = SqlPlanner::new(&settings)
            .plan(
                "SELECT column1, column2 FROM table1, table2, table3 \
                 WHERE table1.column1 = table2.column1 AND (table2.column2 = table3.column2)",
            )
            .unwrap();

        let expected = QuerySpec::builder()
            .columns(vec!["column1", "column2"])
            .relation("table1", 1000)
            .relation("table2", 500)
            .relation("table3", 2000)
            .predicate("table1.column1", "table2.column1")
            .predicate("table2.column2", "table3.column2")
            .build()
            .unwrap();
        assert_eq!(expected, spec);
    }

    #[test]
    fn test_plan_without_where() {
        let settings = settings();
        let spec = SqlPlanner::new(&settings)
            .plan("SELECT * FROM table1")
            .unwrap();
        assert_eq!(vec!["*".to_string()], spec.projected_columns());
        assert_eq!(1, spec.relation_count());
        assert!(spec.predicates().is_empty());
    }

    #[test]
    fn test_reject_unsupported_sql() {
        let settings = settings();
        let planner = SqlPlanner::new(&settings);

        assert!(matches!(planner.plan("  "), Err(SqlError::EmptyQuery)));
        assert!(matches!(planner.plan("SELEC"), Err(SqlError::Syntax(_))));
        assert!(matches!(
            planner.plan("SELECT 1 FROM table1; SELECT 2 FROM table2"),
            Err(SqlError::MultipleStatements)
        ));
        assert!(matches!(
            planner.plan("SELECT * FROM table1 JOIN table2 ON table1.a = table2.a"),
            Err(SqlError::Unsupported(_))
        ));
        assert!(matches!(
            planner.plan("SELECT * FROM table1 t"),
            Err(SqlError::Unsupported(_))
        ));
        assert!(matches!(
            planner.plan("SELECT * FROM table1, table2 WHERE table1.a > table2.a"),
            Err(SqlError::Unsupported(_))
        ));
        assert!(matches!(
            planner.plan("SELECT * FROM table1, table2 WHERE table1.a = 1"),
            Err(SqlError::Unsupported(_))
        ));
        assert!(matches!(
            planner.plan("DELETE FROM table1"),
            Err(SqlError::Unsupported(_))
        ));
    }

    #[test]
    fn test_reject_row_changing_clauses() {
        let settings = settings();
        let planner = SqlPlanner::new(&settings);

        for sql in [
            "SELECT * FROM table1, table2 WHERE table1.a = table2.a LIMIT 5",
            "SELECT * FROM table1, table2 WHERE table1.a = table2.a OFFSET 5",
            "SELECT * FROM table1 FETCH FIRST 5 ROWS ONLY",
            "SELECT * FROM table1, table2 WHERE table1.a = table2.a ORDER BY table1.a",
            "SELECT DISTINCT table1.a FROM table1, table2 WHERE table1.a = table2.a",
            "SELECT table1.a FROM table1, table2 WHERE table1.a = table2.a GROUP BY table1.a",
        ] {
            assert!(
                matches!(planner.plan(sql), Err(SqlError::Unsupported(_))),
                "{} should be rejected",
                sql
            );
        }
    }

    #[test]
    fn test_reject_unknown_relations() {
        let settings = settings();
        let planner = SqlPlanner::new(&settings);

        assert!(matches!(
            planner.plan("SELECT * FROM orders"),
            Err(SqlError::UnknownTable(_))
        ));
        assert!(matches!(
            planner.plan("SELECT * FROM table1, table2 WHERE table1.a = table4.a"),
            Err(SqlError::Optimizer(_))
        ));
        assert!(matches!(
            planner.plan("SELECT * FROM table1, table1"),
            Err(SqlError::Optimizer(_))
        ));
    }
}
