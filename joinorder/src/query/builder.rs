use crate::error::OptResult;
use crate::query::{ColumnRef, JoinPredicate, QuerySpec, Relation};

/// Incrementally assembles a [`QuerySpec`]; validation happens in [`QuerySpecBuilder::build`].
#[derive(Default)]
pub struct QuerySpecBuilder {
    columns: Vec<String>,
    relations: Vec<Relation>,
    predicates: Vec<(String, String)>,
}

impl QuerySpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column<S: Into<String>>(mut self, column: S) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn relation<S: Into<String>>(mut self, name: S, estimated_rows: u64) -> Self {
        self.relations.push(Relation::new(name, estimated_rows));
        self
    }

    /// Adds `left = right`, both written as `relation.column`.
    pub fn predicate<L: Into<String>, R: Into<String>>(mut self, left: L, right: R) -> Self {
        self.predicates.push((left.into(), right.into()));
        self
    }

    pub fn build(self) -> OptResult<QuerySpec> {
        let predicates = self
            .predicates
            .iter()
            .map(|(left, right)| {
                Ok(JoinPredicate::new(
                    ColumnRef::parse(left)?,
                    ColumnRef::parse(right)?,
                ))
            })
            .collect::<OptResult<Vec<_>>>()?;

        QuerySpec::try_new(self.columns, self.relations, predicates)
    }
}
