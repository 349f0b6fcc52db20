//! Query model consumed by the optimizers.
//!
//! A [`QuerySpec`] owns the relations and join predicates of one query. Everything downstream
//! refers to them by position ([`RelationId`], [`PredicateId`]), so the spec acts as the arena
//! for a single optimization call.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::dp::RelationSet;
use crate::error::{OptError, OptResult};

mod builder;
pub use builder::*;

/// Position of a relation in [`QuerySpec::relations`].
pub type RelationId = usize;

/// Position of a predicate in [`QuerySpec::predicates`].
pub type PredicateId = usize;

/// A table participating in the query.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Relation {
    name: String,
    estimated_rows: u64,
}

impl Relation {
    pub fn new<S: Into<String>>(name: S, estimated_rows: u64) -> Self {
        Self {
            name: name.into(),
            estimated_rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn estimated_rows(&self) -> u64 {
        self.estimated_rows
    }
}

/// A `relation.column` reference.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ColumnRef {
    relation: String,
    column: String,
}

impl ColumnRef {
    pub fn new<R: Into<String>, C: Into<String>>(relation: R, column: C) -> Self {
        Self {
            relation: relation.into(),
            column: column.into(),
        }
    }

    /// Parses `relation.column`. The split happens at the last `.`, so schema qualified
    /// relation names are kept whole.
    pub fn parse(s: &str) -> OptResult<Self> {
        let s = s.trim();
        match s.rsplit_once('.') {
            Some((relation, column)) if !relation.is_empty() && !column.is_empty() => {
                Ok(Self::new(relation, column))
            }
            _ => Err(OptError::malformed(format!(
                "column reference {:?} is not of the form relation.column",
                s
            ))),
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl FromStr for ColumnRef {
    type Err = OptError;

    fn from_str(s: &str) -> OptResult<Self> {
        Self::parse(s)
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.relation, self.column)
    }
}

/// Equality join condition `left = right`.
///
/// The pair is unordered as far as the optimizer is concerned. Several predicates between the
/// same two relations are kept as separate predicates.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct JoinPredicate {
    left: ColumnRef,
    right: ColumnRef,
}

impl JoinPredicate {
    pub fn new(left: ColumnRef, right: ColumnRef) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &ColumnRef {
        &self.left
    }

    pub fn right(&self) -> &ColumnRef {
        &self.right
    }

    /// Whether either side belongs to `relation`.
    pub fn is_incident_to(&self, relation: &str) -> bool {
        self.left.relation == relation || self.right.relation == relation
    }

    /// Whether the predicate links `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.left.relation == a && self.right.relation == b)
            || (self.left.relation == b && self.right.relation == a)
    }
}

impl Display for JoinPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

/// Validated description of a select-project-join query.
#[derive(Clone, Debug)]
pub struct QuerySpec {
    projected_columns: Vec<String>,
    relations: Vec<Relation>,
    predicates: Vec<JoinPredicate>,
    relation_ids: HashMap<String, RelationId>,
    /// Relations referenced by the left and right side of each predicate.
    predicate_ends: Vec<(RelationId, RelationId)>,
}

/// Equality ignores the name index, which is derived from `relations`.
impl PartialEq for QuerySpec {
    fn eq(&self, other: &Self) -> bool {
        self.projected_columns == other.projected_columns
            && self.relations == other.relations
            && self.predicates == other.predicates
    }
}

impl QuerySpec {
    /// Validates and builds a query spec.
    ///
    /// Relation names must be non-empty and distinct, every predicate must reference declared
    /// relations, and the two sides of a predicate must belong to different relations.
    pub fn try_new(
        projected_columns: Vec<String>,
        relations: Vec<Relation>,
        predicates: Vec<JoinPredicate>,
    ) -> OptResult<Self> {
        if relations.len() > RelationSet::CAPACITY {
            return Err(OptError::TooManyRelations {
                count: relations.len(),
                max: RelationSet::CAPACITY,
            });
        }

        let mut relation_ids = HashMap::with_capacity(relations.len());
        for (id, relation) in relations.iter().enumerate() {
            if relation.name.is_empty() {
                return Err(OptError::malformed("relation name is empty"));
            }
            if relation_ids.insert(relation.name.clone(), id).is_some() {
                return Err(OptError::malformed(format!(
                    "relation {:?} is declared more than once",
                    relation.name
                )));
            }
        }

        let predicate_ends = predicates
            .iter()
            .map(|predicate| {
                let lookup = |column: &ColumnRef| {
                    relation_ids.get(column.relation()).copied().ok_or_else(|| {
                        OptError::malformed(format!(
                            "predicate {} references undeclared relation {:?}",
                            predicate,
                            column.relation()
                        ))
                    })
                };
                let (left, right) = (lookup(&predicate.left)?, lookup(&predicate.right)?);
                if left == right {
                    return Err(OptError::malformed(format!(
                        "predicate {} joins relation {:?} with itself",
                        predicate,
                        predicate.left.relation()
                    )));
                }
                Ok((left, right))
            })
            .collect::<OptResult<Vec<_>>>()?;

        Ok(Self {
            projected_columns,
            relations,
            predicates,
            relation_ids,
            predicate_ends,
        })
    }

    pub fn builder() -> QuerySpecBuilder {
        QuerySpecBuilder::default()
    }

    pub fn projected_columns(&self) -> &[String] {
        &self.projected_columns
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation(&self, id: RelationId) -> &Relation {
        &self.relations[id]
    }

    pub fn relation_id(&self, name: &str) -> Option<RelationId> {
        self.relation_ids.get(name).copied()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn predicates(&self) -> &[JoinPredicate] {
        &self.predicates
    }

    pub fn predicate(&self, id: PredicateId) -> &JoinPredicate {
        &self.predicates[id]
    }

    /// Relation ids on the (left, right) side of a predicate.
    pub fn predicate_ends(&self, id: PredicateId) -> (RelationId, RelationId) {
        self.predicate_ends[id]
    }

    /// Set of every relation in the query.
    pub fn all_relations(&self) -> RelationSet {
        RelationSet::full(self.relations.len())
    }
}
