use enum_as_inner::EnumAsInner;
use itertools::Itertools;

use crate::cost::{Cost, CostModel};
use crate::dp::RelationSet;
use crate::graph::{JoinGraph, PredicateList};
use crate::query::{PredicateId, QuerySpec, RelationId};

/// One relation added to a fragment, with the predicates that attached it.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinStep {
    relation: RelationId,
    predicates: PredicateList,
    /// Accumulated cost of the fragment after this step.
    cost: Cost,
}

impl JoinStep {
    pub fn relation(&self) -> RelationId {
        self.relation
    }

    pub fn predicates(&self) -> &[PredicateId] {
        &self.predicates
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }
}

/// Best known way to join exactly the relations in [`PlanFragment::relations`].
///
/// A fragment is never mutated once built; [`PlanFragment::extend`] returns a new fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanFragment {
    relations: RelationSet,
    /// Never empty. The first step is the seed relation.
    steps: Vec<JoinStep>,
}

impl PlanFragment {
    /// One-relation fragment.
    pub fn scan<C: CostModel + ?Sized>(
        query: &QuerySpec,
        cost_model: &C,
        relation: RelationId,
    ) -> Self {
        Self {
            relations: RelationSet::singleton(relation),
            steps: vec![JoinStep {
                relation,
                predicates: PredicateList::new(),
                cost: cost_model.scan(query.relation(relation)),
            }],
        }
    }

    /// Predicates linking `relation` to any relation already in this fragment, in predicate
    /// order. Empty when adding `relation` would be a cartesian step.
    pub fn attached_predicates(&self, graph: &JoinGraph, relation: RelationId) -> PredicateList {
        self.relations
            .iter()
            .flat_map(|member| graph.predicates_between(member, relation).iter().copied())
            .sorted()
            .collect()
    }

    /// Returns a new fragment with `relation` joined last.
    pub fn extend<C: CostModel + ?Sized>(
        &self,
        query: &QuerySpec,
        graph: &JoinGraph,
        cost_model: &C,
        relation: RelationId,
    ) -> Self {
        debug_assert!(!self.relations.contains(relation));

        let predicates = self.attached_predicates(graph, relation);
        let cost = self.cost() + cost_model.combine(query, self, relation, &predicates);

        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(JoinStep {
            relation,
            predicates,
            cost,
        });

        Self {
            relations: self.relations.with(relation),
            steps,
        }
    }

    /// Extends with the relation whose step is cheapest until every relation of `query` is
    /// covered. Ties go to the lower relation id.
    pub fn complete_greedily<C: CostModel + ?Sized>(
        self,
        query: &QuerySpec,
        graph: &JoinGraph,
        cost_model: &C,
    ) -> Self {
        let mut fragment = self;
        while fragment.len() < query.relation_count() {
            let mut best: Option<PlanFragment> = None;
            for relation in (0..query.relation_count()).filter(|r| !fragment.relations.contains(*r))
            {
                let candidate = fragment.extend(query, graph, cost_model, relation);
                if best.as_ref().map_or(true, |b| b.cost() > candidate.cost()) {
                    best = Some(candidate);
                }
            }
            match best {
                Some(next) => fragment = next,
                None => break,
            }
        }
        fragment
    }

    pub fn relations(&self) -> RelationSet {
        self.relations
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Relations in the order they were joined.
    pub fn join_order(&self) -> impl Iterator<Item = RelationId> + '_ {
        self.steps.iter().map(|step| step.relation)
    }

    /// Applied predicates in the order they were attached.
    pub fn predicates_applied(&self) -> impl Iterator<Item = PredicateId> + '_ {
        self.steps
            .iter()
            .flat_map(|step| step.predicates.iter().copied())
    }

    pub fn cost(&self) -> Cost {
        self.steps.last().map(|step| step.cost).unwrap_or_default()
    }

    /// Whether the last step joined without any predicate.
    pub fn ends_with_cartesian(&self) -> bool {
        self.steps.len() > 1
            && self
                .steps
                .last()
                .map_or(false, |step| step.predicates.is_empty())
    }

    /// Number of steps, besides the seed, that joined without any predicate.
    pub fn cartesian_steps(&self) -> usize {
        self.steps
            .iter()
            .skip(1)
            .filter(|step| step.predicates.is_empty())
            .count()
    }
}

/// Outcome of join order optimization.
#[derive(Clone, Debug, PartialEq, EnumAsInner)]
pub enum JoinPlan {
    /// The query has no relation.
    Empty,
    Joined(PlanFragment),
}

impl JoinPlan {
    pub fn cost(&self) -> Cost {
        match self {
            JoinPlan::Empty => Cost::default(),
            JoinPlan::Joined(fragment) => fragment.cost(),
        }
    }

    pub fn fragment(&self) -> Option<&PlanFragment> {
        self.as_joined()
    }
}
