//! Join graph of a query.
//!
//! One node per relation and one edge per pair of directly joinable relations. The edge carries
//! every predicate between the two relations, in predicate order.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use smallvec::{smallvec, SmallVec};

use crate::query::{PredicateId, QuerySpec, RelationId};

pub type PredicateList = SmallVec<[PredicateId; 2]>;

pub struct JoinGraph {
    /// Node index equals relation id.
    graph: UnGraph<RelationId, PredicateList>,
}

impl JoinGraph {
    pub fn new(query: &QuerySpec) -> Self {
        let mut graph: UnGraph<RelationId, PredicateList> =
            UnGraph::with_capacity(query.relation_count(), query.predicates().len());
        for id in 0..query.relation_count() {
            graph.add_node(id);
        }

        for predicate in 0..query.predicates().len() {
            let (left, right) = query.predicate_ends(predicate);
            let (a, b) = (NodeIndex::new(left), NodeIndex::new(right));
            match graph.find_edge(a, b) {
                Some(edge) => graph[edge].push(predicate),
                None => {
                    graph.add_edge(a, b, smallvec![predicate]);
                }
            }
        }

        Self { graph }
    }

    /// Predicates linking `a` and `b`, empty when they are not directly joinable.
    pub fn predicates_between(&self, a: RelationId, b: RelationId) -> &[PredicateId] {
        if a == b || a >= self.graph.node_count() || b >= self.graph.node_count() {
            return &[];
        }
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map(|edge| self.graph[edge].as_slice())
            .unwrap_or(&[])
    }

    pub fn is_joinable(&self, a: RelationId, b: RelationId) -> bool {
        !self.predicates_between(a, b).is_empty()
    }

    /// Directly joinable relations of `relation`, ascending.
    pub fn neighbors(&self, relation: RelationId) -> Vec<RelationId> {
        let mut neighbors: Vec<RelationId> = self
            .graph
            .neighbors(NodeIndex::new(relation))
            .map(|n| n.index())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// A relation without any incident predicate can only be added by a cartesian step.
    pub fn is_isolated(&self, relation: RelationId) -> bool {
        self.graph
            .neighbors(NodeIndex::new(relation))
            .next()
            .is_none()
    }

    /// All directly joinable pairs `(a, b, predicates)` with `a < b`, ascending.
    pub fn joinable_pairs(&self) -> Vec<(RelationId, RelationId, &[PredicateId])> {
        let mut pairs: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                let (a, b) = (a.index().min(b.index()), a.index().max(b.index()));
                Some((a, b, self.graph[edge].as_slice()))
            })
            .collect();
        pairs.sort_by_key(|(a, b, _)| (*a, *b));
        pairs
    }

    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Whether every relation can reach every other one through predicates.
    pub fn is_connected(&self) -> bool {
        self.component_count() <= 1
    }
}
