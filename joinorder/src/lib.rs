//! ## Background
//!
//! For a select-project-join query the order in which relations are joined decides the size of
//! every intermediate result. The optimizer in this crate picks a join order with the lowest
//! estimated cost, and renders that order back as an executable query.
//!
//! Join order search follows the bottom-up strategy of System R [1]: the best plan for every
//! subset of relations is built from the best plans of smaller subsets, so each subset is
//! costed once. The number of subsets grows as `2^n`, which is fine for the tens of relations
//! this crate targets. A step budget bounds the search for wider queries, and a heuristic
//! optimizer orders relations by size without searching at all.
//!
//! ## Design
//!
//! * [`query`] Relations, join predicates and the validated [`query::QuerySpec`].
//! * [`graph`] Join graph, which relation pairs are directly joinable.
//! * [`dp`] Dynamic programming over relation subsets.
//! * [`cost`] Cost model used to compare fragments.
//! * [`heuristic`] Smallest relation first ordering.
//! * [`plan`] Rendering and explaining the optimized order.
//!
//! ## Reference
//!
//! 1. Selinger, P. Griffiths, et al. "Access path selection in a relational database management
//! system." Readings in Artificial Intelligence and Databases. Morgan Kaufmann, 1989. 511-522.
//! 2. Moerkotte, G. and Neumann, T., 2006. Analysis of two existing and one new dynamic
//! programming algorithm for the generation of optimal bushy join trees without cross products.
//! In Proceedings of the 32nd international conference on Very large data bases (pp. 930-941).

pub mod cost;
pub mod dp;
pub mod error;
pub mod graph;
pub mod heuristic;
pub mod optimizer;
pub mod plan;
pub mod query;
