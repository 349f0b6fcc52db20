//! Implementation of heuristic join ordering.
//!
//! The heuristic optimizer skips the subset search entirely: relations are joined smallest
//! first, and predicates are attached as soon as both of their relations are joined. It is
//! linear in the number of relations, which makes it useful as a baseline for the cost based
//! search or for queries too wide to enumerate.

mod optimizer;
pub use optimizer::*;
