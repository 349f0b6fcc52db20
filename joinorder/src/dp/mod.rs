//! Bottom-up dynamic programming over relation subsets.
//!
//! The search follows System R [1]: every relation seeds a one-relation fragment, then each
//! subset size `k` is built by joining one more relation onto the best fragments of size `k - 1`.
//! Only the cheapest fragment per subset survives a phase, and a phase is committed to the
//! [`DpTable`] as a whole before the next one reads it.
//!
//! [1]: Selinger, P. Griffiths, et al. "Access path selection in a relational database
//! management system."

mod subset;
pub use subset::*;
mod fragment;
pub use fragment::*;
mod table;
pub use table::{DpTable, Level};
mod optimizer;
pub use optimizer::*;
