//! Monadic second-order model checking by dynamic programming over tree
//! decompositions.
//!
//! An instance is a finite relational structure together with a formula built
//! from second-order set quantifiers and first-order CNF parts. The edge
//! relation `E` is decomposed into bags, and a state engine carries the
//! partial solutions of each bag through introduce, forget, edge and join
//! events up to the root, where the cheapest satisfying state (if any) is the
//! answer.
//!
//! ```
//! let outcome = courcelle::solve("universe 2\nvocabulary E 2 1\nE 0 1\nexists R G\naxay 2\n-R x -R y\n-G x -G y\n")
//!     .expect("valid instance");
//! assert!(outcome.is_model());
//! ```

pub mod decomposition;
pub mod driver;
pub mod engine;
pub mod formula;
pub mod logic;
pub mod metrics;
pub mod parser;
pub mod problem;
pub mod quantifier;
pub mod solve;
pub mod state;
pub mod structure;
pub mod symbol;
pub mod trace;
pub mod union_find;

pub use solve::{solve, solve_problem, solve_with, Outcome, Solution, SolveError, SolveOptions};

#[cfg(test)]
pub(crate) mod test_utils;
