//! A CDCL based SAT solver that tracks clause states with live counters.
//!
//! Every clause keeps a count of its satisfied and unassigned literals under the current partial
//! assignment and is filed into a bucket matching its derived status. Unit propagation and
//! conflict detection are simple bucket lookups; assigning a variable updates the counters of all
//! clauses containing it.
pub mod config;
pub mod solver;

mod analyze_conflict;
mod cdcl;
mod clause;
mod context;
mod decision;
mod load;
mod model;
mod prop;
mod state;
mod tmp;

#[cfg(test)]
mod check;

pub use config::SolverConfig;
pub use solver::Solver;
pub use tallysat_formula::{CnfFormula, Lit, Var};
