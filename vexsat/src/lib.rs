//! A CDCL based SAT solver.
//!
//! The solver takes a boolean formula in conjunctive normal form and either finds a satisfying
//! assignment or determines that none exists. The engine is a conflict driven clause learning
//! loop: unit propagation over two watched literals per clause, first-UIP clause learning with
//! recursive minimization, VSIDS branching with phase saving, Luby or glue-EMA restarts and
//! activity/glue based clause database reduction.

pub mod config;
pub mod solver;
pub mod stats;

mod analyze_conflict;
mod assumptions;
mod binary;
mod cdcl;
mod clause;
mod context;
mod decision;
mod glue;
mod load;
mod prop;
mod schedule;
mod state;
mod tmp;

pub use vexsat_formula::{cnf, lit, CnfFormula, Lit, Var};

pub use config::{RestartPolicy, SolverConfig};
pub use load::ClauseLoadError;
pub use solver::Solver;
pub use state::SolveResult;
pub use stats::SolverStats;
