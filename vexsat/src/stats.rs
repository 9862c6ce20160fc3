//! Solver statistics.
use serde::Serialize;

/// Counters tracked during solving.
///
/// All counters are cumulative over the lifetime of the solver, including repeated `solve` calls.
#[derive(Copy, Clone, Default, Debug, Serialize)]
pub struct SolverStats {
    /// Number of conflicts found during propagation.
    pub conflicts: u64,
    /// Number of branching decisions made.
    pub decisions: u64,
    /// Decisions whose polarity was picked at random.
    pub random_decisions: u64,
    /// Number of literals dequeued for propagation.
    pub propagations: u64,
    /// Number of restarts performed.
    pub restarts: u64,
    /// Number of learned clauses, including learned units and binary clauses.
    pub learned_clauses: u64,
    /// Learned clauses deleted by database reduction.
    pub deleted_clauses: u64,
    /// Learned clauses whose glue was at or below the glue threshold when learned.
    pub glue_clauses: u64,
    /// Literals removed from learned clauses by minimization.
    pub minimized_literals: u64,
    /// Input clauses absorbed at load time because they were tautological or already satisfied.
    pub subsumed_clauses: u64,
    /// Largest glue value among all learned clauses.
    pub max_glue: u64,
    /// Total wall clock time spent inside `solve`.
    pub time_seconds: f64,
}
