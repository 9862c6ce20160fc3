//! Miscellaneous solver state.
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
    UnsatUnderAssumptions,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Outcome of a [`solve`](crate::solver::Solver::solve) call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    /// A satisfying assignment was found.
    Sat,
    /// No satisfying assignment exists (under the given assumptions if any were passed).
    Unsat,
    /// A resource limit was hit or the solve was cancelled before a verdict was reached.
    Unknown,
}

/// Miscellaneous solver state.
///
/// Anything larger or any larger group of related state variables should be moved into a separate
/// part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Advisory cancellation flag, shared with the caller.
    ///
    /// Polled at schedule step boundaries. Setting it makes the running solve return with an
    /// unknown verdict while keeping all state consistent.
    pub cancel: Arc<AtomicBool>,
}
