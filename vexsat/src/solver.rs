//! Boolean satisfiability solver.
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Error;
use log::info;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use vexsat_dimacs::DimacsParser;
use vexsat_formula::{CnfFormula, Lit, Var};

use crate::assumptions::set_assumptions;
use crate::config::SolverConfig;
use crate::context::{config_changed, ensure_var_count, parts::*, Context};
use crate::load::{load_clause, ClauseLoadError};
use crate::schedule::{prepare_solve, schedule_step};
use crate::state::{SatState, SolveResult};
use crate::stats::SolverStats;

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver with the default configuration.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Solver {
        let mut solver = Solver::default();
        solver.set_config(config);
        solver
    }

    /// Change the solver configuration.
    ///
    /// Resource limits take effect at the next `solve` call, all other parameters immediately.
    pub fn set_config(&mut self, config: SolverConfig) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        *ctx.part_mut(SolverConfigP) = config;
        config_changed(ctx.borrow());
    }

    /// Number of variables currently allocated.
    pub fn var_count(&self) -> usize {
        let mut ctx = self.ctx.into_partial_ref();
        let count = ctx.part(AssignmentP).assignment().len();
        count
    }

    /// Create a new variable.
    pub fn new_var(&mut self) -> Var {
        let mut ctx = self.ctx.into_partial_ref_mut();
        let count = ctx.part(AssignmentP).assignment().len();
        ensure_var_count(ctx.borrow(), count + 1);
        Var::from_index(count)
    }

    /// Add a clause over previously allocated variables.
    ///
    /// Returns `Err` when a literal references a variable that was not allocated, leaving the
    /// solver unchanged. Returns `Ok(false)` iff the formula is now trivially unsatisfiable; all
    /// subsequent `solve` calls will return [`SolveResult::Unsat`].
    pub fn add_clause(&mut self, lits: &[Lit]) -> Result<bool, ClauseLoadError> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        let var_count = ctx.part(AssignmentP).assignment().len();
        for &lit in lits {
            if lit.index() >= var_count {
                return Err(ClauseLoadError { lit });
            }
        }

        load_clause(ctx.borrow(), lits);
        let not_trivially_unsat = ctx.part(SolverStateP).sat_state != SatState::Unsat;
        Ok(not_trivially_unsat)
    }

    /// Add a formula to the solver, allocating variables as needed.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Check the satisfiability of the current formula.
    ///
    /// Returns [`SolveResult::Unknown`] when a configured resource limit was hit or the
    /// [`cancel_flag`](Solver::cancel_flag) was set. The solver state stays consistent and a later
    /// call continues the search.
    pub fn solve(&mut self) -> SolveResult {
        {
            let mut ctx = self.ctx.into_partial_ref_mut();
            // A verdict reached under assumptions does not carry over to a plain solve call.
            if !ctx.part(AssumptionsP).assumptions().is_empty()
                || ctx.part(SolverStateP).sat_state == SatState::UnsatUnderAssumptions
            {
                set_assumptions(ctx.borrow(), &[]);
            }
        }
        self.run_schedule()
    }

    /// Check the satisfiability of the current formula under the given assumptions.
    ///
    /// The assumptions hold only for this call.
    pub fn solve_with_assumptions(
        &mut self,
        assumptions: &[Lit],
    ) -> Result<SolveResult, ClauseLoadError> {
        {
            let mut ctx = self.ctx.into_partial_ref_mut();

            let var_count = ctx.part(AssignmentP).assignment().len();
            for &lit in assumptions {
                if lit.index() >= var_count {
                    return Err(ClauseLoadError { lit });
                }
            }

            set_assumptions(ctx.borrow(), assumptions);
        }
        Ok(self.run_schedule())
    }

    fn run_schedule(&mut self) -> SolveResult {
        let start = Instant::now();
        let mut ctx = self.ctx.into_partial_ref_mut();

        prepare_solve(ctx.borrow());

        while schedule_step(ctx.borrow()) {}

        ctx.part_mut(StatsP).time_seconds += start.elapsed().as_secs_f64();

        match ctx.part(SolverStateP).sat_state {
            SatState::Unknown => SolveResult::Unknown,
            SatState::Sat => SolveResult::Sat,
            SatState::Unsat | SatState::UnsatUnderAssumptions => SolveResult::Unsat,
        }
    }

    /// Value assigned to a variable in the model.
    ///
    /// Only valid after `solve` returned [`SolveResult::Sat`], `None` otherwise.
    pub fn model_value(&self, var: Var) -> Option<bool> {
        let mut ctx = self.ctx.into_partial_ref();
        let value = if ctx.part(SolverStateP).sat_state == SatState::Sat {
            ctx.part(AssignmentP).var_value(var)
        } else {
            None
        };
        value
    }

    /// Set of literals that satisfy the formula.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let mut ctx = self.ctx.into_partial_ref();
        let model = if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .flat_map(|(index, assignment)| {
                        assignment.map(|polarity| Lit::from_index(index, polarity))
                    })
                    .collect(),
            )
        } else {
            None
        };
        model
    }

    /// Cumulative solver statistics.
    pub fn stats(&self) -> SolverStats {
        let mut ctx = self.ctx.into_partial_ref();
        let stats = *ctx.part(StatsP);
        stats
    }

    /// Shared flag that cancels a running solve when set.
    ///
    /// The flag is advisory and polled at step boundaries. It is cleared by the caller, not the
    /// solver, so it can be armed before `solve` is entered.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        let mut ctx = self.ctx.into_partial_ref();
        let flag = ctx.part(SolverStateP).cancel.clone();
        flag
    }

    /// Reset the solver to an empty formula, keeping the configuration.
    pub fn reset(&mut self) {
        let config = {
            let mut ctx = self.ctx.into_partial_ref();
            let config = ctx.part(SolverConfigP).clone();
            config
        };
        *self = Solver::with_config(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use vexsat_dimacs::write_dimacs;
    use vexsat_formula::{cnf::strategy::*, test::*};

    use crate::config::RestartPolicy;

    /// Exhaustive satisfiability check for small formulas.
    fn brute_force_satisfiable(formula: &CnfFormula) -> bool {
        let vars = formula.var_count();
        assert!(vars <= 20);
        (0u64..(1 << vars)).any(|candidate| {
            formula.iter().all(|clause| {
                clause
                    .iter()
                    .any(|&lit| (candidate & (1 << lit.index()) != 0) == lit.is_positive())
            })
        })
    }

    fn model_satisfies(formula: &CnfFormula, model: &[Lit]) -> bool {
        formula
            .iter()
            .all(|clause| clause.iter().any(|lit| model.contains(lit)))
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Unsat);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            prop_assert!(model_satisfies(&formula, &model));
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            prop_assert!(model_satisfies(&formula, &model));
        }

        #[test]
        fn agrees_with_brute_force(formula in vec_formula(1..8usize, 0..40, 0..5)) {
            let formula = CnfFormula::from(formula.iter().map(|clause| clause.iter().cloned()));

            let mut solver = Solver::new();
            solver.add_formula(&formula);

            let expected = if brute_force_satisfiable(&formula) {
                SolveResult::Sat
            } else {
                SolveResult::Unsat
            };

            prop_assert_eq!(solver.solve(), expected);

            if expected == SolveResult::Sat {
                let model = solver.model().unwrap();
                prop_assert!(model_satisfies(&formula, &model));
            }
        }

        #[test]
        fn glucose_restarts_and_tiny_reduce_limits(formula in sgen_unsat_formula(2..5usize)) {
            let mut config = SolverConfig::default();
            config.restart_policy = RestartPolicy::GlucoseEma;
            config.reduce_initial_limit = 10;
            config.random_phase_probability = 0.1;

            let mut solver = Solver::with_config(config);
            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Unsat);
        }

        #[test]
        fn deterministic_under_fixed_seed(formula in sat_formula(4..15usize, 20..80usize, 0.05..0.2, 0.9..1.0)) {
            let mut config = SolverConfig::default();
            config.random_phase_probability = 0.2;
            config.luby_base = 16;

            let mut solver_a = Solver::with_config(config.clone());
            let mut solver_b = Solver::with_config(config);

            solver_a.add_formula(&formula);
            solver_b.add_formula(&formula);

            prop_assert_eq!(solver_a.solve(), solver_b.solve());
            prop_assert_eq!(solver_a.model(), solver_b.model());

            let stats_a = solver_a.stats();
            let stats_b = solver_b.stats();
            prop_assert_eq!(stats_a.conflicts, stats_b.conflicts);
            prop_assert_eq!(stats_a.decisions, stats_b.decisions);
            prop_assert_eq!(stats_a.propagations, stats_b.propagations);
            prop_assert_eq!(stats_a.learned_clauses, stats_b.learned_clauses);
        }

        #[test]
        fn solve_under_assumptions(formula in sat_formula(4..15usize, 10..80usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();
            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            // Assuming literals of the model keeps the formula satisfiable.
            let some_model_lits: Vec<_> = model.iter().cloned().step_by(2).collect();
            prop_assert_eq!(
                solver.solve_with_assumptions(&some_model_lits).unwrap(),
                SolveResult::Sat
            );

            // Verdicts under assumptions do not stick to later plain solves.
            prop_assert_eq!(solver.solve(), SolveResult::Sat);
        }
    }

    #[test]
    fn unknown_variables_are_rejected() {
        let mut solver = Solver::new();
        let x = solver.new_var();
        let y = Var::from_index(5);

        let err = solver.add_clause(&[x.positive(), y.positive()]).unwrap_err();
        assert_eq!(err.lit, y.positive());

        // The rejected clause left no trace.
        assert!(solver.add_clause(&[x.positive()]).unwrap());
        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.model_value(x), Some(true));

        let err = solver
            .solve_with_assumptions(&[y.negative()])
            .unwrap_err();
        assert_eq!(err.lit, y.negative());
    }

    #[test]
    fn cancellation_returns_unknown() {
        let mut solver = Solver::new();

        let formula = vexsat_formula::cnf_formula![
            1, 2, 3;
            -1, -2;
            -2, -3;
            -1, -3;
        ];
        solver.add_formula(&formula);

        solver.cancel_flag().store(true, std::sync::atomic::Ordering::Relaxed);
        assert_eq!(solver.solve(), SolveResult::Unknown);

        solver.cancel_flag().store(false, std::sync::atomic::Ordering::Relaxed);
        assert_eq!(solver.solve(), SolveResult::Sat);
    }

    #[test]
    fn reset_keeps_configuration() {
        let mut config = SolverConfig::default();
        config.max_conflicts = Some(0);

        let mut solver = Solver::with_config(config);
        let x = solver.new_var();
        solver.add_clause(&[x.positive()]).unwrap();

        // The limit stops the search before the first step.
        assert_eq!(solver.solve(), SolveResult::Unknown);

        solver.reset();

        assert_eq!(solver.var_count(), 0);
        // The conflict limit survives the reset.
        assert_eq!(solver.solve(), SolveResult::Unknown);

        let mut config = SolverConfig::default();
        config.max_conflicts = None;
        solver.set_config(config);

        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.model(), Some(vec![]));
    }
}
