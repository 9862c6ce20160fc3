//! Decision heuristics.

use partial_ref::{partial, PartialRef};

use vexsat_formula::Var;

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, Reason};

pub mod vsids;

/// Insert a variable into the decision heap if not already present.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}

/// Make a decision and enqueue it.
///
/// Branches on the unassigned variable with the highest activity. The polarity is the variable's
/// saved polarity, replaced by a random polarity with the configured probability.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        mut VsidsP,
        SolverConfigP,
    ),
) -> bool {
    let (config, mut ctx) = ctx.split_part(SolverConfigP);

    let decision_var = loop {
        match ctx.part_mut(VsidsP).next() {
            None => return false,
            Some(var) => {
                // Entries of assigned variables are removed lazily.
                if ctx.part(AssignmentP).var_value(var).is_none() {
                    break var;
                }
            }
        }
    };

    let vsids = ctx.part_mut(VsidsP);

    let polarity = if config.random_phase_probability > 0.0
        && vsids.next_random() < config.random_phase_probability
    {
        ctx.part_mut(StatsP).random_decisions += 1;
        ctx.part_mut(VsidsP).next_random() < 0.5
    } else if config.phase_saving {
        ctx.part(AssignmentP).last_var_value(decision_var)
    } else {
        false
    };

    ctx.part_mut(TrailP).new_decision_level();
    ctx.part_mut(StatsP).decisions += 1;

    enqueue_assignment(ctx.borrow(), decision_var.lit(polarity), Reason::Unit);

    true
}
