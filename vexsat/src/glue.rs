//! Compute glue levels of clauses.
//!
//! The glue level of a propagating clause is the number of distinct decision levels of the
//! clause's variables. This is also called the literal block distance (LBD). Low glue clauses
//! connect few decision levels and are empirically the most valuable learned clauses.

use partial_ref::{partial, PartialRef};

use vexsat_formula::Lit;

use crate::context::{parts::*, Context};

/// Compute the glue level of a clause.
pub fn compute_glue(mut ctx: partial!(Context, mut TmpDataP, ImplGraphP), lits: &[Lit]) -> usize {
    let (tmp_data, ctx) = ctx.split_part_mut(TmpDataP);
    let impl_graph = ctx.part(ImplGraphP);
    let flags = &mut tmp_data.flags;

    let mut glue = 0;

    for &lit in lits {
        let level = impl_graph.level(lit.var());
        let flag = &mut flags[level];
        if !*flag {
            *flag = true;
            glue += 1
        }
    }

    for &lit in lits {
        let level = impl_graph.level(lit.var());
        flags[level] = false;
    }

    glue
}

/// Assess a newly learned clause and generate its clause header.
///
/// The glue is the number of distinct decision levels among the clause's literals at the moment
/// the clause was learned. The implication graph still holds the conflict-time level of the
/// asserting literal's variable, so this can be computed after backjumping.
pub fn assess_learned_clause(
    mut ctx: partial!(Context, mut TmpDataP, ImplGraphP),
    lits: &[Lit],
) -> crate::clause::ClauseHeader {
    let glue = compute_glue(ctx.borrow(), lits);

    let mut header = crate::clause::ClauseHeader::new();

    header.set_redundant(true);
    header.set_glue(glue);

    header
}
