//! Clause database reduction.
use std::cmp::Reverse;
use std::mem::replace;

use ordered_float::OrderedFloat;
use partial_ref::{partial, PartialRef};
use vec_mut_scan::VecMutScan;

use crate::context::{parts::*, Context};
use crate::prop::Reason;

use super::db;

/// Set or clear the mark bit on every clause referenced as a reason on the trail.
///
/// Marked clauses must not be deleted while the referencing assignment is on the trail.
fn mark_reason_clauses(
    mut ctx: partial!(Context, mut ClauseAllocP, ImplGraphP, TrailP),
    mark: bool,
) {
    let (trail, mut ctx) = ctx.split_part(TrailP);
    let (alloc, ctx) = ctx.split_part_mut(ClauseAllocP);
    let impl_graph = ctx.part(ImplGraphP);

    for &lit in trail.trail().iter() {
        if let &Reason::Long(cref) = impl_graph.reason(lit.var()) {
            alloc.header_mut(cref).set_mark(mark);
        }
    }
}

/// Delete about half of the redundant clauses, keeping those most likely to be useful.
///
/// Clauses with a glue at or below the configured threshold are kept unconditionally, as are
/// clauses currently acting as a reason on the trail. Watchlist entries of deleted clauses are
/// dropped lazily during subsequent propagation.
pub fn reduce(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut StatsP,
        ImplGraphP,
        SolverConfigP,
        TrailP,
    ),
) {
    mark_reason_clauses(ctx.borrow(), true);

    let mut redundant = replace(&mut ctx.part_mut(ClauseDbP).redundant, vec![]);

    {
        let alloc = ctx.part(ClauseAllocP);

        // Drop refs of clauses deleted in earlier passes.
        redundant.retain(|&cref| !alloc.header(cref).deleted());

        // Worst clauses first: high glue, low activity.
        redundant.sort_unstable_by_key(|&cref| {
            let header = alloc.header(cref);
            (Reverse(header.glue()), OrderedFloat(header.activity()))
        });
    }

    let glue_limit = ctx.part(SolverConfigP).glue_lbd_threshold;
    let mut to_delete = redundant.len() / 2;

    let mut scan = VecMutScan::new(&mut redundant);

    if to_delete > 0 {
        while let Some(cref) = scan.next() {
            let header = ctx.part(ClauseAllocP).header(*cref);
            if header.glue() <= glue_limit || header.mark() {
                continue;
            }

            db::delete_clause(ctx.borrow(), cref.remove());
            ctx.part_mut(StatsP).deleted_clauses += 1;

            to_delete -= 1;
            if to_delete == 0 {
                break;
            }
        }
    }

    drop(scan);

    ctx.part_mut(ClauseDbP).redundant = redundant;

    mark_reason_clauses(ctx.borrow(), false);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use vexsat_formula::Lit;

    use crate::clause::ClauseHeader;
    use crate::context::set_var_count;
    use crate::prop::enqueue_assignment;

    #[test]
    fn keeps_reasons_and_low_glue_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 40);

        let mut crefs = vec![];

        for i in 0..10isize {
            let lits: Vec<Lit> = (0..3)
                .map(|j| Lit::from_dimacs(1 + i + 10 * j))
                .collect();
            let mut header = ClauseHeader::new();
            header.set_redundant(true);
            header.set_glue(if i == 0 { 2 } else { 3 + i as usize });
            let cref = db::add_long_clause(ctx.borrow(), header, &lits);
            crefs.push(cref);
        }

        // The clause with the worst glue acts as a reason and must survive.
        let reason_cref = crefs[9];
        let reason_lit = ctx.part(ClauseAllocP).clause(reason_cref).lits()[0];
        enqueue_assignment(ctx.borrow(), reason_lit, Reason::Long(reason_cref));

        reduce(ctx.borrow());

        assert!(!ctx.part(ClauseAllocP).header(crefs[0]).deleted());
        assert!(!ctx.part(ClauseAllocP).header(reason_cref).deleted());
        assert!(!ctx.part(ClauseAllocP).header(reason_cref).mark());

        let deleted = crefs
            .iter()
            .filter(|&&cref| ctx.part(ClauseAllocP).header(cref).deleted())
            .count();
        assert_eq!(deleted, 5);
        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 5);
        assert_eq!(ctx.part(StatsP).deleted_clauses, 5);

        // The worst unprotected clauses are the ones that went away.
        assert!(ctx.part(ClauseAllocP).header(crefs[8]).deleted());
        assert!(!ctx.part(ClauseAllocP).header(crefs[1]).deleted());
    }
}
