//! Propagation of long clauses.
use partial_ref::{partial, PartialRef};

use vexsat_formula::Lit;

use crate::context::{parts::*, Context};

use super::enqueue_assignment;
use super::{Conflict, Reason, Watch};

/// Propagate all literals implied by long clauses watched by the given literal.
///
/// On conflict return the clause propagating the conflicting assignment.
///
/// See [`prop::watch`](crate::prop::watch) for the invariants that this has to uphold.
///
/// The watch list of the propagating literal is taken out of the watch index for the duration of
/// the scan and written back compacted. Entries are kept, rewritten with a fresh blocking literal,
/// or dropped when the watch moves to another literal or the clause turned out to be deleted.
pub fn propagate_long(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    let false_lit = !lit;

    let mut watches = watchlists.take_watched_by(lit);
    let len = watches.len();

    let mut read = 0;
    let mut write = 0;

    let mut result = Ok(());

    'watchers: while read != len {
        let watch = watches[read];
        read += 1;

        // If the blocking literal (which is part of the watched clause) is already true, the
        // watched clause is satisfied and we don't even have to look at it.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            watches[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;

        // Deleted clauses are unwatched lazily, their entries are simply dropped.
        if alloc.header(cref).deleted() {
            continue;
        }

        let clause = alloc.clause_mut(cref);
        let clause_len = clause.header().len();
        let lits = clause.lits_mut();

        // First we ensure that the literal we're currently propagating is at index 1. This
        // prepares the literal order for further propagations, as the propagating literal has to
        // be at index 0.
        if lits[0] == false_lit {
            lits.swap(0, 1);
        }

        let first = lits[0];

        // We create a new watch with the other watched literal as blocking literal. This will
        // either replace the currently processed watch or be added to another literal's watch
        // list.
        let new_watch = Watch {
            cref,
            blocking: first,
        };

        // If the other watched literal (now the first) isn't the blocking literal, check whether
        // that one is true. If so nothing else needs to be done.
        if first != watch.blocking && ctx.part(AssignmentP).lit_is_true(first) {
            watches[write] = new_watch;
            write += 1;
            continue;
        }

        // At this point we try to find a non-false unwatched literal to replace our current
        // literal as the watched literal.
        for pos in 2..clause_len {
            let rest_lit = lits[pos];
            if !ctx.part(AssignmentP).lit_is_false(rest_lit) {
                // We found a non-false literal and make it a watched literal by reordering the
                // literals and adding the watch to the corresponding watchlist.
                lits[1] = rest_lit;
                lits[pos] = false_lit;

                // The watch moves to a different literal's list, so taking our own list out of
                // the index cannot hide it.
                debug_assert_ne!(!rest_lit, lit);
                watchlists.add_watch(!rest_lit, new_watch);
                continue 'watchers;
            }
        }

        // We didn't find a non-false unwatched literal, so either we're propagating or we have a
        // conflict.
        watches[write] = new_watch;
        write += 1;

        // If the other watched literal is false we have a conflict.
        if ctx.part(AssignmentP).lit_is_false(first) {
            // Move all unprocessed watches and stop propagating.
            while read != len {
                watches[write] = watches[read];
                write += 1;
                read += 1;
            }
            result = Err(Conflict::Long(cref));
            break;
        }

        // Otherwise we enqueue a new propagation.
        enqueue_assignment(ctx.borrow(), first, Reason::Long(cref));
    }

    watches.truncate(write);
    watchlists.restore_watched_by(lit, watches);

    result
}
