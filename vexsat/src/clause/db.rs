//! Database for long clauses.
use partial_ref::{partial, PartialRef};

use vexsat_formula::Lit;

use crate::context::{parts::*, Context};

use super::header::HEADER_LEN;
use super::{ClauseHeader, ClauseRef};

/// Database for long clauses.
///
/// Removal of clauses from the `clauses` and `redundant` lists can be delayed, so the clause
/// header's deleted flag needs to be checked when iterating over them. The live counts are always
/// up to date.
#[derive(Default)]
pub struct ClauseDb {
    /// All long clauses, may contain deleted clauses, see above.
    pub(super) clauses: Vec<ClauseRef>,
    /// Learned long clauses, may contain deleted clauses, see above.
    pub(super) redundant: Vec<ClauseRef>,
    /// Number of live irredundant long clauses.
    pub(super) irredundant_count: usize,
    /// Number of live redundant long clauses.
    pub(super) redundant_count: usize,
    /// Size of deleted but not collected clauses.
    pub(super) garbage_size: usize,
}

impl ClauseDb {
    /// All long clauses, including lazily deleted ones.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    /// The number of live irredundant long clauses.
    pub fn irredundant_count(&self) -> usize {
        self.irredundant_count
    }

    /// The number of live redundant long clauses.
    pub fn redundant_count(&self) -> usize {
        self.redundant_count
    }
}

/// Add a long clause to the database.
///
/// When the watchlists are enabled the first two literals of the clause become its watches.
pub fn add_long_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let redundant = header.redundant();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    let db = ctx.part_mut(ClauseDbP);

    db.clauses.push(cref);
    if redundant {
        db.redundant.push(cref);
        db.redundant_count += 1;
    } else {
        db.irredundant_count += 1;
    }

    let watchlists = ctx.part_mut(WatchlistsP);
    if watchlists.enabled() {
        watchlists.watch_clause(cref, [lits[0], lits[1]]);
    }

    cref
}

/// Delete a long clause from the database.
///
/// This only marks the clause's header. The arena bytes stay in place until the next garbage
/// collection and any watchlist entries are dropped lazily during propagation.
pub fn delete_clause(mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP), cref: ClauseRef) {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let db = ctx.part_mut(ClauseDbP);

    let header = alloc.header_mut(cref);

    debug_assert!(
        !header.deleted(),
        "delete_clause for already deleted clause"
    );

    header.set_deleted(true);

    if header.redundant() {
        db.redundant_count -= 1;
    } else {
        db.irredundant_count -= 1;
    }

    db.garbage_size += header.len() + HEADER_LEN;
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use vexsat_formula::cnf_formula;

    #[test]
    fn add_and_delete_bookkeeping() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            4, -5, 6;
            -2, 3, -4;
            -3, 5, 2, 7, 5;
        ];

        let mut crefs = vec![];

        for (index, clause) in clauses.iter().enumerate() {
            let mut header = ClauseHeader::new();
            header.set_redundant(index >= 2);
            let cref = add_long_clause(ctx.borrow(), header, clause);
            crefs.push(cref);
        }

        assert_eq!(ctx.part(ClauseDbP).irredundant_count(), 2);
        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 2);

        delete_clause(ctx.borrow(), crefs[0]);
        delete_clause(ctx.borrow(), crefs[3]);

        assert_eq!(ctx.part(ClauseDbP).irredundant_count(), 1);
        assert_eq!(ctx.part(ClauseDbP).redundant_count(), 1);

        assert!(ctx.part(ClauseDbP).garbage_size > 0);
        assert!(ctx.part(ClauseAllocP).header(crefs[0]).deleted());
        assert!(!ctx.part(ClauseAllocP).header(crefs[1]).deleted());

        // The ref lists are allowed to keep deleted entries around.
        assert_eq!(ctx.part(ClauseDbP).clauses().len(), 4);
    }
}
