//! Internal consistency checks used by tests.
use partial_ref::{partial, PartialRef};

use crate::clause::Status;
use crate::context::{parts::*, Context};

/// Recompute every clause's counters from the assignment and assert that the counters, the
/// recorded status and the bucket membership all agree.
pub fn check_state(ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP)) {
    let assignment = ctx.part(AssignmentP);
    let alloc = ctx.part(ClauseAllocP);
    let db = ctx.part(ClauseDbP);

    assert_eq!(alloc.len(), db.clauses().len());
    assert_eq!(
        db.clauses()
            .iter()
            .filter(|&&cref| !alloc.clause(cref).is_learned())
            .count(),
        db.input_clause_count()
    );

    let mut bucketed = 0;
    for &status in [
        Status::Satisfied,
        Status::Contradiction,
        Status::Unit,
        Status::Unresolved,
    ]
    .iter()
    {
        bucketed += db.bucket(status).len();
    }
    assert_eq!(bucketed, db.clauses().len());

    for &cref in db.clauses() {
        let clause = alloc.clause(cref);

        let mut n_sat = 0;
        let mut n_yet = 0;
        let mut n_false = 0;
        for &lit in clause.lits() {
            match assignment.lit_value(lit) {
                Some(true) => n_sat += 1,
                Some(false) => n_false += 1,
                None => n_yet += 1,
            }
        }
        assert_eq!(n_sat + n_yet + n_false, clause.len());

        assert_eq!(
            clause.n_sat(),
            n_sat,
            "stale n_sat for clause {:?}",
            clause.lits()
        );
        assert_eq!(
            clause.n_yet(),
            n_yet,
            "stale n_yet for clause {:?}",
            clause.lits()
        );

        let status = Status::of_counts(n_sat, n_yet);
        assert_eq!(
            clause.status(),
            status,
            "stale status for clause {:?}",
            clause.lits()
        );
        assert_eq!(
            db.bucket(status).get(clause.bucket_pos),
            Some(&cref),
            "clause {:?} is not in the bucket it claims",
            clause.lits()
        );
    }
}
