//! Clause database with status buckets and occurrence lists.
use partial_ref::{partial, PartialRef};

use tallysat_formula::Lit;

use crate::context::{parts::*, Context};

use super::{ClauseAlloc, ClauseRef, Status};

/// Bucketed clause index.
///
/// Every clause is a member of exactly one bucket, the one matching its recorded status. Buckets
/// are unordered: removal swaps the last element into the vacated slot and updates that clause's
/// stored position, keeping insert, remove and "any element" O(1).
#[derive(Default)]
pub struct ClauseDb {
    /// One bucket of clause refs per status.
    buckets: [Vec<ClauseRef>; Status::count()],
    /// For each literal code, the clauses containing that literal.
    ///
    /// Entries are added on clause insertion and never removed.
    occurrence: Vec<Vec<ClauseRef>>,
    /// All clauses in insertion order.
    clauses: Vec<ClauseRef>,
    /// Number of input (non-learned) clauses.
    input_clauses: usize,
}

impl ClauseDb {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        if self.occurrence.len() < count * 2 {
            self.occurrence.resize(count * 2, vec![]);
        }
    }

    /// Whether every clause is currently satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.buckets[Status::Contradiction.index()].is_empty()
            && self.buckets[Status::Unit.index()].is_empty()
            && self.buckets[Status::Unresolved.index()].is_empty()
    }

    /// Some currently contradicted clause, if there is one.
    pub fn contradiction(&self) -> Option<ClauseRef> {
        self.buckets[Status::Contradiction.index()].last().cloned()
    }

    /// Some currently unit clause, if there is one.
    pub fn unit(&self) -> Option<ClauseRef> {
        self.buckets[Status::Unit.index()].last().cloned()
    }

    /// Some clause that is neither satisfied, contradicted nor unit, if there is one.
    pub fn unresolved(&self) -> Option<ClauseRef> {
        self.buckets[Status::Unresolved.index()].first().cloned()
    }

    /// All clauses in insertion order.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }

    /// Number of clauses that were added as input rather than learned.
    pub fn input_clause_count(&self) -> usize {
        self.input_clauses
    }

    /// The clauses currently filed under the given status.
    #[cfg(test)]
    pub(crate) fn bucket(&self, status: Status) -> &[ClauseRef] {
        &self.buckets[status.index()]
    }

    /// File a clause under the given status.
    fn bucket_insert(&mut self, alloc: &mut ClauseAlloc, cref: ClauseRef, status: Status) {
        let bucket = &mut self.buckets[status.index()];
        let clause = alloc.clause_mut(cref);
        clause.status = status;
        clause.bucket_pos = bucket.len();
        bucket.push(cref);
    }

    /// Remove a clause from the bucket it is currently filed under.
    fn bucket_remove(&mut self, alloc: &mut ClauseAlloc, cref: ClauseRef) {
        let (status, pos) = {
            let clause = alloc.clause(cref);
            (clause.status, clause.bucket_pos)
        };
        let bucket = &mut self.buckets[status.index()];
        bucket.swap_remove(pos);
        if let Some(&moved) = bucket.get(pos) {
            alloc.clause_mut(moved).bucket_pos = pos;
        }
    }

    /// Refile a clause whose counters changed.
    fn update_status(&mut self, alloc: &mut ClauseAlloc, cref: ClauseRef) {
        let clause = alloc.clause(cref);
        let status = Status::of_counts(clause.n_sat(), clause.n_yet());
        if status != clause.status {
            self.bucket_remove(alloc, cref);
            self.bucket_insert(alloc, cref, status);
        }
    }
}

/// Add a clause to the database.
///
/// The counters are initialized against the current assignment, so a clause whose literals are
/// all falsified is filed as a contradiction right away. The branching score of every literal in
/// the clause is bumped.
///
/// A repeated literal within the clause is a malformed input and panics. A pair of complementary
/// literals is allowed and makes the clause trivially satisfiable.
pub fn add_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut TmpDataP,
        mut VsidsP,
        AssignmentP,
    ),
    lits: &[Lit],
    learned: bool,
) -> ClauseRef {
    let (tmp, mut ctx) = ctx.split_part_mut(TmpDataP);
    for &lit in lits {
        assert!(!tmp.flags[lit.code()], "repeated literal {} in clause", lit);
        tmp.flags[lit.code()] = true;
    }
    for &lit in lits {
        tmp.flags[lit.code()] = false;
    }

    let mut n_sat = 0;
    let mut n_yet = 0;
    for &lit in lits {
        match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => n_sat += 1,
            Some(false) => (),
            None => n_yet += 1,
        }
    }

    let (db, mut ctx) = ctx.split_part_mut(ClauseDbP);
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    let cref = alloc.add_clause(lits, learned);
    {
        let clause = alloc.clause_mut(cref);
        clause.n_sat = n_sat;
        clause.n_yet = n_yet;
    }
    db.bucket_insert(alloc, cref, Status::of_counts(n_sat as usize, n_yet as usize));

    for &lit in lits {
        db.occurrence[lit.code()].push(cref);
    }
    db.clauses.push(cref);
    if !learned {
        db.input_clauses += 1;
    }

    for &lit in lits {
        ctx.part_mut(VsidsP).bump(lit);
    }

    cref
}

/// Update counters and buckets after `lit` was assigned true.
///
/// Clauses containing `lit` gain a satisfied literal, clauses containing `!lit` lose an
/// unassigned one; both lose a degree of freedom.
pub fn lit_assigned(mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP), lit: Lit) {
    let (db, mut ctx) = ctx.split_part_mut(ClauseDbP);
    let alloc = ctx.part_mut(ClauseAllocP);

    for i in 0..db.occurrence[lit.code()].len() {
        let cref = db.occurrence[lit.code()][i];
        {
            let clause = alloc.clause_mut(cref);
            clause.n_sat += 1;
            debug_assert!(clause.n_yet > 0);
            clause.n_yet -= 1;
        }
        db.update_status(alloc, cref);
    }

    for i in 0..db.occurrence[(!lit).code()].len() {
        let cref = db.occurrence[(!lit).code()][i];
        {
            let clause = alloc.clause_mut(cref);
            debug_assert!(clause.n_yet > 0);
            clause.n_yet -= 1;
        }
        db.update_status(alloc, cref);
    }
}

/// Update counters and buckets after the assignment of `lit` was undone.
///
/// Exact inverse of [`lit_assigned`], restoring the counters and buckets to their previous
/// state.
pub fn lit_retracted(mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP), lit: Lit) {
    let (db, mut ctx) = ctx.split_part_mut(ClauseDbP);
    let alloc = ctx.part_mut(ClauseAllocP);

    for i in 0..db.occurrence[lit.code()].len() {
        let cref = db.occurrence[lit.code()][i];
        {
            let clause = alloc.clause_mut(cref);
            debug_assert!(clause.n_sat > 0);
            clause.n_sat -= 1;
            clause.n_yet += 1;
        }
        db.update_status(alloc, cref);
    }

    for i in 0..db.occurrence[(!lit).code()].len() {
        let cref = db.occurrence[(!lit).code()][i];
        {
            let clause = alloc.clause_mut(cref);
            clause.n_yet += 1;
        }
        db.update_status(alloc, cref);
    }
}

/// Some unit clause together with its single unassigned literal.
pub fn find_unit(
    ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP),
) -> Option<(Lit, ClauseRef)> {
    let cref = ctx.part(ClauseDbP).unit()?;
    let assignment = ctx.part(AssignmentP);
    let clause = ctx.part(ClauseAllocP).clause(cref);
    debug_assert!(!clause.lits().iter().any(|&lit| assignment.lit_is_true(lit)));
    for &lit in clause.lits() {
        if assignment.lit_is_unk(lit) {
            return Some((lit, cref));
        }
    }
    unreachable!("unit clause without an unassigned literal");
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use tallysat_formula::{lit, lits};

    use crate::context::set_var_count;

    #[test]
    fn status_on_insertion() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        let long = add_clause(ctx.borrow(), &lits![1, 2, 3], false);
        let unit = add_clause(ctx.borrow(), &lits![-2], false);
        let empty = add_clause(ctx.borrow(), &[], false);

        let alloc = ctx.part(ClauseAllocP);
        assert_eq!(alloc.clause(long).status(), Status::Unresolved);
        assert_eq!(alloc.clause(unit).status(), Status::Unit);
        assert_eq!(alloc.clause(empty).status(), Status::Contradiction);

        assert!(!ctx.part(ClauseDbP).is_satisfied());
        assert_eq!(ctx.part(ClauseDbP).contradiction(), Some(empty));
        assert_eq!(ctx.part(ClauseDbP).input_clause_count(), 3);
    }

    #[test]
    fn complementary_pair_is_allowed() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        let cref = add_clause(ctx.borrow(), &lits![1, -1], false);
        assert_eq!(ctx.part(ClauseAllocP).clause(cref).n_yet(), 2);
    }

    #[test]
    #[should_panic(expected = "repeated literal")]
    fn repeated_literal_panics() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        add_clause(ctx.borrow(), &lits![1, 2, 1], false);
    }

    #[test]
    fn counters_follow_assignments() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        let cref = add_clause(ctx.borrow(), &lits![1, -2, 3], false);

        ctx.part_mut(AssignmentP).assign_lit(lit!(2));
        lit_assigned(ctx.borrow(), lit!(2));

        {
            let clause = ctx.part(ClauseAllocP).clause(cref);
            assert_eq!(clause.n_sat(), 0);
            assert_eq!(clause.n_yet(), 2);
            assert_eq!(clause.status(), Status::Unresolved);
        }

        ctx.part_mut(AssignmentP).assign_lit(lit!(-1));
        lit_assigned(ctx.borrow(), lit!(-1));

        assert_eq!(ctx.part(ClauseAllocP).clause(cref).status(), Status::Unit);
        assert_eq!(ctx.part(ClauseDbP).unit(), Some(cref));

        ctx.part_mut(AssignmentP).assign_lit(lit!(-3));
        lit_assigned(ctx.borrow(), lit!(-3));

        assert_eq!(
            ctx.part(ClauseAllocP).clause(cref).status(),
            Status::Contradiction
        );

        lit_retracted(ctx.borrow(), lit!(-3));
        ctx.part_mut(AssignmentP).clear_var(lit!(3).var());

        assert_eq!(ctx.part(ClauseAllocP).clause(cref).status(), Status::Unit);

        crate::check::check_state(ctx.borrow());
    }
}
