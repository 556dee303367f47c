//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use tallysat_formula::Lit;

use crate::clause::db;
use crate::context::{parts::*, Context};
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// The clause is stored verbatim: literals are not deduplicated and clauses that are already
/// satisfied or falsified are kept like any other. A repeated literal within the clause is a
/// malformed input and panics; a complementary pair is allowed.
///
/// Does not adjust the solver's variable count. If necessary that has to be done before calling
/// this.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut SolverStateP,
        mut TmpDataP,
        mut VsidsP,
        AssignmentP,
    ),
    lits: &[Lit],
) {
    match ctx.part(SolverStateP).sat_state {
        SatState::Unsat => return,
        SatState::Sat => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unknown;
        }
        SatState::Unknown => {}
    }

    db::add_clause(ctx.borrow(), lits, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use tallysat_formula::lits;

    use crate::clause::Status;
    use crate::context::set_var_count;

    #[test]
    fn empty_clause_is_an_immediate_contradiction() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &[]);

        assert!(ctx.part(ClauseDbP).contradiction().is_some());
    }

    #[test]
    fn clauses_are_stored_verbatim() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1, 2, 3]);
        load_clause(ctx.borrow(), &lits![1, 2, 3]);
        load_clause(ctx.borrow(), &lits![4, -4]);

        let db = ctx.part(ClauseDbP);
        assert_eq!(db.clauses().len(), 3);
        assert_eq!(db.input_clause_count(), 3);

        let alloc = ctx.part(ClauseAllocP);
        assert_eq!(alloc.clause(db.clauses()[2]).status(), Status::Unresolved);
    }
}
