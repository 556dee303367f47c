//! Conflict driven clause learning.
//!
//! The driver is a three-state loop: propagate a forced assignment, branch on an unassigned
//! variable, or analyze a conflict and backtrack. Each [`search_step`] call performs exactly one
//! transition, inspecting only the aggregate state of the clause database.

use log::debug;
use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::db;
use crate::context::{parts::*, Context};
use crate::decision::make_decision;
use crate::model::save_model;
use crate::prop::{backtrack, enqueue_assignment, full_unwind, Reason};
use crate::state::SatState;

/// Advance the search by one step.
///
/// Terminal steps store the outcome in the solver state and fully unwind the trail, so that the
/// database is left without any assignment. Learned clauses stay behind.
pub fn search_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut ModelP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        SolverConfigP,
    ),
) {
    if ctx.part(ClauseDbP).is_satisfied() {
        found_sat(ctx.borrow());
        return;
    }

    if let Some(conflict) = ctx.part(ClauseDbP).contradiction() {
        ctx.part_mut(SolverStateP).conflicts += 1;

        let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

        if backtrack_to == 0 {
            full_unwind(ctx.borrow());
            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
            return;
        }

        // The learned clause is contradicted at every level from the backtrack level upwards,
        // so unwind past all of them before adding it.
        backtrack(ctx.borrow(), backtrack_to - 1);

        let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
        debug!(
            "conflict {}: learned {:?}",
            ctx.part(SolverStateP).conflicts,
            analyze.clause()
        );
        db::add_clause(ctx.borrow(), analyze.clause(), true);
        return;
    }

    if let Some((lit, cref)) = db::find_unit(ctx.borrow()) {
        enqueue_assignment(ctx.borrow(), lit, Reason::Clause(cref));
        return;
    }

    if !make_decision(ctx.borrow()) {
        // Every variable is assigned and nothing is contradicted, so all clauses are satisfied.
        found_sat(ctx.borrow());
    }
}

/// Snapshot the model and finish with a satisfiable outcome.
fn found_sat(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ModelP,
        mut SolverStateP,
        mut TrailP,
        mut VsidsP,
    ),
) {
    save_model(ctx.borrow());
    full_unwind(ctx.borrow());
    ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
}
