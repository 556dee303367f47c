//! Branching heuristics.
//!
//! The driver only requires that a decision assigns an unassigned variable. Two strategies are
//! implemented: a priority queue over literal activities (the default, see
//! [`vsids`](crate::decision::vsids)) and a structural fallback that branches into an
//! unresolved clause.
use partial_ref::{partial, PartialRef};

use tallysat_formula::Lit;

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, Reason};

pub mod vsids;

/// Pick a branching literal and enqueue it at a new decision level.
///
/// Returns `false` if no decision was made because no clause is left unresolved.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut TrailP,
        mut VsidsP,
        SolverConfigP,
    ),
) -> bool {
    let decision = if ctx.part(SolverConfigP).structural_branching {
        structural_branch(ctx.borrow())
    } else {
        vsids_branch(ctx.borrow())
    };

    let decision = match decision {
        Some(lit) => lit,
        None => return false,
    };

    ctx.part_mut(TrailP).new_decision_level();
    enqueue_assignment(ctx.borrow(), decision, Reason::Decision);

    true
}

/// The highest scoring literal whose variable is unassigned.
fn vsids_branch(mut ctx: partial!(Context, mut VsidsP, AssignmentP)) -> Option<Lit> {
    while let Some(lit) = ctx.part_mut(VsidsP).next() {
        if ctx.part(AssignmentP).lit_is_unk(lit) {
            return Some(lit);
        }
    }
    None
}

/// Branch into an unresolved clause.
///
/// Within the clause the minority polarity among the unassigned literals is preferred: when the
/// clause has at most one unassigned positive literal and at least one unassigned negative one,
/// a negative literal is picked, otherwise a positive one.
fn structural_branch(ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP)) -> Option<Lit> {
    let cref = ctx.part(ClauseDbP).unresolved()?;

    let assignment = ctx.part(AssignmentP);
    let clause = ctx.part(ClauseAllocP).clause(cref);

    let mut free_pos = None;
    let mut free_neg = None;
    let mut pos_count = 0;

    for &lit in clause.lits() {
        if !assignment.lit_is_unk(lit) {
            continue;
        }
        if lit.is_positive() {
            pos_count += 1;
            free_pos = free_pos.or(Some(lit));
        } else {
            free_neg = free_neg.or(Some(lit));
        }
    }

    if pos_count <= 1 && free_neg.is_some() {
        free_neg
    } else {
        free_pos.or(free_neg)
    }
}
