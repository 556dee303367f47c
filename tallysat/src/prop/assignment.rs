//! Partial assignment and backtracking.
use partial_ref::{partial, PartialRef};

use tallysat_formula::{Lit, LitIdx, Var};

use crate::clause::db;
use crate::context::{parts::*, Context};

use super::Reason;

/// Current partial assignment.
///
/// An unassigned variable is distinct from a variable assigned false.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.assignment.len()
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.assignment[lit.index()].is_none()
    }

    /// Assign the literal's variable so that the literal is true.
    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    /// Unassign a variable.
    pub fn clear_var(&mut self, var: Var) {
        self.assignment[var.index()] = None;
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all assignments in chronological order.
    trail: Vec<Lit>,
    /// Trail length at the time of each decision.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Number of assigned literals.
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    /// Whether no literal is assigned.
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// The most recently assigned literal.
    pub fn top(&self) -> Option<Lit> {
        self.trail.last().cloned()
    }

    /// Start a new decision level.
    ///
    /// Does not enqueue the decision itself.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }
}

/// Assign a literal true and push it onto the trail.
///
/// Records the decision level and antecedent in the implication graph and updates the counters
/// of every clause containing the variable. The literal has to be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut TrailP,
    ),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_is_unk(lit));
    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    trail.trail.push(lit);

    ctx.part_mut(ImplGraphP)
        .set_node(lit.var(), reason, trail.current_level());

    db::lit_assigned(ctx.borrow(), lit);
}

/// Undo all assignments in decision levels deeper than the given level.
pub fn backtrack(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut TrailP,
        mut VsidsP,
    ),
    level: usize,
) {
    let new_len = {
        let trail = ctx.part_mut(TrailP);
        if level == trail.current_level() {
            return;
        }
        let new_len = trail.decisions[level] as usize;
        trail.decisions.truncate(level);
        new_len
    };

    unwind_trail(ctx.borrow(), new_len);
}

/// Undo every assignment, including unit propagations at level 0.
pub fn full_unwind(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut TrailP,
        mut VsidsP,
    ),
) {
    ctx.part_mut(TrailP).decisions.clear();
    unwind_trail(ctx.borrow(), 0);
}

/// Pop trail entries down to the given length, undoing each assignment.
///
/// Retracting restores the counters and buckets of all affected clauses and re-enters the
/// variable into the branching queue.
fn unwind_trail(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut TrailP,
        mut VsidsP,
    ),
    new_len: usize,
) {
    while ctx.part(TrailP).len() > new_len {
        let lit = match ctx.part_mut(TrailP).trail.pop() {
            Some(lit) => lit,
            None => break,
        };
        db::lit_retracted(ctx.borrow(), lit);
        ctx.part_mut(AssignmentP).clear_var(lit.var());
        ctx.part_mut(VsidsP).make_available(lit.var());
    }
}
