//! Learns a new clause by analyzing a conflict.
use partial_ref::{partial, PartialRef};

use tallysat_formula::{Lit, Var};

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};
use crate::prop::Reason;

/// Temporaries for conflict analysis.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// This is the learned clause after analysis finishes.
    clause: Vec<Lit>,
    /// Variables already seeded into or expanded from the frontier.
    seen: Vec<bool>,
    /// Entries to clean in `seen`.
    to_clean: Vec<Var>,
    /// Assigned variables waiting to be emitted or expanded.
    frontier: Vec<Var>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.seen.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Mark a variable as seen without scheduling it for processing.
    fn mark_seen(&mut self, var: Var) {
        if !self.seen[var.index()] {
            self.seen[var.index()] = true;
            self.to_clean.push(var);
        }
    }

    /// Schedule a variable for processing unless it was already seen.
    fn seed(&mut self, var: Var) {
        if !self.seen[var.index()] {
            self.seen[var.index()] = true;
            self.to_clean.push(var);
            self.frontier.push(var);
        }
    }
}

/// Learns a new clause by resolution over the implication graph.
///
/// Starting from the variables of a contradicted clause, every variable propagated at the
/// current decision level is replaced by the other variables of its antecedent, until only
/// decisions and assignments from earlier levels remain. Their negations form the learned
/// clause: the conjunction of those assignments implies the conflict, so the clause is entailed
/// by the database and falsified by the current assignment.
///
/// Returns the backtrack level: the highest decision level among the learned literals. A result
/// of 0 means the conflict does not depend on any decision and the formula is unsatisfiable.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut VsidsP,
        AssignmentP,
        ClauseAllocP,
        ImplGraphP,
        TrailP,
    ),
    conflict: ClauseRef,
) -> usize {
    {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        analyze.clause.clear();
        analyze.frontier.clear();
        for var in analyze.to_clean.drain(..) {
            analyze.seen[var.index()] = false;
        }
    }

    let current_level = ctx.part(TrailP).current_level();
    if current_level == 0 {
        // Conflict with no decisions, the learned clause is empty.
        return 0;
    }

    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let assignment = ctx.part(AssignmentP);
    let alloc = ctx.part(ClauseAllocP);
    let graph = ctx.part(ImplGraphP);

    let top = match ctx.part(TrailP).top() {
        Some(lit) => lit,
        None => return 0,
    };

    debug_assert!(alloc
        .clause(conflict)
        .lits()
        .iter()
        .any(|lit| lit.var() == top.var()));

    let mut backtrack_to = 0;

    // The most recently assigned variable is never emitted itself. Its antecedent joins the
    // frontier; if it was a decision, its negation opens the learned clause.
    analyze.mark_seen(top.var());

    for &lit in alloc.clause(conflict).lits() {
        analyze.seed(lit.var());
    }

    match graph.reason(top.var()) {
        Reason::Decision => {
            analyze.clause.push(!top);
            backtrack_to = graph.level(top.var());
        }
        Reason::Clause(cref) => {
            for &lit in alloc.clause(cref).lits() {
                if lit.var() != top.var() {
                    analyze.seed(lit.var());
                }
            }
        }
    }

    while let Some(var) = analyze.frontier.pop() {
        let reason = graph.reason(var);

        if graph.level(var) < current_level || reason == Reason::Decision {
            // A decision or an assignment from an earlier level ends up in the learned clause.
            if let Some(value) = assignment.var_value(var) {
                analyze.clause.push(Lit::from_var(var, !value));
                backtrack_to = backtrack_to.max(graph.level(var));
            }
        } else if let Reason::Clause(cref) = reason {
            for &lit in alloc.clause(cref).lits() {
                analyze.seed(lit.var());
            }
        }
    }

    ctx.part_mut(VsidsP).decay();

    backtrack_to
}
