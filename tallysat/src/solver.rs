//! Boolean satisfiability solver.
use std::io;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;

use tallysat_dimacs::DimacsParser;
use tallysat_formula::{CnfFormula, Lit, Var};

use crate::cdcl::search_step;
use crate::config::SolverConfig;
use crate::context::{config_changed, ensure_var_count, parts::*, Context};
use crate::load::load_clause;
use crate::state::SatState;

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Change the solver configuration.
    pub fn config(&mut self, config: SolverConfig) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        *ctx.part_mut(SolverConfigP) = config;
        config_changed(ctx.borrow());
    }

    /// Add a single clause to the formula.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        let var_count = lits.iter().map(|lit| lit.index() + 1).max().unwrap_or(0);
        ensure_var_count(ctx.borrow(), var_count);
        load_clause(ctx.borrow(), lits);
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Check the satisfiability of the current formula.
    ///
    /// When this returns `true` a satisfying assignment is available through
    /// [`model`](Solver::model). Every assignment made during the search is undone before
    /// returning; learned clauses are kept and prune later searches.
    pub fn solve(&mut self) -> bool {
        let mut ctx = self.ctx.into_partial_ref_mut();

        let conflicts_before = ctx.part(SolverStateP).conflicts;
        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            search_step(ctx.borrow());
        }

        let state = ctx.part(SolverStateP);
        info!(
            "solve finished: {:?} after {} conflicts",
            state.sat_state,
            state.conflicts - conflicts_before
        );
        state.sat_state == SatState::Sat
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Contains one literal for every variable the solver knows about. Only available after a
    /// [`solve`](Solver::solve) call returned `true`.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state != SatState::Sat {
            return None;
        }
        let model = ctx.part(ModelP);
        Some(
            (0..model.var_count())
                .map(|index| {
                    let var = Var::from_index(index);
                    var.lit(model.value(var))
                })
                .collect(),
        )
    }

    /// Snapshot of all clauses in insertion order, input clauses before learned ones.
    pub fn clauses(&self) -> Vec<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        let alloc = ctx.part(ClauseAllocP);
        ctx.part(ClauseDbP)
            .clauses()
            .iter()
            .map(|&cref| alloc.clause(cref).lits().to_vec())
            .collect()
    }

    /// Number of clauses that were added as input rather than learned.
    pub fn input_clause_count(&self) -> usize {
        let ctx = self.ctx.into_partial_ref();
        ctx.part(ClauseDbP).input_clause_count()
    }

    /// Number of variables the solver knows about.
    pub fn var_count(&self) -> usize {
        let ctx = self.ctx.into_partial_ref();
        ctx.part(AssignmentP).var_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use tallysat_dimacs::write_dimacs;
    use tallysat_formula::{
        cnf_formula, lit, lits,
        test::{sat_formula, sgen_unsat_formula},
    };

    #[test]
    fn empty_formula_is_sat() {
        let mut solver = Solver::new();
        assert!(solver.solve());
        assert_eq!(solver.model(), Some(vec![]));
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut solver = Solver::new();
        solver.add_clause(&[]);
        assert!(!solver.solve());
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn single_unit_clause() {
        let mut solver = Solver::new();
        solver.add_clause(&lits![1]);
        assert!(solver.solve());
        assert_eq!(solver.model(), Some(vec![lit!(1)]));
    }

    #[test]
    fn contradicting_units_are_unsat() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1;
            -1;
        ]);
        assert!(!solver.solve());
    }

    #[test]
    fn unit_propagation_fixes_the_model() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1, 2;
            -2;
        ]);
        assert!(solver.solve());
        assert_eq!(solver.model(), Some(vec![lit!(1), lit!(-2)]));
    }

    #[test]
    fn all_two_literal_clauses_over_two_vars_are_unsat() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1, 2;
            1, -2;
            -1, 2;
            -1, -2;
        ]);
        assert!(!solver.solve());
    }

    #[test]
    fn solves_with_structural_branching() {
        let mut solver = Solver::new();
        solver.config(SolverConfig {
            structural_branching: true,
            ..SolverConfig::default()
        });
        solver.add_formula(&cnf_formula![
            1, 2;
            -1, 3;
            -2, -3;
        ]);
        assert!(solver.solve());

        let model = solver.model().unwrap();
        assert!(model.contains(&lit!(1)) || model.contains(&lit!(2)));
    }

    #[test]
    fn clauses_are_kept_across_solves() {
        let mut solver = Solver::new();

        solver.add_clause(&lits![1, 2]);
        assert!(solver.solve());

        solver.add_clause(&lits![-1]);
        assert!(solver.solve());
        let model = solver.model().unwrap();
        assert!(model.contains(&lit!(-1)));
        assert!(model.contains(&lit!(2)));

        solver.add_clause(&lits![-2]);
        assert!(!solver.solve());

        // Once unsatisfiable, the solver stays unsatisfiable.
        solver.add_clause(&lits![1]);
        assert!(!solver.solve());
    }

    #[test]
    fn learned_clauses_show_up_after_the_input() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1, 2;
            1, -2;
            -1, 2;
            -1, -2;
        ]);
        assert!(!solver.solve());

        let input_clauses = solver.input_clause_count();
        assert_eq!(input_clauses, 4);
        assert!(solver.clauses().len() > input_clauses);
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..4usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert!(!solver.solve());
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert!(solver.solve());

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert!(solver.solve());

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sgen_unsat_incremental_clauses(formula in sgen_unsat_formula(1..4usize)) {
            let mut solver = Solver::new();

            let mut last_state = true;

            for clause in formula.iter() {
                solver.add_clause(clause);

                let state = solver.solve();
                if state != last_state {
                    prop_assert!(!state);
                    prop_assert!(last_state);
                    last_state = state;
                }
            }

            prop_assert!(!last_state);
        }
    }
}
