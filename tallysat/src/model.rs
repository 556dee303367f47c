//! Model snapshots.
use partial_ref::{partial, PartialRef};

use tallysat_formula::{Lit, Var};

use crate::context::{parts::*, Context};

/// The satisfying assignment found by the last successful search.
///
/// The search can satisfy every clause without assigning every variable; such leftover variables
/// default to false so that the model is total.
#[derive(Default)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// Number of variables covered by the model.
    pub fn var_count(&self) -> usize {
        self.values.len()
    }

    /// The value of a variable in the model.
    pub fn value(&self, var: Var) -> bool {
        self.values[var.index()]
    }

    /// Whether a literal is true in the model.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.values[lit.index()] == lit.is_positive()
    }
}

/// Snapshot the current assignment as the model.
///
/// Must be called while the satisfying assignment is still on the trail, i.e. before the final
/// unwinding.
pub fn save_model(mut ctx: partial!(Context, mut ModelP, AssignmentP)) {
    let (model, ctx) = ctx.split_part_mut(ModelP);
    model.values.clear();
    model.values.extend(
        ctx.part(AssignmentP)
            .assignment()
            .iter()
            .map(|value| value.unwrap_or(false)),
    );
}
