//! Miscellaneous solver state.

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Miscellaneous solver state.
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Conflicts seen over the lifetime of the solver.
    pub conflicts: u64,
}
