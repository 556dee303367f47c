//! Solver configuration.

/// Configurable parameters used during solving.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Multiplicative decay for the branching activity of literals, applied once per conflict.
    /// (Default: 0.93)
    pub vsids_decay: f32,

    /// Branch into unresolved clauses instead of using literal activities. (Default: false)
    pub structural_branching: bool,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.93,
            structural_branching: false,
        }
    }
}
