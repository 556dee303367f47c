//! Clause records and the arena holding them.
use tallysat_formula::{Lit, LitIdx};

use super::{ClauseRef, Status};

/// A clause record with live counters.
///
/// `n_sat` counts the satisfied and `n_yet` the unassigned literals of the clause under the
/// current partial assignment. The number of falsified literals is `len - n_sat - n_yet` and is
/// not stored. The recorded status and the bucket position are maintained by the
/// [`ClauseDb`](super::ClauseDb) whenever a counter changes.
pub struct Clause {
    lits: Box<[Lit]>,
    pub(crate) n_sat: LitIdx,
    pub(crate) n_yet: LitIdx,
    pub(crate) status: Status,
    pub(crate) bucket_pos: usize,
    learned: bool,
}

impl Clause {
    /// The literals of the clause.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Length of the clause.
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Number of satisfied literals under the current assignment.
    pub fn n_sat(&self) -> usize {
        self.n_sat as usize
    }

    /// Number of unassigned literals under the current assignment.
    pub fn n_yet(&self) -> usize {
        self.n_yet as usize
    }

    /// The recorded status of the clause.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether this clause was learned from a conflict instead of being part of the input.
    pub fn is_learned(&self) -> bool {
        self.learned
    }
}

/// Arena holding all clause records.
///
/// Clauses are only ever added, so the returned [`ClauseRef`] values act as stable handles.
#[derive(Default)]
pub struct ClauseAlloc {
    clauses: Vec<Clause>,
}

impl ClauseAlloc {
    /// Create a new clause record with zeroed counters.
    ///
    /// The caller is responsible for initializing the counters and filing the clause into a
    /// bucket.
    pub fn add_clause(&mut self, lits: &[Lit], learned: bool) -> ClauseRef {
        let cref = ClauseRef::from_index(self.clauses.len());
        self.clauses.push(Clause {
            lits: lits.to_vec().into_boxed_slice(),
            n_sat: 0,
            n_yet: 0,
            status: Status::Unresolved,
            bucket_pos: 0,
            learned,
        });
        cref
    }

    /// Read access to a clause record.
    pub fn clause(&self, cref: ClauseRef) -> &Clause {
        &self.clauses[cref.index()]
    }

    /// Write access to a clause record.
    pub fn clause_mut(&mut self, cref: ClauseRef) -> &mut Clause {
        &mut self.clauses[cref.index()]
    }

    /// Number of clauses allocated.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}
