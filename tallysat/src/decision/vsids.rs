//! A VSIDS-like branching priority queue over literals.
//!
//! Every literal carries an activity score. Adding a clause, whether input or learned, bumps the
//! score of each of its literals; each conflict decays all scores by a constant factor. A
//! decision branches on the highest scoring literal whose variable is unassigned.
//!
//! Unlike the classic per-variable scheme this scores the two polarities of a variable
//! independently, so the chosen literal also fixes the branching polarity.

use ordered_float::OrderedFloat;

use tallysat_formula::{Lit, Var};

use crate::config::SolverConfig;

/// Literal activity queue.
///
/// As an optimization, instead of decaying all activities each conflict, the bump value is
/// divided by the decay factor each conflict. When this would cause a value to overflow, all
/// activities and the bump value are scaled down. Apart from a scaling factor that is the same
/// for all involved values, this is equivalent to the naive implementation, and only the order
/// of activities matters.
pub struct Vsids {
    /// The activity of each literal, indexed by literal code.
    activity: Vec<OrderedFloat<f32>>,
    /// A binary max-heap of the literals.
    heap: Vec<Lit>,
    /// The position in the binary heap for each literal code.
    position: Vec<Option<usize>>,
    /// The value to add on bumping.
    bump: f32,
    /// The inverse of the decay factor.
    inv_decay: f32,
}

impl Default for Vsids {
    fn default() -> Vsids {
        Vsids {
            activity: vec![],
            heap: vec![],
            position: vec![],
            bump: 1.0,
            inv_decay: 1.0 / SolverConfig::default().vsids_decay,
        }
    }
}

impl Vsids {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.activity.len() / 2;
        self.activity.resize(count * 2, OrderedFloat(0.0));
        self.position.resize(count * 2, None);

        for index in old_count..count {
            self.make_available(Var::from_index(index));
        }
    }

    /// Rescale activities if any value exceeds this value.
    fn rescale_limit() -> f32 {
        std::f32::MAX / 16.0
    }

    /// Change the decay factor.
    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    /// Bump a literal by increasing its activity.
    pub fn bump(&mut self, lit: Lit) {
        let rescale = {
            let value = &mut self.activity[lit.code()];
            value.0 += self.bump;
            value.0 >= Self::rescale_limit()
        };
        if rescale {
            self.rescale();
        }
        if let Some(pos) = self.position[lit.code()] {
            self.sift_up(pos);
        }
    }

    /// Decay all literal activities.
    pub fn decay(&mut self) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale();
        }
    }

    /// Rescale all values to avoid an overflow.
    fn rescale(&mut self) {
        let rescale_factor = 1.0 / Self::rescale_limit();
        for activity in &mut self.activity {
            activity.0 *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }

    /// Re-enter both literals of a variable into the queue.
    pub fn make_available(&mut self, var: Var) {
        self.insert(var.positive());
        self.insert(var.negative());
    }

    /// Insert a literal into the heap if not already present.
    fn insert(&mut self, lit: Lit) {
        if self.position[lit.code()].is_none() {
            let position = self.heap.len();
            self.position[lit.code()] = Some(position);
            self.heap.push(lit);
            self.sift_up(position);
        }
    }

    /// Move a literal closer to the root until the heap property is satisfied.
    fn sift_up(&mut self, mut pos: usize) {
        let lit = self.heap[pos];
        loop {
            if pos == 0 {
                return;
            }
            let parent_pos = (pos - 1) / 2;
            let parent_lit = self.heap[parent_pos];
            if self.activity[parent_lit.code()] >= self.activity[lit.code()] {
                return;
            }
            self.position[lit.code()] = Some(parent_pos);
            self.heap[parent_pos] = lit;
            self.position[parent_lit.code()] = Some(pos);
            self.heap[pos] = parent_lit;
            pos = parent_pos;
        }
    }

    /// Move a literal away from the root until the heap property is satisfied.
    fn sift_down(&mut self, mut pos: usize) {
        let lit = self.heap[pos];
        loop {
            let mut largest_pos = pos;
            let mut largest_lit = lit;

            let left_pos = pos * 2 + 1;
            if left_pos < self.heap.len() {
                let left_lit = self.heap[left_pos];

                if self.activity[largest_lit.code()] < self.activity[left_lit.code()] {
                    largest_pos = left_pos;
                    largest_lit = left_lit;
                }
            }

            let right_pos = pos * 2 + 2;
            if right_pos < self.heap.len() {
                let right_lit = self.heap[right_pos];

                if self.activity[largest_lit.code()] < self.activity[right_lit.code()] {
                    largest_pos = right_pos;
                    largest_lit = right_lit;
                }
            }

            if largest_pos == pos {
                return;
            }

            self.position[lit.code()] = Some(largest_pos);
            self.heap[largest_pos] = lit;
            self.position[largest_lit.code()] = Some(pos);
            self.heap[pos] = largest_lit;
            pos = largest_pos;
        }
    }
}

impl Iterator for Vsids {
    type Item = Lit;

    fn next(&mut self) -> Option<Lit> {
        if self.heap.is_empty() {
            None
        } else {
            let lit = self.heap.swap_remove(0);
            if !self.heap.is_empty() {
                let top_lit = self.heap[0];
                self.position[top_lit.code()] = Some(0);
                self.sift_down(0);
            }
            self.position[lit.code()] = None;
            Some(lit)
        }
    }
}
