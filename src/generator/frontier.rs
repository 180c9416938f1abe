use std::collections::VecDeque;

use crate::maze::{CellId, WEIGHT_BUCKETS};

/// Candidate cells waiting for admission, bucketed by weight.
///
/// Each bucket is FIFO: within a weight, the first cell inserted is the first
/// one popped. A cell is held at most once across all buckets.
pub struct Frontier {
    buckets: [VecDeque<CellId>; WEIGHT_BUCKETS],
    /// Membership flags indexed by cell, so `contains` does not scan buckets
    queued: Vec<bool>,
    len: usize,
    #[cfg(test)]
    pops: usize,
}

impl Frontier {
    /// Creates an empty frontier for a grid of `num_cells` cells.
    pub fn new(num_cells: usize) -> Self {
        Frontier {
            buckets: std::array::from_fn(|_| VecDeque::new()),
            queued: vec![false; num_cells],
            len: 0,
            #[cfg(test)]
            pops: 0,
        }
    }

    /// Queues `id` in the bucket for `weight`.
    /// Returns `false` if the cell was already queued.
    ///
    /// # Panics
    /// * If `weight` is not a valid bucket index
    /// * If `id` does not belong to the grid the frontier was sized for
    pub(crate) fn insert(&mut self, id: CellId, weight: u8) -> bool {
        if self.queued[id.index()] {
            return false;
        }
        self.queued[id.index()] = true;
        self.buckets[weight as usize].push_back(id);
        self.len += 1;
        true
    }

    /// Removes and returns the oldest cell of the lowest nonempty bucket.
    pub fn pop_lowest(&mut self) -> Option<CellId> {
        let id = self.buckets.iter_mut().find_map(VecDeque::pop_front)?;
        self.queued[id.index()] = false;
        self.len -= 1;
        #[cfg(test)]
        {
            self.pops += 1;
        }
        Some(id)
    }

    /// Number of cells popped over the frontier's lifetime.
    #[cfg(test)]
    pub(crate) fn pops(&self) -> usize {
        self.pops
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.queued.get(id.index()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cells currently waiting in the bucket for `weight`, oldest first.
    pub fn bucket(&self, weight: u8) -> impl Iterator<Item = CellId> {
        self.buckets
            .get(weight as usize)
            .into_iter()
            .flat_map(|bucket| bucket.iter().copied())
    }
}
