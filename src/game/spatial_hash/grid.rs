use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::unit::{AgentId, AgentStore};
use super::SpatialHash;

impl SpatialHash {
    /// Bucket coordinates `(row, col)` of a world point, `None` outside the grid.
    pub fn cell_coords(&self, pos: FixedVec2) -> Option<(usize, usize)> {
        if self.cell_size() <= FixedNum::ZERO || pos.x < FixedNum::ZERO || pos.y < FixedNum::ZERO {
            return None;
        }

        let col = (pos.x / self.cell_size()).floor().to_num::<i64>() as usize;
        let row = (pos.y / self.cell_size()).floor().to_num::<i64>() as usize;

        if col >= self.cols() || row >= self.rows() {
            return None;
        }

        Some((row, col))
    }

    pub(crate) fn cell_index(&self, pos: FixedVec2) -> Option<usize> {
        self.cell_coords(pos).map(|(row, col)| row * self.cols() + col)
    }

    /// Put one agent into the bucket under `pos`. Out-of-bounds points are dropped.
    pub fn insert(&mut self, id: AgentId, pos: FixedVec2) {
        if let Some(idx) = self.cell_index(pos) {
            self.cells_mut()[idx].push(id);
        }
    }

    /// Truncate every bucket and re-insert all active agents in id order.
    ///
    /// Rebuilding twice from the same store gives identical buckets.
    pub fn rebuild(&mut self, store: &AgentStore) {
        self.clear();
        for (i, &pos) in store.positions().iter().enumerate() {
            self.insert(AgentId(i as u32), pos);
        }
    }

    /// Agents bucketed at `(row, col)`; empty outside the grid.
    pub fn cell_entities(&self, row: usize, col: usize) -> &[AgentId] {
        if row >= self.rows() || col >= self.cols() {
            return &[];
        }
        &self.cells()[row * self.cols() + col]
    }
}
