use bevy::prelude::*;
use crate::game::fixed_math::FixedNum;
use crate::game::map::TileGrid;
use crate::game::unit::AgentId;

mod grid;
mod query;
#[cfg(test)]
mod tests;

pub use query::{NeighborBuffer, DEFAULT_NEIGHBOR_CAPACITY};

/// Uniform grid of agent buckets for proximity queries in 2D space.
///
/// The hash shares the level's tile layout: one bucket per tile, bucket
/// `(row, col)` holding every agent whose centre lies in that tile. It is
/// rebuilt from scratch once per frame before any controller runs.
///
/// # Use Cases
///
/// - **Separation:** Query same-faction neighbors one cell around an agent
/// - **AI/Aggro:** Scan for hostiles within the aggro radius
///
/// # Example
///
/// ```rust
/// use horde::game::map::TileGrid;
/// use horde::game::simulation::SimConfig;
/// use horde::game::spatial_hash::{NeighborBuffer, SpatialHash};
/// use horde::game::unit::{AgentStore, SpawnPoint};
///
/// let grid = TileGrid::open(10, 10);
/// let config = SimConfig::default();
/// let mut store = AgentStore::new(8);
/// let a = store.spawn(&SpawnPoint::monster(40.0, 40.0), &config).unwrap();
/// store.spawn(&SpawnPoint::monster(50.0, 40.0), &config).unwrap();
///
/// let mut hash = SpatialHash::for_grid(&grid);
/// hash.rebuild(&store);
///
/// let mut neighbors = NeighborBuffer::default();
/// hash.query_neighbors(&store, a, 1, &mut neighbors);
/// assert_eq!(neighbors.len(), 1); // Never includes the querying agent
/// ```
///
/// # Performance
///
/// - **Rebuild:** O(N), buckets are truncated and refilled, never reallocated
///   once warm
/// - **Query:** O(k) where k = agents in the `(2r+1)²` block (typically << N)
#[derive(Resource, Clone, Debug, Default)]
pub struct SpatialHash {
    cell_size: FixedNum,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<AgentId>>,
}

impl SpatialHash {
    pub fn new(cols: usize, rows: usize, cell_size: FixedNum) -> Self {
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    /// One bucket per tile of `grid`.
    pub fn for_grid(grid: &TileGrid) -> Self {
        Self::new(grid.cols(), grid.rows(), grid.tile_size())
    }

    pub fn resize(&mut self, cols: usize, rows: usize, cell_size: FixedNum) {
        self.cell_size = cell_size;
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![Vec::new(); cols * rows];
    }

    /// Empty every bucket, keeping their allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Count the total number of agent entries across all cells.
    /// Useful for debugging and diagnostics.
    pub fn total_entries(&self) -> usize {
        self.cells.iter().map(|cell| cell.len()).sum()
    }

    /// Count the number of non-empty cells.
    /// Useful for debugging and diagnostics.
    pub fn non_empty_cells(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    // Getters for grid parameters
    pub fn cell_size(&self) -> FixedNum { self.cell_size }
    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }

    // Internal accessor for submodules
    pub(crate) fn cells(&self) -> &[Vec<AgentId>] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Vec<AgentId>] {
        &mut self.cells
    }
}
