use crate::game::unit::{AgentId, AgentStore};
use super::SpatialHash;

/// Neighbor slots available to a single query unless configured otherwise.
pub const DEFAULT_NEIGHBOR_CAPACITY: usize = 32;

/// Reusable, hard-capped output buffer for neighbor queries.
///
/// Allocated once and handed to every query of a frame. Pushes past the cap
/// are dropped silently, which bounds the per-agent cost in dense crowds.
#[derive(Clone, Debug)]
pub struct NeighborBuffer {
    ids: Vec<AgentId>,
    cap: usize,
}

impl Default for NeighborBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NEIGHBOR_CAPACITY)
    }
}

impl NeighborBuffer {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            ids: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Returns `false` once the buffer is full.
    #[inline]
    pub fn push(&mut self, id: AgentId) -> bool {
        if self.ids.len() >= self.cap {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn as_slice(&self) -> &[AgentId] {
        &self.ids
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.cap
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl SpatialHash {
    /// Call `visit` for every agent bucketed in the `(2r+1)²` block of cells
    /// centred on `(row, col)`, row by row. Cells outside the grid are skipped.
    ///
    /// Unlike [`query_neighbors`](Self::query_neighbors) this is not capped;
    /// target acquisition uses it so a crowd cannot hide a hostile.
    pub fn visit_block(&self, row: usize, col: usize, radius_cells: usize, mut visit: impl FnMut(AgentId)) {
        let min_row = row.saturating_sub(radius_cells);
        let max_row = (row + radius_cells).min(self.rows().saturating_sub(1));
        let min_col = col.saturating_sub(radius_cells);
        let max_col = (col + radius_cells).min(self.cols().saturating_sub(1));

        for r in min_row..=max_row {
            for c in min_col..=max_col {
                for &id in self.cell_entities(r, c) {
                    visit(id);
                }
            }
        }
    }

    /// Collect the agents around `id` (excluding `id` itself) into `out`.
    ///
    /// Clears `out` before populating. Agents outside the grid have no cell
    /// and therefore no neighbors.
    pub fn query_neighbors(&self, store: &AgentStore, id: AgentId, radius_cells: usize, out: &mut NeighborBuffer) {
        self.query_neighbors_where(store, id, radius_cells, out, |_| true);
    }

    /// Like [`query_neighbors`](Self::query_neighbors), but only agents for
    /// which `keep` returns true take a slot, so the cap truncates relevant
    /// neighbors only.
    pub fn query_neighbors_where(
        &self,
        store: &AgentStore,
        id: AgentId,
        radius_cells: usize,
        out: &mut NeighborBuffer,
        keep: impl Fn(AgentId) -> bool,
    ) {
        out.clear();
        if self.cols() == 0 || self.rows() == 0 {
            return;
        }
        let Some((row, col)) = self.cell_coords(store.position(id)) else {
            return;
        };

        self.visit_block(row, col, radius_cells, |other| {
            if other != id && keep(other) {
                out.push(other);
            }
        });
    }
}
