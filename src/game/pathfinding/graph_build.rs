//! Waypoint extraction from the tile grid.
//!
//! A walkable cell becomes a waypoint unless it is a plain straight corridor
//! cell (exactly two walkable neighbors, on opposite sides). Each waypoint then
//! casts a ray along the four axes and links to the first waypoint it meets.

use bevy::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::game::fixed_math::FixedVec2;
use crate::game::map::TileGrid;
use super::types::{Direction, Waypoint, WaypointId};

/// Immutable waypoint graph for one level.
#[derive(Clone, Debug, Default)]
pub struct WaypointGraph {
    waypoints: Vec<Waypoint>,
    /// `(row, col)` → waypoint at that cell.
    lookup: FxHashMap<(usize, usize), WaypointId>,
}

impl WaypointGraph {
    /// Extract waypoints and connect them. A grid without free cells yields an
    /// empty graph, which callers treat as "no routable level".
    pub fn build(grid: &TileGrid) -> Self {
        let mut waypoints = Vec::new();
        let mut lookup = FxHashMap::default();

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                if !is_waypoint_cell(grid, row, col) {
                    continue;
                }
                let id = WaypointId(waypoints.len() as u32);
                lookup.insert((row, col), id);
                waypoints.push(Waypoint {
                    id,
                    row,
                    col,
                    position: grid.tile_center(row, col),
                    neighbors: SmallVec::new(),
                });
            }
        }

        for wp in waypoints.iter_mut() {
            for dir in Direction::ALL {
                if let Some(other) = cast_to_waypoint(grid, &lookup, wp.row, wp.col, dir) {
                    wp.neighbors.push(other);
                }
            }
        }

        let graph = Self { waypoints, lookup };
        debug!(
            "Waypoint graph: {} waypoints, {} edges on {}x{} grid",
            graph.len(),
            graph.edge_count(),
            grid.cols(),
            grid.rows()
        );
        graph
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[inline]
    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.index())
    }

    /// Waypoint sitting on a cell, if any. Interior corridor cells have none.
    #[inline]
    pub fn waypoint_at(&self, row: usize, col: usize) -> Option<WaypointId> {
        self.lookup.get(&(row, col)).copied()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.waypoints.iter().map(|wp| wp.neighbors.len()).sum::<usize>() / 2
    }

    /// Nearest waypoint by squared distance. Linear scan, meant for load time.
    pub fn nearest(&self, pos: FixedVec2) -> Option<WaypointId> {
        self.waypoints
            .iter()
            .min_by_key(|wp| wp.position.distance_squared(pos))
            .map(|wp| wp.id)
    }
}

/// True when the cell is walkable and not a straight corridor cell.
pub fn is_waypoint_cell(grid: &TileGrid, row: usize, col: usize) -> bool {
    let (r, c) = (row as isize, col as isize);
    if !grid.is_walkable(r, c) {
        return false;
    }

    let mut open: SmallVec<[Direction; 4]> = SmallVec::new();
    for dir in Direction::ALL {
        let (dr, dc) = dir.offset();
        if grid.is_walkable(r + dr, c + dc) {
            open.push(dir);
        }
    }

    match open.as_slice() {
        [a, b] => a.opposite() != *b,
        _ => true,
    }
}

/// Walk from a waypoint along `dir` through walkable cells until another
/// waypoint (returned) or a wall / the grid edge (`None`).
fn cast_to_waypoint(
    grid: &TileGrid,
    lookup: &FxHashMap<(usize, usize), WaypointId>,
    row: usize,
    col: usize,
    dir: Direction,
) -> Option<WaypointId> {
    let (dr, dc) = dir.offset();
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    while grid.is_walkable(r, c) {
        if let Some(&id) = lookup.get(&(r as usize, c as usize)) {
            return Some(id);
        }
        r += dr;
        c += dc;
    }
    None
}
