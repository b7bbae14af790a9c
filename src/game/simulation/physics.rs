/// Movement integration and wall collision.
///
/// This module handles:
/// - Axis-independent movement against the tile grid
/// - Map bounds constraints
/// - Refreshing each agent's cached waypoint after it moves

use bevy::prelude::*;
use horde_macros::profile;

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::map::TileGrid;
use crate::game::pathfinding::WaypointGraph;
use crate::game::unit::{AgentId, AgentStore};
use super::resources::SimConfig;

// ============================================================================
// Wall Collision
// ============================================================================

/// True when all four body corners, pulled `inset` pixels inward, lie on
/// walkable tiles. `pos` is the body centre.
#[inline]
pub fn body_fits(grid: &TileGrid, pos: FixedVec2, size: FixedVec2, inset: FixedNum) -> bool {
    let half_w = (size.x / FixedNum::from_num(2) - inset).max(FixedNum::ZERO);
    let half_h = (size.y / FixedNum::from_num(2) - inset).max(FixedNum::ZERO);

    grid.is_pixel_walkable(FixedVec2::new(pos.x - half_w, pos.y - half_h))
        && grid.is_pixel_walkable(FixedVec2::new(pos.x + half_w, pos.y - half_h))
        && grid.is_pixel_walkable(FixedVec2::new(pos.x - half_w, pos.y + half_h))
        && grid.is_pixel_walkable(FixedVec2::new(pos.x + half_w, pos.y + half_h))
}

/// Apply one frame of velocity, x first and then y.
///
/// Each axis is committed only if the body fits at the candidate position,
/// so an agent pushing diagonally into a wall keeps sliding along it.
/// Returns `true` if the agent moved on either axis.
pub fn try_move(store: &mut AgentStore, id: AgentId, dt: FixedNum, grid: &TileGrid, inset: FixedNum) -> bool {
    let vel = store.velocity(id);
    let size = store.size(id);
    let mut pos = store.position(id);
    let mut moved = false;

    if vel.x != FixedNum::ZERO {
        let candidate = FixedVec2::new(pos.x + vel.x * dt, pos.y);
        if body_fits(grid, candidate, size, inset) {
            pos = candidate;
            moved = true;
        }
    }

    if vel.y != FixedNum::ZERO {
        let candidate = FixedVec2::new(pos.x, pos.y + vel.y * dt);
        if body_fits(grid, candidate, size, inset) {
            pos = candidate;
            moved = true;
        }
    }

    if moved {
        store.set_position(id, pos);
    }
    moved
}

// ============================================================================
// Map Constraints
// ============================================================================

/// Keep the whole body inside the map rectangle. Returns `true` if the
/// position had to be corrected.
pub fn clamp_to_map(store: &mut AgentStore, id: AgentId, grid: &TileGrid) -> bool {
    let pos = store.position(id);
    let half = store.size(id) / FixedNum::from_num(2);

    let max_x = (grid.width_px() - half.x).max(half.x);
    let max_y = (grid.height_px() - half.y).max(half.y);
    let clamped = FixedVec2::new(pos.x.clamp(half.x, max_x), pos.y.clamp(half.y, max_y));

    if clamped != pos {
        store.set_position(id, clamped);
        return true;
    }
    false
}

/// Update the agent's cached waypoint if it now stands on a waypoint tile.
///
/// Interior corridor tiles have no waypoint; the previous value is kept.
#[inline]
pub fn refresh_current_waypoint(store: &mut AgentStore, id: AgentId, grid: &TileGrid, graph: &WaypointGraph) {
    let Some((row, col)) = grid.cell_of(store.position(id)) else {
        return;
    };
    if let Some(wp) = graph.waypoint_at(row, col) {
        store.set_current_waypoint(id, Some(wp));
    }
}

// ============================================================================
// Integration
// ============================================================================

/// Move every active agent by its velocity, clamp it to the map and refresh
/// its waypoint cache.
///
/// Displacements shorter than `move_threshold` are dropped to keep idle
/// crowds from creeping.
#[profile(2)]
pub fn integrate_movement(
    store: &mut AgentStore,
    grid: &TileGrid,
    graph: &WaypointGraph,
    config: &SimConfig,
    dt: FixedNum,
) {
    let threshold_sq = config.move_threshold * config.move_threshold;
    let mut clamped = 0usize;

    for i in 0..store.len() {
        let id = AgentId(i as u32);
        if !store.participates(id) {
            continue;
        }

        let step = store.velocity(id) * dt;
        if step.length_squared() > threshold_sq {
            try_move(store, id, dt, grid, config.collision_inset);
        }

        if clamp_to_map(store, id, grid) {
            clamped += 1;
        }
        refresh_current_waypoint(store, id, grid, graph);
    }

    if clamped > 0 {
        debug!("[BOUNDS] {} agents clamped to the map this frame", clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::unit::SpawnPoint;

    fn single(x: f32, y: f32, vel: FixedVec2) -> AgentStore {
        let mut store = AgentStore::new(1);
        let id = store.spawn(&SpawnPoint::monster(x, y), &SimConfig::default()).unwrap();
        store.set_velocity(id, vel);
        store
    }

    #[test]
    fn test_blocked_axis_keeps_the_other() {
        // Wall along the top row; agent pushes up and right.
        let grid = TileGrid::from_ascii(&[
            "######",
            "......",
            "......",
        ])
        .unwrap();
        let mut store = single(48.0, 46.0, FixedVec2::from_f32(80.0, -80.0));
        let dt = FixedNum::from_num(0.125);

        assert!(try_move(&mut store, AgentId(0), dt, &grid, FixedNum::from_num(2)));
        let pos = store.position(AgentId(0));
        assert_eq!(pos.x, FixedNum::from_num(58));
        assert_eq!(pos.y, FixedNum::from_num(46), "y is blocked by the wall");
    }

    #[test]
    fn test_fully_blocked_move_reports_false() {
        let grid = TileGrid::from_ascii(&["###", "#.#", "###"]).unwrap();
        let mut store = single(48.0, 48.0, FixedVec2::from_f32(200.0, 200.0));
        assert!(!try_move(&mut store, AgentId(0), FixedNum::from_num(0.1), &grid, FixedNum::from_num(2)));
        assert_eq!(store.position(AgentId(0)), FixedVec2::from_f32(48.0, 48.0));
    }

    #[test]
    fn test_clamp_keeps_body_inside_map() {
        let grid = TileGrid::open(4, 4);
        let mut store = single(2.0, 200.0, FixedVec2::ZERO);
        assert!(clamp_to_map(&mut store, AgentId(0), &grid));
        // body_size 24 -> half 12; map is 128px
        assert_eq!(store.position(AgentId(0)), FixedVec2::from_f32(12.0, 116.0));
        assert!(!clamp_to_map(&mut store, AgentId(0), &grid));
    }

    #[test]
    fn test_tiny_displacements_are_dropped() {
        let grid = TileGrid::open(4, 4);
        let mut store = single(64.0, 64.0, FixedVec2::from_f32(1.0, 0.0));
        let config = SimConfig::default();
        let graph = WaypointGraph::build(&grid);

        // 1 px/s * 1/60 s is below the 0.05 px threshold
        integrate_movement(&mut store, &grid, &graph, &config, FixedNum::from_num(1.0 / 60.0));
        assert_eq!(store.position(AgentId(0)), FixedVec2::from_f32(64.0, 64.0));

        store.set_velocity(AgentId(0), FixedVec2::from_f32(60.0, 0.0));
        integrate_movement(&mut store, &grid, &graph, &config, FixedNum::from_num(1.0 / 60.0));
        assert!(store.position(AgentId(0)).x > FixedNum::from_num(64));
    }

    #[test]
    fn test_waypoint_cache_survives_corridor_tiles() {
        let grid = TileGrid::from_ascii(&[
            "#######",
            "#.....#",
            "#######",
        ])
        .unwrap();
        let graph = WaypointGraph::build(&grid);
        let config = SimConfig::default();
        let mut store = single(48.0, 48.0, FixedVec2::ZERO);

        integrate_movement(&mut store, &grid, &graph, &config, FixedNum::ZERO);
        let start = graph.waypoint_at(1, 1);
        assert!(start.is_some());
        assert_eq!(store.current_waypoint(AgentId(0)), start);

        // Walk into the corridor interior: no waypoint there, cache unchanged.
        store.set_position(AgentId(0), grid.tile_center(1, 3));
        integrate_movement(&mut store, &grid, &graph, &config, FixedNum::ZERO);
        assert_eq!(store.current_waypoint(AgentId(0)), start);

        store.set_position(AgentId(0), grid.tile_center(1, 5));
        integrate_movement(&mut store, &grid, &graph, &config, FixedNum::ZERO);
        assert_eq!(store.current_waypoint(AgentId(0)), graph.waypoint_at(1, 5));
    }
}
