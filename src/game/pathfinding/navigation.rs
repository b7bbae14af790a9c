/// Steering-point selection over the waypoint graph.
///
/// Bundles the per-level graph with its next-step table and answers the one
/// question the steering layer asks every think tick: "which point should this
/// agent head for right now?"

use std::time::Instant;

use bevy::prelude::*;

use crate::game::fixed_math::FixedVec2;
use crate::game::map::TileGrid;
use super::graph_build::WaypointGraph;
use super::line_of_sight::{has_line_of_sight, SightProbe};
use super::routing::NextStepTable;
use super::types::{RoutePath, WaypointId};

// ============================================================================
// Navigation Target Types
// ============================================================================

/// Result of a steering query - tells the agent where to move next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerGoal {
    /// Target is visible (or the level has no graph); seek it directly
    Direct(FixedVec2),
    /// Target is hidden; seek this waypoint on the route toward it
    Waypoint(WaypointId, FixedVec2),
    /// Target is in a part of the level the agent cannot reach
    NoRoute,
}

impl SteerGoal {
    /// Point to seek, if any.
    pub fn point(self) -> Option<FixedVec2> {
        match self {
            SteerGoal::Direct(p) | SteerGoal::Waypoint(_, p) => Some(p),
            SteerGoal::NoRoute => None,
        }
    }
}

// ============================================================================
// Per-level navigation data
// ============================================================================

/// Waypoint graph plus all-pairs routing, built once per level.
#[derive(Clone, Debug, Default)]
pub struct Navigation {
    graph: WaypointGraph,
    routing: NextStepTable,
}

impl Navigation {
    pub fn build(grid: &TileGrid) -> Self {
        let start = Instant::now();
        let graph = WaypointGraph::build(grid);
        let graph_time = start.elapsed();

        let start = Instant::now();
        let routing = NextStepTable::build(&graph);
        let routing_time = start.elapsed();

        info!(
            "Navigation built: {} waypoints, {} edges (graph {:?}, routing table {:?}, {} entries)",
            graph.len(),
            graph.edge_count(),
            graph_time,
            routing_time,
            routing.size() * routing.size()
        );
        if graph.is_empty() {
            warn!("Level has no walkable cells; agents will seek targets directly");
        }

        Self { graph, routing }
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn routing(&self) -> &NextStepTable {
        &self.routing
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Pick the point an agent at `pos` should steer toward to reach `target`.
    ///
    /// 1. Direct line of sight to the target wins.
    /// 2. Without a graph (or without known waypoints) fall back to direct seek.
    /// 3. Otherwise follow the bounded route from `from_wp` to `target_wp` and
    ///    take the farthest waypoint visible from `pos`, else the next hop.
    ///
    /// `scratch` is reused between calls so the query never allocates.
    #[allow(clippy::too_many_arguments)]
    pub fn steer_point(
        &self,
        grid: &TileGrid,
        probe: &SightProbe,
        pos: FixedVec2,
        from_wp: Option<WaypointId>,
        target: FixedVec2,
        target_wp: Option<WaypointId>,
        max_hops: usize,
        scratch: &mut RoutePath,
    ) -> SteerGoal {
        if has_line_of_sight(grid, pos, target, probe) {
            return SteerGoal::Direct(target);
        }

        let (Some(start), Some(goal)) = (from_wp, target_wp) else {
            return SteerGoal::Direct(target);
        };
        if self.graph.get(start).is_none() || self.graph.get(goal).is_none() {
            return SteerGoal::Direct(target);
        }

        self.routing.path_into(start, goal, max_hops, scratch);
        if start != goal && scratch.len() < 2 {
            return SteerGoal::NoRoute;
        }

        let here = grid.cell_of(pos);
        for (i, &id) in scratch.iter().enumerate().rev() {
            let Some(wp) = self.graph.get(id) else { continue };
            // Standing on the route's first waypoint already; seeking its centre
            // would only stall the agent.
            if i == 0 && here == Some((wp.row, wp.col)) {
                continue;
            }
            if has_line_of_sight(grid, pos, wp.position, probe) {
                return SteerGoal::Waypoint(id, wp.position);
            }
        }

        match scratch.get(1).and_then(|&id| self.graph.get(id)) {
            Some(wp) => SteerGoal::Waypoint(wp.id, wp.position),
            // Same waypoint as the target but no sight line; slide toward it.
            None => SteerGoal::Direct(target),
        }
    }
}
