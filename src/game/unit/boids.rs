use bevy::prelude::*;

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::pathfinding::{RoutePath, SteerGoal};
use crate::game::spatial_hash::{NeighborBuffer, SpatialHash};
use super::components::AgentId;
use super::controllers::FrameContext;
use super::store::AgentStore;

/// Scratch buffers reused by every steering call of a frame.
#[derive(Clone, Debug, Default)]
pub struct SteerScratch {
    pub neighbors: NeighborBuffer,
    pub route: RoutePath,
}

impl SteerScratch {
    pub fn with_neighbor_capacity(cap: usize) -> Self {
        Self {
            neighbors: NeighborBuffer::with_capacity(cap),
            route: RoutePath::new(),
        }
    }
}

/// Repulsion from same-faction neighbors closer than `personal_space`.
///
/// Each contributing neighbor pushes along the away vector with strength
/// `(personal_space - d) / personal_space`, `d` being the
/// alpha-max-plus-beta-min distance. Agents stacked on the exact same point
/// are split along the x axis: the lower id goes left, the higher id right.
pub fn separation(
    store: &AgentStore,
    id: AgentId,
    hash: &SpatialHash,
    personal_space: FixedNum,
    neighbors: &mut NeighborBuffer,
) -> FixedVec2 {
    if personal_space <= FixedNum::ZERO {
        return FixedVec2::ZERO;
    }

    let faction = store.faction(id);
    hash.query_neighbors_where(store, id, 1, neighbors, |other| {
        store.faction(other) == faction && store.participates(other)
    });

    let pos = store.position(id);
    let personal_space_sq = personal_space * personal_space;
    let mut push = FixedVec2::ZERO;

    for &other in neighbors.iter() {
        // Work with squared distances to avoid sqrt
        let away = pos - store.position(other);
        let dist_sq = away.length_squared();
        if dist_sq >= personal_space_sq {
            continue;
        }

        let dist = away.fast_length();
        if dist == FixedNum::ZERO {
            let side = if id < other { -FixedNum::ONE } else { FixedNum::ONE };
            push += FixedVec2::new(side, FixedNum::ZERO);
            continue;
        }

        let strength = ((personal_space - dist) / personal_space).max(FixedNum::ZERO);
        push += away / dist * strength;
    }

    push
}

/// Recompute an engaged agent's velocity: seek toward the target (or the
/// shortcut waypoint when the target is out of sight) blended with
/// separation.
///
/// Called on think frames only; the result persists until the next one.
pub fn steer_agent(
    store: &mut AgentStore,
    id: AgentId,
    target: AgentId,
    ctx: &FrameContext,
    scratch: &mut SteerScratch,
) {
    let config = ctx.config;
    let pos = store.position(id);

    let goal = ctx.nav.steer_point(
        ctx.grid,
        &ctx.probe,
        pos,
        store.current_waypoint(id),
        store.position(target),
        store.current_waypoint(target),
        config.max_path_hops,
        &mut scratch.route,
    );

    let Some(point) = goal.point() else {
        debug!("Agent {} has no route to agent {}, holding position", id.0, target.0);
        store.set_velocity(id, FixedVec2::ZERO);
        return;
    };
    if let SteerGoal::Waypoint(wp, _) = goal {
        trace!("Agent {} shortcutting via waypoint {}", id.0, wp.0);
    }

    let seek = (point - pos).fast_normalize();
    let mut force = seek * config.seek_weight;

    if store.has_steering(id) {
        let push = separation(store, id, ctx.hash, config.personal_space, &mut scratch.neighbors);
        force += push * config.separation_weight;
    }

    // Dead zone: weak or cancelled-out forces leave the agent standing
    // instead of twitching in place.
    let magnitude = force.fast_length();
    if magnitude <= config.dead_zone {
        store.set_velocity(id, FixedVec2::ZERO);
        return;
    }

    store.set_velocity(id, force / magnitude * store.speed(id));
}

#[cfg(test)]
#[path = "boids_tests.rs"]
mod tests;
