//! Target acquisition and leashing.
//!
//! An AI agent is either idle (no target) or engaged. Acquisition is
//! throttled to the agent's think frames; leashing runs every frame so a
//! target that escapes or dies is dropped without waiting for the next think.

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::simulation::SimConfig;
use crate::game::spatial_hash::SpatialHash;
use super::components::AgentId;
use super::store::AgentStore;

/// Engagement state of one agent, derived from its target column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggroState {
    Idle,
    Engaged(AgentId),
}

pub fn aggro_state(store: &AgentStore, id: AgentId) -> AggroState {
    match store.target(id) {
        Some(target) => AggroState::Engaged(target),
        None => AggroState::Idle,
    }
}

/// Agents re-think on frames where `(frame + id) % interval == 0`, which
/// spreads the population evenly across the interval.
#[inline]
pub fn thinks_this_frame(id: AgentId, frame: u64, interval: u64) -> bool {
    interval <= 1 || (frame + id.0 as u64) % interval == 0
}

/// Nearest hostile, alive, enabled agent strictly inside the aggro range.
///
/// Scans the `ceil(aggro / cell_size)` block of spatial hash cells around the
/// agent. Equal distances keep the first candidate in scan order (row-major
/// cells, spawn order inside a cell).
pub fn acquire_target(store: &AgentStore, id: AgentId, hash: &SpatialHash) -> Option<AgentId> {
    let pos = store.position(id);
    let (row, col) = hash.cell_coords(pos)?;

    let aggro = store.aggro_range(id);
    let aggro_sq = aggro * aggro;
    let radius_cells = radius_in_cells(aggro, hash.cell_size());

    let mut best: Option<(AgentId, FixedNum)> = None;
    hash.visit_block(row, col, radius_cells, |other| {
        if !store.is_hostile(id, other) || !store.is_valid_target(other) {
            return;
        }
        let dist_sq = pos.distance_squared(store.position(other));
        if dist_sq >= aggro_sq {
            return;
        }
        if best.is_none_or(|(_, best_sq)| dist_sq < best_sq) {
            best = Some((other, dist_sq));
        }
    });

    best.map(|(other, _)| other)
}

/// Drop the target when it is no longer valid or has escaped the leash.
///
/// Runs every frame. On release the target is cleared and the agent stops at
/// once.
pub fn check_leash(store: &mut AgentStore, id: AgentId, config: &SimConfig) -> AggroState {
    let Some(target) = store.target(id) else {
        return AggroState::Idle;
    };

    let escaped = !store.is_valid_target(target)
        || !store.is_hostile(id, target)
        || store.position(id).distance_squared(store.position(target))
            > config.leash_range_sq(store.aggro_range(id));

    if escaped {
        store.set_target(id, None);
        store.set_velocity(id, FixedVec2::ZERO);
        return AggroState::Idle;
    }
    AggroState::Engaged(target)
}

/// True when the target is close enough to attack; movement stops there.
#[inline]
pub fn in_attack_range(store: &AgentStore, id: AgentId, target: AgentId) -> bool {
    store.position(id).distance_squared(store.position(target)) <= store.attack_range_sq(id)
}

fn radius_in_cells(range: FixedNum, cell_size: FixedNum) -> usize {
    if cell_size <= FixedNum::ZERO {
        return 0;
    }
    (range / cell_size).ceil().to_num::<i64>().max(0) as usize
}
