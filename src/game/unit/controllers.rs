//! Per-frame velocity controllers.
//!
//! Every agent carries a [`ControllerKind`]; its discriminant indexes
//! [`CONTROLLERS`], a table of plain functions. Controllers only write
//! velocities (and the target column for AI); positions belong to the
//! movement integrator.

use horde_macros::profile;

use crate::game::fixed_math::{FixedNum, FixedVec2};
use crate::game::map::TileGrid;
use crate::game::pathfinding::{Navigation, SightProbe};
use crate::game::simulation::{InputState, SimConfig};
use crate::game::spatial_hash::SpatialHash;
use crate::profile_log;
use super::aggro::{acquire_target, check_leash, in_attack_range, thinks_this_frame, AggroState};
use super::boids::{steer_agent, SteerScratch};
use super::components::{AgentId, ControllerKind};
use super::store::AgentStore;

/// Read-only view of everything a controller may consult during one frame.
pub struct FrameContext<'a> {
    pub grid: &'a TileGrid,
    pub nav: &'a Navigation,
    pub hash: &'a SpatialHash,
    pub config: &'a SimConfig,
    pub probe: SightProbe,
    pub input: InputState,
    pub frame: u64,
    /// Scaled, clamped frame delta in seconds.
    pub dt: FixedNum,
}

pub type ControllerFn = fn(&mut AgentStore, AgentId, &FrameContext, &mut SteerScratch);

/// Dispatch table indexed by [`ControllerKind::index`].
pub const CONTROLLERS: [ControllerFn; 3] = [idle_controller, player_controller, ai_controller];

/// Look up the controller function for a kind.
#[inline]
pub fn controller_for(kind: ControllerKind) -> ControllerFn {
    CONTROLLERS[kind.index()]
}

/// Run the controller of every active agent once, in id order.
///
/// Dead or disabled agents are skipped and left with zero velocity.
#[profile(2)]
pub fn run_controllers(store: &mut AgentStore, ctx: &FrameContext, scratch: &mut SteerScratch) {
    for i in 0..store.len() {
        let id = AgentId(i as u32);
        if !store.participates(id) {
            store.set_velocity(id, FixedVec2::ZERO);
            continue;
        }
        controller_for(store.controller(id))(store, id, ctx, scratch);
    }

    profile_log!(ctx.frame, "[CONTROLLERS] Agents: {}", store.len());
}

/// Stands still.
pub fn idle_controller(store: &mut AgentStore, id: AgentId, _ctx: &FrameContext, _scratch: &mut SteerScratch) {
    store.set_velocity(id, FixedVec2::ZERO);
}

/// Moves along the pressed directions at the agent's speed. Diagonals are
/// normalized so they are not faster than straight movement.
pub fn player_controller(store: &mut AgentStore, id: AgentId, ctx: &FrameContext, _scratch: &mut SteerScratch) {
    let input = ctx.input;
    let mut dir = FixedVec2::ZERO;
    if input.up {
        dir.y -= FixedNum::ONE;
    }
    if input.down {
        dir.y += FixedNum::ONE;
    }
    if input.left {
        dir.x -= FixedNum::ONE;
    }
    if input.right {
        dir.x += FixedNum::ONE;
    }

    if dir == FixedVec2::ZERO {
        store.set_velocity(id, FixedVec2::ZERO);
        return;
    }
    store.set_velocity(id, dir.normalize() * store.speed(id));
}

/// Hunts hostile agents.
///
/// Leash and attack-range checks run every frame; target acquisition and
/// steering only on the agent's staggered think frames, with the velocity
/// carried over in between.
pub fn ai_controller(store: &mut AgentStore, id: AgentId, ctx: &FrameContext, scratch: &mut SteerScratch) {
    let thinks = thinks_this_frame(id, ctx.frame, ctx.config.think_interval);

    if check_leash(store, id, ctx.config) == AggroState::Idle {
        if thinks {
            let target = acquire_target(store, id, ctx.hash);
            store.set_target(id, target);
        }
        if store.target(id).is_none() {
            store.set_velocity(id, FixedVec2::ZERO);
            return;
        }
    }

    let Some(target) = store.target(id) else {
        return;
    };

    if in_attack_range(store, id, target) {
        store.set_velocity(id, FixedVec2::ZERO);
        return;
    }

    if thinks {
        steer_agent(store, id, target, ctx, scratch);
    }
}
