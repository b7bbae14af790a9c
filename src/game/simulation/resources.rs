/// Resource definitions for the simulation.
///
/// This module contains the fixed-point configuration shared by every stage
/// and the per-frame input snapshot supplied by the host.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::fixed_math::FixedNum;
use crate::game::pathfinding::SightProbe;

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Runtime simulation configuration with fixed-point values for deterministic physics.
///
/// Built once from [`InitialConfig`](crate::game::config::InitialConfig) and
/// fixed for the lifetime of a level. Every distance is in world pixels and
/// every speed in pixels per second.
///
/// # Determinism Guarantees
///
/// - All simulation parameters are fixed-point so identical inputs give identical
///   positions across platforms
/// - Config values are converted from floats once, at load
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Fixed steps per second when driven by [`HordePlugin`](crate::game::HordePlugin).
    pub tick_rate: f64,
    /// Edge length of one tile, also the spatial hash cell size.
    pub tile_size: FixedNum,
    pub agent_capacity: usize,
    pub aggro_range: FixedNum,
    /// Targets farther than `aggro_range * leash_multiplier` are dropped.
    pub leash_multiplier: FixedNum,
    pub attack_range: FixedNum,
    /// Separation radius between same-faction agents.
    pub personal_space: FixedNum,
    /// AI agents re-think once every this many frames, staggered by id.
    pub think_interval: u64,
    pub agent_speed: FixedNum,
    pub player_speed: FixedNum,
    /// Agent body width and height.
    pub body_size: FixedNum,
    /// Wall probes sit this far inside the body corners.
    pub collision_inset: FixedNum,
    pub seek_weight: FixedNum,
    pub separation_weight: FixedNum,
    /// Blended steering weaker than this leaves the agent standing.
    pub dead_zone: FixedNum,
    /// Per-frame displacements shorter than this are not applied.
    pub move_threshold: FixedNum,
    pub los_step: FixedNum,
    pub los_body_offset: FixedNum,
    pub max_path_hops: usize,
    /// Hard cap of the per-query neighbor buffer.
    pub neighbor_capacity: usize,
    /// Longest frame delta (seconds) accepted by a single step.
    pub max_frame_delta: FixedNum,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            tile_size: FixedNum::from_num(32),
            agent_capacity: 1000,
            aggro_range: FixedNum::from_num(320),
            leash_multiplier: FixedNum::from_num(1.25),
            attack_range: FixedNum::from_num(30),
            personal_space: FixedNum::from_num(28),
            think_interval: 10,
            agent_speed: FixedNum::from_num(150),
            player_speed: FixedNum::from_num(250),
            body_size: FixedNum::from_num(24),
            collision_inset: FixedNum::from_num(2),
            seek_weight: FixedNum::from_num(1),
            separation_weight: FixedNum::from_num(2),
            dead_zone: FixedNum::from_num(0.01),
            move_threshold: FixedNum::from_num(0.05),
            los_step: FixedNum::from_num(8),
            los_body_offset: FixedNum::from_num(2),
            max_path_hops: 10,
            neighbor_capacity: 32,
            max_frame_delta: FixedNum::from_num(0.1),
        }
    }
}

impl SimConfig {
    /// Line-of-sight sampling parameters.
    pub fn sight_probe(&self) -> SightProbe {
        SightProbe {
            step: self.los_step,
            body_offset: self.los_body_offset,
        }
    }

    /// Square of the distance at which an engaged agent gives up its target.
    pub fn leash_range_sq(&self, aggro_range: FixedNum) -> FixedNum {
        let leash = aggro_range * self.leash_multiplier;
        leash * leash
    }
}

// ============================================================================
// Host Input
// ============================================================================

/// Pressed-direction flags for the current frame.
///
/// Supplied by the host's input layer; the simulation only reads it.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Frame counter resource, mirrored from the simulation after every fixed step.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimTick(pub u64);
