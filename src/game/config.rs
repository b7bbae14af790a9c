use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::error::ConfigError;
use crate::game::fixed_math::{checked_world_num, FixedNum, WORLD_LIMIT};
use crate::game::simulation::SimConfig;

/// Default location of the startup configuration file.
pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup, in host-friendly floats.
///
/// Converted into the fixed-point [`SimConfig`] by [`to_sim_config`](Self::to_sim_config)
/// before a level loads. Changing these mid-level is not supported; reload
/// the level instead.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Timing
    pub tick_rate: f64,
    pub max_frame_delta: f32,

    // Level
    pub tile_size: f32,
    pub agent_capacity: u32,

    // Aggro
    pub aggro_range: f32,
    pub leash_multiplier: f32,
    pub attack_range: f32,
    pub think_interval: u32,

    // Movement
    pub agent_speed: f32,
    pub player_speed: f32,
    pub body_size: f32,
    pub collision_inset: f32,
    pub move_threshold: f32,

    // Steering
    pub personal_space: f32,
    pub seek_weight: f32,
    pub separation_weight: f32,
    pub dead_zone: f32,
    pub neighbor_capacity: u32,

    // Navigation
    pub los_step: f32,
    pub los_body_offset: f32,
    pub max_path_hops: u32,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_frame_delta: 0.1,
            tile_size: 32.0,
            agent_capacity: 1000,
            aggro_range: 320.0,
            leash_multiplier: 1.25,
            attack_range: 30.0,
            think_interval: 10,
            agent_speed: 150.0,
            player_speed: 250.0,
            body_size: 24.0,
            collision_inset: 2.0,
            move_threshold: 0.05,
            personal_space: 28.0,
            seek_weight: 1.0,
            separation_weight: 2.0,
            dead_zone: 0.01,
            neighbor_capacity: 32,
            los_step: 8.0,
            los_body_offset: 2.0,
            max_path_hops: 10,
        }
    }
}

impl InitialConfig {
    /// Read and parse a RON config file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_ron_str(&contents)?;
        info!("Loaded initial config from {}", path);
        Ok(config)
    }

    /// Like [`load`](Self::load) but falls back to defaults on any error.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                warn!("Using default InitialConfig");
                Self::default()
            }
        }
    }

    /// Parse RON text. Missing fields take their default values.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Validate and convert to the fixed-point runtime config.
    ///
    /// Float fields must be finite and no larger than [`WORLD_LIMIT`] so that
    /// squared distances stay inside the fixed-point range.
    pub fn to_sim_config(&self) -> Result<SimConfig, ConfigError> {
        if !(self.tick_rate.is_finite() && self.tick_rate >= 1.0 && self.tick_rate <= WORLD_LIMIT as f64) {
            return Err(ConfigError::Invalid { field: "tick_rate", reason: "must be between 1 Hz and the world limit" });
        }
        let max_frame_delta = positive("max_frame_delta", self.max_frame_delta)?;
        let tile_size = positive("tile_size", self.tile_size)?;
        let aggro_range = positive("aggro_range", self.aggro_range)?;
        let body_size = positive("body_size", self.body_size)?;
        let los_step = positive("los_step", self.los_step)?;
        let leash_multiplier = non_negative("leash_multiplier", self.leash_multiplier)?;
        let attack_range = non_negative("attack_range", self.attack_range)?;
        let agent_speed = non_negative("agent_speed", self.agent_speed)?;
        let player_speed = non_negative("player_speed", self.player_speed)?;
        let collision_inset = non_negative("collision_inset", self.collision_inset)?;
        let move_threshold = non_negative("move_threshold", self.move_threshold)?;
        let personal_space = non_negative("personal_space", self.personal_space)?;
        let seek_weight = non_negative("seek_weight", self.seek_weight)?;
        let separation_weight = non_negative("separation_weight", self.separation_weight)?;
        let dead_zone = non_negative("dead_zone", self.dead_zone)?;
        let los_body_offset = non_negative("los_body_offset", self.los_body_offset)?;

        if self.agent_capacity == 0 {
            return Err(ConfigError::Invalid { field: "agent_capacity", reason: "must be at least 1" });
        }
        if self.think_interval == 0 {
            return Err(ConfigError::Invalid { field: "think_interval", reason: "must be at least 1" });
        }
        if self.neighbor_capacity == 0 {
            return Err(ConfigError::Invalid { field: "neighbor_capacity", reason: "must be at least 1" });
        }
        if self.leash_multiplier < 1.0 {
            return Err(ConfigError::Invalid { field: "leash_multiplier", reason: "must be at least 1.0" });
        }
        // Leash range is squared every frame
        if self.aggro_range * self.leash_multiplier > WORLD_LIMIT {
            return Err(ConfigError::Invalid { field: "leash_multiplier", reason: "leash range exceeds the world limit" });
        }
        if self.collision_inset * 2.0 >= self.body_size {
            return Err(ConfigError::Invalid { field: "collision_inset", reason: "must be less than half the body size" });
        }

        Ok(SimConfig {
            tick_rate: self.tick_rate,
            tile_size,
            agent_capacity: self.agent_capacity as usize,
            aggro_range,
            leash_multiplier,
            attack_range,
            personal_space,
            think_interval: self.think_interval as u64,
            agent_speed,
            player_speed,
            body_size,
            collision_inset,
            seek_weight,
            separation_weight,
            dead_zone,
            move_threshold,
            los_step,
            los_body_offset,
            max_path_hops: self.max_path_hops as usize,
            neighbor_capacity: self.neighbor_capacity as usize,
            max_frame_delta,
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<FixedNum, ConfigError> {
    match checked_world_num(value) {
        Some(fixed) if fixed > FixedNum::ZERO => Ok(fixed),
        _ => Err(ConfigError::Invalid { field, reason: "must be a positive number within the world limit" }),
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<FixedNum, ConfigError> {
    match checked_world_num(value) {
        Some(fixed) if fixed >= FixedNum::ZERO => Ok(fixed),
        _ => Err(ConfigError::Invalid { field, reason: "must be zero or a positive number within the world limit" }),
    }
}
