use bevy::prelude::*;

pub mod config;
pub mod error;
pub mod fixed_math;
pub mod map;
pub mod pathfinding;
pub mod simulation;
pub mod spatial_hash;
pub mod unit;

use map::TileGrid;
use simulation::{systems::step_simulation, InputState, SimConfig, SimTick, Simulation};
use unit::SpawnPoint;

/// Runs a [`Simulation`] inside a bevy [`App`].
///
/// The level is loaded when the plugin is added. The simulation steps once
/// per `FixedUpdate` tick at `config.tick_rate`, reading the [`InputState`]
/// resource and publishing the frame counter as [`SimTick`].
pub struct HordePlugin {
    pub grid: TileGrid,
    pub spawns: Vec<SpawnPoint>,
    pub config: SimConfig,
}

impl Plugin for HordePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputState>();
        app.init_resource::<SimTick>();
        if self.config.tick_rate.is_finite() && self.config.tick_rate > 0.0 {
            app.insert_resource(Time::<Fixed>::from_hz(self.config.tick_rate));
        } else {
            warn!("Invalid tick rate {}, keeping the default fixed timestep", self.config.tick_rate);
        }

        match Simulation::load_level(self.grid.clone(), &self.spawns, self.config.clone()) {
            Ok(sim) => {
                app.insert_resource(sim);
            }
            Err(e) => error!("Failed to load level: {}", e),
        }

        app.add_systems(FixedUpdate, step_simulation);
    }
}
