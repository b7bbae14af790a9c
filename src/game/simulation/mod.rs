/// Simulation layer - the per-level engine context.
///
/// This module is organized into:
/// - **resources**: Fixed-point config, host input and the frame counter
/// - **physics**: Movement integration and wall collision
/// - **systems**: Bevy systems that drive [`Simulation`] from `FixedUpdate`
///
/// A [`Simulation`] owns everything one level needs: the tile grid, the
/// navigation data, the agent store, the spatial hash and the scratch buffers.
/// Each [`step`](Simulation::step) runs the same fixed pipeline:
///
/// 1. status effects tick down
/// 2. the spatial hash is rebuilt from positions
/// 3. controllers write velocities
/// 4. the integrator writes positions

use std::time::Instant;

use bevy::prelude::*;

use crate::game::error::LevelError;
use crate::game::fixed_math::FixedNum;
use crate::game::map::TileGrid;
use crate::game::pathfinding::{Navigation, NextStepTable, WaypointGraph};
use crate::game::spatial_hash::SpatialHash;
use crate::game::unit::{run_controllers, AgentId, AgentStore, FrameContext, SpawnPoint, SteerScratch};

pub mod physics;
pub mod resources;
pub mod systems;

pub use resources::*;

/// Upper bound for [`Simulation::set_time_scale`].
pub const MAX_TIME_SCALE: f32 = 16.0;

/// Render-facing copy of one agent's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub x: f32,
    pub y: f32,
    pub faction: u8,
    pub alive: bool,
}

/// One loaded level and everything needed to advance it.
#[derive(Resource)]
pub struct Simulation {
    grid: TileGrid,
    nav: Navigation,
    store: AgentStore,
    hash: SpatialHash,
    config: SimConfig,
    scratch: SteerScratch,
    frame: u64,
    paused: bool,
    time_scale: f32,
}

impl Simulation {
    // ========================================================================
    // Loading
    // ========================================================================

    /// Build navigation for `grid` and spawn every agent of `spawns`.
    ///
    /// The grid takes `config.tile_size` as its tile edge. Fails if the
    /// capacity is zero, the tile size is not positive or the spawn list does
    /// not fit in `config.agent_capacity`.
    pub fn load_level(grid: TileGrid, spawns: &[SpawnPoint], config: SimConfig) -> Result<Self, LevelError> {
        if config.agent_capacity == 0 {
            return Err(LevelError::ZeroCapacity);
        }
        let start = Instant::now();
        let grid = grid.with_tile_size(config.tile_size)?;
        let nav = Navigation::build(&grid);

        let mut sim = Self {
            hash: SpatialHash::for_grid(&grid),
            store: AgentStore::new(config.agent_capacity),
            scratch: SteerScratch::with_neighbor_capacity(config.neighbor_capacity),
            grid,
            nav,
            config,
            frame: 0,
            paused: false,
            time_scale: 1.0,
        };
        sim.spawn_all(spawns)?;

        info!(
            "Level loaded: {}x{} tiles, {} agents (capacity {}) in {:?}",
            sim.grid.cols(),
            sim.grid.rows(),
            sim.store.len(),
            sim.store.capacity(),
            start.elapsed()
        );
        Ok(sim)
    }

    /// Swap in a new grid and spawn list, reusing the agent buffers.
    ///
    /// On error the previous level is left untouched.
    pub fn reload_level(&mut self, grid: TileGrid, spawns: &[SpawnPoint]) -> Result<(), LevelError> {
        if spawns.len() > self.store.capacity() {
            return Err(LevelError::CapacityExceeded { capacity: self.store.capacity() });
        }
        let grid = grid.with_tile_size(self.config.tile_size)?;
        let nav = Navigation::build(&grid);

        self.hash.resize(grid.cols(), grid.rows(), grid.tile_size());
        self.grid = grid;
        self.nav = nav;
        self.reset();
        self.spawn_all(spawns)?;

        info!(
            "Level reloaded: {}x{} tiles, {} agents",
            self.grid.cols(),
            self.grid.rows(),
            self.store.len()
        );
        Ok(())
    }

    /// Remove every agent and rewind the frame counter. The level stays loaded.
    pub fn reset(&mut self) {
        self.store.reset();
        self.hash.clear();
        self.frame = 0;
    }

    /// Add one agent to the running level.
    pub fn spawn(&mut self, spawn: &SpawnPoint) -> Result<AgentId, LevelError> {
        let id = self.store.spawn(spawn, &self.config)?;
        let pos = self.store.position(id);

        if !self.grid.is_pixel_walkable(pos) {
            warn!("Agent {} spawned inside a wall at ({}, {})", id.0, spawn.x, spawn.y);
        }
        let wp = self.nav.graph().nearest(pos);
        self.store.set_current_waypoint(id, wp);
        Ok(id)
    }

    fn spawn_all(&mut self, spawns: &[SpawnPoint]) -> Result<(), LevelError> {
        for spawn in spawns {
            self.spawn(spawn)?;
        }
        Ok(())
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance one frame by `delta_seconds` of host time.
    ///
    /// The delta is clamped to `max_frame_delta` and scaled by the time
    /// scale. Negative or non-finite deltas count as zero. Does nothing while
    /// paused.
    pub fn step(&mut self, delta_seconds: f32, input: &InputState) {
        if self.paused {
            return;
        }
        let max = self.config.max_frame_delta.to_num::<f32>().max(0.0);
        let dt = if delta_seconds.is_finite() {
            delta_seconds.clamp(0.0, max) * self.time_scale
        } else {
            0.0
        };
        self.step_fixed(FixedNum::saturating_from_num(dt), input);
    }

    /// Advance one frame by an already clamped and scaled `dt`.
    pub fn step_fixed(&mut self, dt: FixedNum, input: &InputState) {
        if self.paused {
            return;
        }
        let dt = dt.max(FixedNum::ZERO);

        self.store.tick_status_effects(dt);
        self.hash.rebuild(&self.store);

        let ctx = FrameContext {
            grid: &self.grid,
            nav: &self.nav,
            hash: &self.hash,
            config: &self.config,
            probe: self.config.sight_probe(),
            input: *input,
            frame: self.frame,
            dt,
        };
        run_controllers(&mut self.store, &ctx, &mut self.scratch);
        physics::integrate_movement(&mut self.store, &self.grid, self.nav.graph(), &self.config, dt);

        self.frame += 1;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Multiplier applied to every host delta, clamped to
    /// `0..=MAX_TIME_SCALE`. Non-finite values are stored as zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.clamp(0.0, MAX_TIME_SCALE) } else { 0.0 };
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    // ========================================================================
    // Output
    // ========================================================================

    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        let mut out = Vec::with_capacity(self.store.len());
        self.snapshot_into(&mut out);
        out
    }

    /// Overwrite `out` with one entry per active agent, in id order.
    pub fn snapshot_into(&self, out: &mut Vec<AgentSnapshot>) {
        out.clear();
        out.extend(self.store.ids().map(|id| {
            let pos = self.store.position(id);
            AgentSnapshot {
                id,
                x: pos.x.to_num(),
                y: pos.y.to_num(),
                faction: self.store.faction(id),
                alive: self.store.is_alive(id),
            }
        }));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn graph(&self) -> &WaypointGraph {
        self.nav.graph()
    }

    pub fn routing(&self) -> &NextStepTable {
        self.nav.routing()
    }

    pub fn nav(&self) -> &Navigation {
        &self.nav
    }

    pub fn agents(&self) -> &AgentStore {
        &self.store
    }

    /// Mutable store access for host-driven events (damage, charm, enabling).
    pub fn agents_mut(&mut self) -> &mut AgentStore {
        &mut self.store
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn hash(&self) -> &SpatialHash {
        &self.hash
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of frames stepped since load or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::unit::factions;

    fn config(capacity: usize) -> SimConfig {
        SimConfig { agent_capacity: capacity, ..Default::default() }
    }

    #[test]
    fn test_load_rejects_overflow_and_zero_capacity() {
        let spawns = vec![SpawnPoint::monster(48.0, 48.0); 3];
        let err = Simulation::load_level(TileGrid::open(4, 4), &spawns, config(2)).err();
        assert_eq!(err, Some(LevelError::CapacityExceeded { capacity: 2 }));

        let err = Simulation::load_level(TileGrid::open(4, 4), &[], config(0)).err();
        assert_eq!(err, Some(LevelError::ZeroCapacity));
    }

    #[test]
    fn test_load_assigns_initial_waypoints() {
        let sim = Simulation::load_level(TileGrid::open(4, 4), &[SpawnPoint::hero(48.0, 48.0)], config(4)).unwrap();
        let wp = sim.agents().current_waypoint(AgentId(0));
        assert_eq!(wp, sim.graph().waypoint_at(1, 1));
    }

    #[test]
    fn test_pause_freezes_frame_counter() {
        let mut sim = Simulation::load_level(TileGrid::open(4, 4), &[], config(1)).unwrap();
        sim.step(1.0 / 60.0, &InputState::default());
        sim.pause();
        sim.step(1.0 / 60.0, &InputState::default());
        assert_eq!(sim.frame(), 1);
        sim.resume();
        sim.step(1.0 / 60.0, &InputState::default());
        assert_eq!(sim.frame(), 2);
    }

    #[test]
    fn test_step_clamps_large_and_bad_deltas() {
        let spawns = [SpawnPoint::hero(160.0, 160.0)];
        let input = InputState { right: true, ..Default::default() };
        let mut sim = Simulation::load_level(TileGrid::open(20, 20), &spawns, config(1)).unwrap();

        // 5 s is clamped to 0.1 s: 250 px/s * 0.1 s = 25 px
        sim.step(5.0, &input);
        let x = sim.snapshot()[0].x;
        assert!((x - 185.0).abs() < 0.01, "got {x}");

        sim.step(f32::NAN, &input);
        sim.step(-1.0, &input);
        assert!((sim.snapshot()[0].x - 185.0).abs() < 0.01);
        assert_eq!(sim.frame(), 3);
    }

    #[test]
    fn test_time_scale_slows_movement() {
        let spawns = [SpawnPoint::hero(160.0, 160.0)];
        let input = InputState { right: true, ..Default::default() };
        let mut sim = Simulation::load_level(TileGrid::open(20, 20), &spawns, config(1)).unwrap();
        sim.set_time_scale(0.5);
        sim.step(0.1, &input);
        assert!((sim.snapshot()[0].x - 172.5).abs() < 0.01);

        sim.set_time_scale(-3.0);
        assert_eq!(sim.time_scale(), 0.0);
    }

    #[test]
    fn test_huge_time_scale_is_clamped() {
        let spawns = [SpawnPoint::hero(160.0, 160.0)];
        let input = InputState { right: true, ..Default::default() };
        let mut sim = Simulation::load_level(TileGrid::open(20, 20), &spawns, config(1)).unwrap();
        sim.set_time_scale(f32::MAX);
        assert_eq!(sim.time_scale(), MAX_TIME_SCALE);

        sim.step(0.1, &input);
        assert_eq!(sim.frame(), 1);
        // 0.1s * 16 * 250 px/s
        assert!((sim.snapshot()[0].x - 560.0).abs() < 0.01);
    }

    #[test]
    fn test_load_rejects_non_finite_spawn() {
        let spawns = [SpawnPoint::hero(48.0, 48.0), SpawnPoint::monster(f32::NAN, 48.0)];
        let err = Simulation::load_level(TileGrid::open(4, 4), &spawns, config(4)).err();
        assert_eq!(err, Some(LevelError::InvalidSpawn { index: 1 }));
    }

    #[test]
    fn test_snapshot_into_reuses_buffer() {
        let spawns = [SpawnPoint::hero(48.0, 48.0), SpawnPoint::monster(80.0, 48.0)];
        let mut sim = Simulation::load_level(TileGrid::open(4, 4), &spawns, config(2)).unwrap();
        sim.agents_mut().apply_damage(AgentId(1), 500);

        let mut out = vec![
            AgentSnapshot { id: AgentId(9), x: 0.0, y: 0.0, faction: 0, alive: false };
            5
        ];
        sim.snapshot_into(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], AgentSnapshot { id: AgentId(0), x: 48.0, y: 48.0, faction: factions::HERO, alive: true });
        assert!(!out[1].alive);
        assert_eq!(out, sim.snapshot());
    }

    #[test]
    fn test_reload_replaces_level_and_agents() {
        let mut sim = Simulation::load_level(TileGrid::open(4, 4), &[SpawnPoint::hero(48.0, 48.0)], config(3)).unwrap();
        sim.step(1.0 / 60.0, &InputState::default());

        let corridor = TileGrid::from_ascii(&["#####", "#...#", "#####"]).unwrap();
        let spawns = [SpawnPoint::monster(48.0, 48.0), SpawnPoint::monster(112.0, 48.0)];
        sim.reload_level(corridor, &spawns).unwrap();

        assert_eq!(sim.frame(), 0);
        assert_eq!(sim.agents().len(), 2);
        assert_eq!(sim.graph().len(), 2);
        assert_eq!(sim.agents().capacity(), 3);

        let too_many = vec![SpawnPoint::npc(48.0, 48.0); 4];
        let err = sim.reload_level(TileGrid::open(2, 2), &too_many);
        assert_eq!(err, Err(LevelError::CapacityExceeded { capacity: 3 }));
        assert_eq!(sim.grid().cols(), 5, "failed reload keeps the old level");
    }
}
