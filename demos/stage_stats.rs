/// Per-stage timing of the simulation pipeline with 1 000 agents.
///
/// Run with `cargo run --release --example stage_stats`.
use std::time::{Duration, Instant};

use bevy::prelude::*;
use horde::game::fixed_math::FixedNum;
use horde::game::map::TileGrid;
use horde::game::pathfinding::Navigation;
use horde::game::simulation::physics::integrate_movement;
use horde::game::simulation::{InputState, SimConfig};
use horde::game::spatial_hash::SpatialHash;
use horde::game::unit::{run_controllers, AgentId, AgentStore, FrameContext, SpawnPoint, SteerScratch};
use tracing_subscriber::EnvFilter;

const AGENTS: usize = 1_000;
const FRAMES: u64 = 300;

#[derive(Default)]
struct StageTotals {
    hash: Duration,
    controllers: Duration,
    integrate: Duration,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SimConfig { agent_capacity: AGENTS, ..Default::default() };
    let grid = TileGrid::random(96, 96, 0.15, 42);

    let start = Instant::now();
    let nav = Navigation::build(&grid);
    info!("Navigation build: {:?}", start.elapsed());

    let mut rng = fastrand::Rng::with_seed(42);
    let mut store = AgentStore::new(AGENTS);
    while store.len() < AGENTS {
        let row = rng.usize(0..grid.rows());
        let col = rng.usize(0..grid.cols());
        if !grid.is_walkable(row as isize, col as isize) {
            continue;
        }
        let pos = grid.tile_center(row, col);
        let spawn = if store.is_empty() {
            SpawnPoint::hero(pos.x.to_num(), pos.y.to_num())
        } else {
            SpawnPoint::monster(pos.x.to_num(), pos.y.to_num())
        };
        let Ok(id) = store.spawn(&spawn, &config) else {
            break;
        };
        store.set_current_waypoint(id, nav.graph().nearest(pos));
    }

    let mut hash = SpatialHash::for_grid(&grid);
    let mut scratch = SteerScratch::with_neighbor_capacity(config.neighbor_capacity);
    let dt = FixedNum::from_num(1.0 / config.tick_rate);
    let mut totals = StageTotals::default();

    for frame in 0..FRAMES {
        let t = Instant::now();
        hash.rebuild(&store);
        totals.hash += t.elapsed();

        let ctx = FrameContext {
            grid: &grid,
            nav: &nav,
            hash: &hash,
            config: &config,
            probe: config.sight_probe(),
            input: InputState { right: frame % 200 < 100, left: frame % 200 >= 100, ..default() },
            frame,
            dt,
        };
        let t = Instant::now();
        run_controllers(&mut store, &ctx, &mut scratch);
        totals.controllers += t.elapsed();

        let t = Instant::now();
        integrate_movement(&mut store, &grid, nav.graph(), &config, dt);
        totals.integrate += t.elapsed();
    }

    let engaged = store.ids().filter(|&id| store.target(id).is_some()).count();
    let per_frame = |d: Duration| d / FRAMES as u32;

    info!("========================================");
    info!("Stage timings over {} frames, {} agents", FRAMES, store.len());
    info!("  spatial hash rebuild: {:?}/frame", per_frame(totals.hash));
    info!("  controllers:          {:?}/frame", per_frame(totals.controllers));
    info!("  movement integration: {:?}/frame", per_frame(totals.integrate));
    info!("  engaged agents:       {}", engaged);
    info!("  hero position:        {:?}", store.position(AgentId(0)).to_vec2());
    info!("========================================");
}
