use bevy::prelude::*;

use horde::game::config::{InitialConfig, INITIAL_CONFIG_PATH};
use horde::game::map::TileGrid;
use horde::game::simulation::{InputState, SimTick, Simulation};
use horde::game::unit::SpawnPoint;
use horde::game::HordePlugin;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const LEVEL_COLS: usize = 64;
const LEVEL_ROWS: usize = 48;
const WALL_CHANCE: f64 = 0.18;
const LEVEL_SEED: u64 = 0x5eed;
const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_MONSTERS: usize = 500;

fn setup_file_logging() -> Option<String> {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {e}");
        return None;
    }

    // Keep only the most recent runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("horde_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("horde=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|s| s.starts_with("horde") && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

/// One hero near the middle of the level and `monsters` AI agents on random
/// walkable tiles.
fn build_spawns(grid: &TileGrid, monsters: usize, seed: u64) -> Vec<SpawnPoint> {
    let free: Vec<(usize, usize)> = (0..grid.rows())
        .flat_map(|row| (0..grid.cols()).map(move |col| (row, col)))
        .filter(|&(row, col)| grid.is_walkable(row as isize, col as isize))
        .collect();
    if free.is_empty() {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut spawns = Vec::with_capacity(monsters + 1);

    let (mid_row, mid_col) = free[free.len() / 2];
    let hero = grid.tile_center(mid_row, mid_col);
    spawns.push(SpawnPoint::hero(hero.x.to_num(), hero.y.to_num()));

    for _ in 0..monsters {
        let (row, col) = free[rng.random_range(0..free.len())];
        let pos = grid.tile_center(row, col);
        spawns.push(SpawnPoint::monster(pos.x.to_num(), pos.y.to_num()));
    }
    spawns
}

fn main() {
    let log_file = setup_file_logging();

    let mut args = std::env::args().skip(1);
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_FRAMES);
    let monsters: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_MONSTERS);

    if let Some(path) = &log_file {
        info!("Logging to {}", path);
    }

    let initial = InitialConfig::load_or_default(INITIAL_CONFIG_PATH);
    let config = match initial.to_sim_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let grid = TileGrid::random(LEVEL_COLS, LEVEL_ROWS, WALL_CHANCE, LEVEL_SEED);
    let spawns = build_spawns(&grid, monsters.min(config.agent_capacity.saturating_sub(1)), LEVEL_SEED);

    let mut app = App::new();
    app.add_plugins(HordePlugin { grid, spawns, config });

    if !app.world().contains_resource::<Simulation>() {
        error!("Level failed to load, nothing to run");
        std::process::exit(1);
    }

    let start = Instant::now();
    for frame in 0..frames {
        // Walk the hero around in a slow square
        let input = match (frame / 120) % 4 {
            0 => InputState { right: true, ..default() },
            1 => InputState { down: true, ..default() },
            2 => InputState { left: true, ..default() },
            _ => InputState { up: true, ..default() },
        };
        app.world_mut().insert_resource(input);
        app.world_mut().run_schedule(FixedUpdate);
    }
    let elapsed = start.elapsed();

    let world = app.world();
    let tick = world.resource::<SimTick>().0;
    if let Some(sim) = world.get_resource::<Simulation>() {
        let engaged = sim.agents().ids().filter(|&id| sim.agents().target(id).is_some()).count();
        info!(
            "Ran {} frames with {} agents in {:?} ({:.1} frames/s), {} agents engaged",
            tick,
            sim.agents().len(),
            elapsed,
            tick as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            engaged
        );
    }
}
