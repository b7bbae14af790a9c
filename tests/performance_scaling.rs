/// Progressive performance scaling checks.
///
/// Runs the full step pipeline at increasing agent counts and reports the
/// average frame time against the 60 Hz budget (16.6ms). Each scale only runs
/// if the previous one stayed within budget, so the output shows where the
/// simulation stops keeping up.
///
/// ## Usage
///
/// ```text
/// cargo test --release --test performance_scaling -- --ignored --nocapture
/// ```
///
/// Debug builds are far slower; the budget assertion only applies to the
/// 1 000 agent scale, which is the design target.
use std::time::{Duration, Instant};

use horde::game::map::TileGrid;
use horde::game::simulation::{InputState, SimConfig, Simulation};
use horde::game::unit::SpawnPoint;

const FRAME_BUDGET: Duration = Duration::from_micros(16_667);
const WARMUP_FRAMES: usize = 30;
const MEASURED_FRAMES: usize = 120;

struct ScaleResult {
    agents: usize,
    avg_frame: Duration,
    worst_frame: Duration,
}

fn spawn_horde(grid: &TileGrid, agents: usize, seed: u64) -> Vec<SpawnPoint> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut spawns = Vec::with_capacity(agents);
    while spawns.len() < agents {
        let row = rng.usize(0..grid.rows());
        let col = rng.usize(0..grid.cols());
        if !grid.is_walkable(row as isize, col as isize) {
            continue;
        }
        let pos = grid.tile_center(row, col);
        let (x, y) = (pos.x.to_num::<f32>(), pos.y.to_num::<f32>());
        // One hero per twenty agents keeps most of the horde engaged
        spawns.push(if spawns.len() % 20 == 0 { SpawnPoint::hero(x, y) } else { SpawnPoint::monster(x, y) });
    }
    spawns
}

fn run_scale(agents: usize) -> ScaleResult {
    let side = ((agents as f64).sqrt() * 3.0).ceil() as usize + 16;
    let grid = TileGrid::random(side, side, 0.15, agents as u64);
    let spawns = spawn_horde(&grid, agents, 7);
    let config = SimConfig { agent_capacity: agents, ..Default::default() };
    let mut sim = Simulation::load_level(grid, &spawns, config).unwrap();

    let input = InputState::default();
    for _ in 0..WARMUP_FRAMES {
        sim.step(1.0 / 60.0, &input);
    }

    let mut total = Duration::ZERO;
    let mut worst = Duration::ZERO;
    for _ in 0..MEASURED_FRAMES {
        let start = Instant::now();
        sim.step(1.0 / 60.0, &input);
        let elapsed = start.elapsed();
        total += elapsed;
        worst = worst.max(elapsed);
    }

    ScaleResult {
        agents,
        avg_frame: total / MEASURED_FRAMES as u32,
        worst_frame: worst,
    }
}

#[test]
#[ignore] // Long running, use --release
fn test_performance_scaling_suite() {
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Horde performance scaling (budget {:?}/frame)       ║", FRAME_BUDGET);
    println!("╚══════════════════════════════════════════════════════════╝");

    for agents in [100, 1_000, 5_000, 10_000] {
        let result = run_scale(agents);
        let within = result.avg_frame <= FRAME_BUDGET;
        println!(
            "{:>6} agents: avg {:>10.3?}  worst {:>10.3?}  {}",
            result.agents,
            result.avg_frame,
            result.worst_frame,
            if within { "OK" } else { "OVER BUDGET" }
        );

        if agents == 1_000 && cfg!(not(debug_assertions)) {
            assert!(within, "1 000 agents must fit the 60 Hz budget in release builds");
        }
        if !within {
            println!("Stopping at first scale over budget");
            break;
        }
    }
}
