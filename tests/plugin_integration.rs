use bevy::prelude::*;
use horde::game::map::TileGrid;
use horde::game::simulation::{InputState, SimConfig, SimTick, Simulation};
use horde::game::unit::{AgentId, SpawnPoint};
use horde::game::HordePlugin;

fn app_with(spawns: Vec<SpawnPoint>, config: SimConfig) -> App {
    let mut app = App::new();
    app.add_plugins(HordePlugin {
        grid: TileGrid::open(20, 20),
        spawns,
        config,
    });
    app
}

#[test]
fn test_plugin_steps_once_per_fixed_tick() {
    let mut app = app_with(vec![SpawnPoint::hero(320.0, 320.0)], SimConfig::default());
    assert!(app.world().contains_resource::<Simulation>());
    assert!(app.world().contains_resource::<InputState>());

    for _ in 0..5 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    assert_eq!(app.world().resource::<SimTick>().0, 5);
    assert_eq!(app.world().resource::<Simulation>().frame(), 5);
}

#[test]
fn test_plugin_reads_input_resource() {
    let mut app = app_with(vec![SpawnPoint::hero(320.0, 320.0)], SimConfig::default());
    app.world_mut().insert_resource(InputState { right: true, ..default() });

    for _ in 0..60 {
        app.world_mut().run_schedule(FixedUpdate);
    }

    // One second at 60 Hz and 250 px/s
    let x = app.world().resource::<Simulation>().agents().position(AgentId(0)).x.to_num::<f32>();
    assert!((x - 570.0).abs() < 0.5, "hero at x = {}", x);
}

#[test]
fn test_plugin_uses_configured_tick_rate() {
    let config = SimConfig { tick_rate: 30.0, ..Default::default() };
    let app = app_with(Vec::new(), config);
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    assert!((timestep.as_secs_f64() - 1.0 / 30.0).abs() < 1e-6);
}

#[test]
fn test_failed_load_leaves_no_simulation() {
    let config = SimConfig { agent_capacity: 1, ..Default::default() };
    let spawns = vec![SpawnPoint::monster(48.0, 48.0), SpawnPoint::monster(80.0, 48.0)];
    let mut app = app_with(spawns, config);

    assert!(!app.world().contains_resource::<Simulation>());
    app.world_mut().run_schedule(FixedUpdate);
    assert_eq!(app.world().resource::<SimTick>().0, 0);
}
