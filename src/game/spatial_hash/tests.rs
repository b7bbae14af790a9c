use super::*;
use crate::game::fixed_math::FixedVec2;
use crate::game::simulation::SimConfig;
use crate::game::unit::{AgentStore, SpawnPoint};

fn store_with(points: &[(f32, f32)]) -> AgentStore {
    let config = SimConfig::default();
    let mut store = AgentStore::new(points.len().max(1));
    for &(x, y) in points {
        store.spawn(&SpawnPoint::monster(x, y), &config).unwrap();
    }
    store
}

#[test]
fn test_rebuild_buckets_by_tile() {
    let grid = TileGrid::open(10, 10);
    let store = store_with(&[(5.0, 5.0), (31.9, 0.0), (32.0, 0.0), (100.0, 70.0)]);

    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    assert_eq!(hash.cell_entities(0, 0), &[AgentId(0), AgentId(1)]);
    assert_eq!(hash.cell_entities(0, 1), &[AgentId(2)]);
    assert_eq!(hash.cell_entities(2, 3), &[AgentId(3)]);
    assert_eq!(hash.total_entries(), 4);
    assert_eq!(hash.non_empty_cells(), 3);
}

#[test]
fn test_rebuild_is_idempotent() {
    let grid = TileGrid::open(20, 20);
    let mut rng = fastrand::Rng::with_seed(3);
    let points: Vec<(f32, f32)> = (0..200)
        .map(|_| (rng.f32() * 640.0, rng.f32() * 640.0))
        .collect();
    let store = store_with(&points);

    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);
    let first: Vec<Vec<AgentId>> = hash.cells().to_vec();
    hash.rebuild(&store);

    assert_eq!(hash.cells(), first.as_slice());
    assert_eq!(hash.total_entries(), 200);
}

#[test]
fn test_query_excludes_self() {
    let grid = TileGrid::open(4, 4);
    let store = store_with(&[(10.0, 10.0)]);
    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    let mut out = NeighborBuffer::default();
    hash.query_neighbors(&store, AgentId(0), 1, &mut out);
    assert!(out.is_empty(), "an agent should not find itself");
}

#[test]
fn test_query_covers_the_surrounding_block() {
    let grid = TileGrid::open(10, 10);
    // Agent 0 sits in cell (2,2). Agents 1-2 are in adjacent cells, agent 3 is
    // two cells away.
    let store = store_with(&[(80.0, 80.0), (40.0, 40.0), (112.0, 80.0), (150.0, 80.0)]);
    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    let mut out = NeighborBuffer::default();
    hash.query_neighbors(&store, AgentId(0), 1, &mut out);
    assert_eq!(out.as_slice(), &[AgentId(1), AgentId(2)]);

    hash.query_neighbors(&store, AgentId(0), 2, &mut out);
    assert_eq!(out.len(), 3);
}

#[test]
fn test_query_clamps_at_grid_edges() {
    let grid = TileGrid::open(3, 3);
    let store = store_with(&[(1.0, 1.0), (95.0, 95.0), (40.0, 40.0)]);
    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    let mut out = NeighborBuffer::default();
    hash.query_neighbors(&store, AgentId(0), 5, &mut out);
    assert_eq!(out.as_slice(), &[AgentId(2), AgentId(1)]);
}

#[test]
fn test_out_of_bounds_agent_is_unbucketed() {
    let grid = TileGrid::open(4, 4);
    let store = store_with(&[(-5.0, 10.0), (10.0, 10.0), (500.0, 10.0)]);
    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    assert_eq!(hash.total_entries(), 1);

    let mut out = NeighborBuffer::default();
    hash.query_neighbors(&store, AgentId(0), 1, &mut out);
    assert!(out.is_empty(), "agents outside the grid see no one");

    // ...and nobody sees them
    hash.query_neighbors(&store, AgentId(1), 3, &mut out);
    assert!(out.is_empty());
}

#[test]
fn test_neighbor_buffer_truncates_silently() {
    let grid = TileGrid::open(4, 4);
    let points: Vec<(f32, f32)> = (0..50).map(|i| (10.0 + (i % 10) as f32, 10.0)).collect();
    let store = store_with(&points);
    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    let mut out = NeighborBuffer::default();
    hash.query_neighbors(&store, AgentId(0), 1, &mut out);
    assert_eq!(out.len(), DEFAULT_NEIGHBOR_CAPACITY);
    assert!(out.is_full());
    assert!(!out.as_slice().contains(&AgentId(0)));

    let mut small = NeighborBuffer::with_capacity(4);
    hash.query_neighbors(&store, AgentId(0), 1, &mut small);
    assert_eq!(small.as_slice(), &[AgentId(1), AgentId(2), AgentId(3), AgentId(4)]);
}

#[test]
fn test_visit_block_is_not_capped() {
    let grid = TileGrid::open(4, 4);
    let points: Vec<(f32, f32)> = (0..50).map(|_| (20.0, 20.0)).collect();
    let store = store_with(&points);
    let mut hash = SpatialHash::for_grid(&grid);
    hash.rebuild(&store);

    let mut seen = 0;
    hash.visit_block(0, 0, 1, |_| seen += 1);
    assert_eq!(seen, 50);
}

#[test]
fn test_cell_coords_rejects_negative_and_far_points() {
    let hash = SpatialHash::new(4, 4, FixedNum::from_num(32));
    assert_eq!(hash.cell_coords(FixedVec2::from_f32(0.0, 0.0)), Some((0, 0)));
    assert_eq!(hash.cell_coords(FixedVec2::from_f32(127.9, 96.0)), Some((3, 3)));
    assert_eq!(hash.cell_coords(FixedVec2::from_f32(128.0, 0.0)), None);
    assert_eq!(hash.cell_coords(FixedVec2::from_f32(-0.1, 0.0)), None);
}
