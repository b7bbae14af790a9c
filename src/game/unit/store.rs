use bevy::prelude::*;

use crate::game::error::LevelError;
use crate::game::fixed_math::{checked_world_num, FixedNum, FixedVec2};
use crate::game::pathfinding::WaypointId;
use crate::game::simulation::SimConfig;
use super::components::{AgentId, ControllerKind, SpawnPoint};

/// Default hit points for agents whose spawn point does not set any.
pub const DEFAULT_HP: i32 = 100;

/// Structure-of-arrays storage for every agent of a level.
///
/// All columns are allocated to full capacity up front and never grow. Agents
/// are appended by [`spawn`](Self::spawn) and only ever removed all at once by
/// [`reset`](Self::reset), so an [`AgentId`] is simply a column index below
/// [`len`](Self::len).
///
/// Within a frame the controllers write velocities and the integrator writes
/// positions; nothing else mutates the store while a step runs.
#[derive(Clone, Debug)]
pub struct AgentStore {
    capacity: usize,
    active_count: usize,

    positions: Vec<FixedVec2>,
    velocities: Vec<FixedVec2>,
    /// Body width (x) and height (y).
    sizes: Vec<FixedVec2>,

    factions: Vec<u8>,
    /// Faction to restore when a charm wears off.
    base_factions: Vec<u8>,
    hunt_policies: Vec<u8>,
    base_hunt_policies: Vec<u8>,
    controllers: Vec<ControllerKind>,
    has_steering: Vec<bool>,

    hp: Vec<i32>,
    enabled: Vec<bool>,
    targets: Vec<Option<AgentId>>,

    speeds: Vec<FixedNum>,
    aggro_ranges: Vec<FixedNum>,
    attack_ranges: Vec<FixedNum>,
    attack_ranges_sq: Vec<FixedNum>,

    current_waypoints: Vec<Option<WaypointId>>,
    /// Seconds of charm left; zero when not charmed.
    pub(super) charm_remaining: Vec<FixedNum>,
}

impl AgentStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active_count: 0,
            positions: vec![FixedVec2::ZERO; capacity],
            velocities: vec![FixedVec2::ZERO; capacity],
            sizes: vec![FixedVec2::ZERO; capacity],
            factions: vec![0; capacity],
            base_factions: vec![0; capacity],
            hunt_policies: vec![0; capacity],
            base_hunt_policies: vec![0; capacity],
            controllers: vec![ControllerKind::None; capacity],
            has_steering: vec![false; capacity],
            hp: vec![0; capacity],
            enabled: vec![false; capacity],
            targets: vec![None; capacity],
            speeds: vec![FixedNum::ZERO; capacity],
            aggro_ranges: vec![FixedNum::ZERO; capacity],
            attack_ranges: vec![FixedNum::ZERO; capacity],
            attack_ranges_sq: vec![FixedNum::ZERO; capacity],
            current_waypoints: vec![None; capacity],
            charm_remaining: vec![FixedNum::ZERO; capacity],
        }
    }

    /// Append one agent.
    ///
    /// Fails with [`LevelError::CapacityExceeded`] once every slot is taken and
    /// with [`LevelError::InvalidSpawn`] if the position or speed override is
    /// NaN, infinite or beyond [`WORLD_LIMIT`](crate::game::fixed_math::WORLD_LIMIT).
    /// Nothing is written on failure.
    pub fn spawn(&mut self, spawn: &SpawnPoint, config: &SimConfig) -> Result<AgentId, LevelError> {
        if self.active_count >= self.capacity {
            return Err(LevelError::CapacityExceeded { capacity: self.capacity });
        }

        let i = self.active_count;
        let invalid = LevelError::InvalidSpawn { index: i };
        let (Some(x), Some(y)) = (checked_world_num(spawn.x), checked_world_num(spawn.y)) else {
            return Err(invalid);
        };
        let speed = match spawn.speed {
            Some(speed) => checked_world_num(speed).ok_or(invalid)?,
            None => match spawn.controller {
                ControllerKind::Player => config.player_speed,
                ControllerKind::Ai | ControllerKind::None => config.agent_speed,
            },
        };

        self.positions[i] = FixedVec2::new(x, y);
        self.velocities[i] = FixedVec2::ZERO;
        self.sizes[i] = FixedVec2::new(config.body_size, config.body_size);
        self.factions[i] = spawn.faction;
        self.base_factions[i] = spawn.faction;
        self.hunt_policies[i] = spawn.hunt_policy;
        self.base_hunt_policies[i] = spawn.hunt_policy;
        self.controllers[i] = spawn.controller;
        self.has_steering[i] = spawn.has_steering;
        self.hp[i] = spawn.hp.unwrap_or(DEFAULT_HP);
        self.enabled[i] = true;
        self.targets[i] = None;
        self.speeds[i] = speed;
        self.aggro_ranges[i] = config.aggro_range;
        self.attack_ranges[i] = config.attack_range;
        self.attack_ranges_sq[i] = config.attack_range * config.attack_range;
        self.current_waypoints[i] = None;
        self.charm_remaining[i] = FixedNum::ZERO;

        self.active_count += 1;
        Ok(AgentId(i as u32))
    }

    /// Drop every agent. Buffers are kept for the next level.
    pub fn reset(&mut self) {
        for i in 0..self.active_count {
            self.targets[i] = None;
            self.velocities[i] = FixedVec2::ZERO;
            self.charm_remaining[i] = FixedNum::ZERO;
        }
        debug!("Agent store reset ({} agents dropped)", self.active_count);
        self.active_count = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.active_count
    }

    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    /// Ids of all active agents in spawn order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.active_count as u32).map(AgentId)
    }

    #[inline]
    pub fn is_active(&self, id: AgentId) -> bool {
        id.index() < self.active_count
    }

    // ------------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------------

    #[inline]
    pub fn position(&self, id: AgentId) -> FixedVec2 {
        self.positions[id.index()]
    }

    #[inline]
    pub fn set_position(&mut self, id: AgentId, pos: FixedVec2) {
        self.positions[id.index()] = pos;
    }

    /// Positions of the active agents.
    pub fn positions(&self) -> &[FixedVec2] {
        &self.positions[..self.active_count]
    }

    #[inline]
    pub fn velocity(&self, id: AgentId) -> FixedVec2 {
        self.velocities[id.index()]
    }

    #[inline]
    pub fn set_velocity(&mut self, id: AgentId, vel: FixedVec2) {
        self.velocities[id.index()] = vel;
    }

    #[inline]
    pub fn size(&self, id: AgentId) -> FixedVec2 {
        self.sizes[id.index()]
    }

    #[inline]
    pub fn faction(&self, id: AgentId) -> u8 {
        self.factions[id.index()]
    }

    #[inline]
    pub fn base_faction(&self, id: AgentId) -> u8 {
        self.base_factions[id.index()]
    }

    pub(super) fn set_faction(&mut self, id: AgentId, faction: u8) {
        self.factions[id.index()] = faction;
    }

    #[inline]
    pub fn hunt_policy(&self, id: AgentId) -> u8 {
        self.hunt_policies[id.index()]
    }

    #[inline]
    pub fn base_hunt_policy(&self, id: AgentId) -> u8 {
        self.base_hunt_policies[id.index()]
    }

    pub(super) fn set_hunt_policy(&mut self, id: AgentId, policy: u8) {
        self.hunt_policies[id.index()] = policy;
    }

    #[inline]
    pub fn controller(&self, id: AgentId) -> ControllerKind {
        self.controllers[id.index()]
    }

    #[inline]
    pub fn has_steering(&self, id: AgentId) -> bool {
        self.has_steering[id.index()]
    }

    #[inline]
    pub fn hp(&self, id: AgentId) -> i32 {
        self.hp[id.index()]
    }

    #[inline]
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.hp[id.index()] > 0
    }

    #[inline]
    pub fn is_enabled(&self, id: AgentId) -> bool {
        self.enabled[id.index()]
    }

    #[inline]
    pub fn target(&self, id: AgentId) -> Option<AgentId> {
        self.targets[id.index()]
    }

    #[inline]
    pub fn set_target(&mut self, id: AgentId, target: Option<AgentId>) {
        self.targets[id.index()] = target;
    }

    #[inline]
    pub fn speed(&self, id: AgentId) -> FixedNum {
        self.speeds[id.index()]
    }

    #[inline]
    pub fn aggro_range(&self, id: AgentId) -> FixedNum {
        self.aggro_ranges[id.index()]
    }

    #[inline]
    pub fn attack_range(&self, id: AgentId) -> FixedNum {
        self.attack_ranges[id.index()]
    }

    #[inline]
    pub fn attack_range_sq(&self, id: AgentId) -> FixedNum {
        self.attack_ranges_sq[id.index()]
    }

    #[inline]
    pub fn current_waypoint(&self, id: AgentId) -> Option<WaypointId> {
        self.current_waypoints[id.index()]
    }

    #[inline]
    pub fn set_current_waypoint(&mut self, id: AgentId, wp: Option<WaypointId>) {
        self.current_waypoints[id.index()] = wp;
    }

    // ------------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------------

    /// True when `other` is active, alive and enabled.
    ///
    /// Target references are weak; every read goes through this check.
    #[inline]
    pub fn is_valid_target(&self, other: AgentId) -> bool {
        self.is_active(other) && self.is_alive(other) && self.is_enabled(other)
    }

    /// True when `hunter`'s hunt policy covers `prey`'s current faction.
    #[inline]
    pub fn is_hostile(&self, hunter: AgentId, prey: AgentId) -> bool {
        hunter != prey && self.hunt_policy(hunter) & self.faction(prey) != 0
    }

    /// Whether the agent takes part in this frame at all.
    #[inline]
    pub fn participates(&self, id: AgentId) -> bool {
        self.is_alive(id) && self.is_enabled(id)
    }

    // ------------------------------------------------------------------------
    // Damage & lifecycle
    // ------------------------------------------------------------------------

    /// Subtract hit points. Returns `true` when this hit killed the agent.
    ///
    /// Dead agents stop moving immediately and drop their target; hunters
    /// that were chasing them let go on their next frame.
    pub fn apply_damage(&mut self, id: AgentId, amount: i32) -> bool {
        if !self.is_active(id) || !self.is_alive(id) {
            return false;
        }
        let i = id.index();
        self.hp[i] = self.hp[i].saturating_sub(amount);
        if self.hp[i] > 0 {
            return false;
        }
        self.velocities[i] = FixedVec2::ZERO;
        self.targets[i] = None;
        debug!("Agent {} died", id.0);
        true
    }

    /// Toggle whether an agent participates in the simulation.
    pub fn set_enabled(&mut self, id: AgentId, enabled: bool) {
        if !self.is_active(id) {
            return;
        }
        let i = id.index();
        self.enabled[i] = enabled;
        if !enabled {
            self.velocities[i] = FixedVec2::ZERO;
            self.targets[i] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::unit::factions;

    #[test]
    fn test_spawn_assigns_dense_ids() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(4);
        let a = store.spawn(&SpawnPoint::hero(10.0, 20.0), &config).unwrap();
        let b = store.spawn(&SpawnPoint::monster(30.0, 40.0), &config).unwrap();

        assert_eq!(a, AgentId(0));
        assert_eq!(b, AgentId(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.position(b), FixedVec2::from_f32(30.0, 40.0));
        assert_eq!(store.speed(a), config.player_speed);
        assert_eq!(store.speed(b), config.agent_speed);
        assert_eq!(store.hp(a), DEFAULT_HP);
        assert_eq!(store.attack_range_sq(b), FixedNum::from_num(900));
    }

    #[test]
    fn test_capacity_overflow_is_an_error() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(1);
        store.spawn(&SpawnPoint::npc(0.0, 0.0), &config).unwrap();
        let err = store.spawn(&SpawnPoint::npc(0.0, 0.0), &config).unwrap_err();
        assert_eq!(err, LevelError::CapacityExceeded { capacity: 1 });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_reuses_buffers() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(2);
        let a = store.spawn(&SpawnPoint::monster(0.0, 0.0), &config).unwrap();
        store.set_target(a, Some(AgentId(1)));
        store.reset();

        assert!(store.is_empty());
        assert_eq!(store.capacity(), 2);
        assert_eq!(store.ids().count(), 0);

        let again = store.spawn(&SpawnPoint::npc(5.0, 5.0), &config).unwrap();
        assert_eq!(again, AgentId(0));
        assert_eq!(store.target(again), None);
    }

    #[test]
    fn test_hostility_follows_hunt_policy() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(3);
        let hero = store.spawn(&SpawnPoint::hero(0.0, 0.0), &config).unwrap();
        let monster = store.spawn(&SpawnPoint::monster(0.0, 0.0), &config).unwrap();
        let npc = store.spawn(&SpawnPoint::npc(0.0, 0.0), &config).unwrap();

        assert!(store.is_hostile(monster, hero));
        assert!(store.is_hostile(monster, npc));
        assert!(store.is_hostile(hero, monster));
        assert!(!store.is_hostile(npc, monster));
        assert!(!store.is_hostile(monster, monster));
        assert_eq!(store.faction(npc), factions::NPC);
    }

    #[test]
    fn test_damage_kills_and_invalidates() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(2);
        let a = store.spawn(&SpawnPoint::monster(0.0, 0.0).with_hp(10), &config).unwrap();
        store.set_velocity(a, FixedVec2::from_f32(3.0, 0.0));

        assert!(!store.apply_damage(a, 4));
        assert!(store.is_valid_target(a));
        assert!(store.apply_damage(a, 6));
        assert!(!store.is_alive(a));
        assert!(!store.is_valid_target(a));
        assert_eq!(store.velocity(a), FixedVec2::ZERO);
        // Already dead
        assert!(!store.apply_damage(a, 6));
    }

    #[test]
    fn test_disabled_and_inactive_are_not_targets() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(4);
        let a = store.spawn(&SpawnPoint::hero(0.0, 0.0), &config).unwrap();
        store.set_enabled(a, false);
        assert!(!store.is_valid_target(a));
        store.set_enabled(a, true);
        assert!(store.is_valid_target(a));
        assert!(!store.is_valid_target(AgentId(3)));
    }

    #[test]
    fn test_non_finite_spawn_is_rejected() {
        let config = SimConfig::default();
        let mut store = AgentStore::new(4);
        store.spawn(&SpawnPoint::hero(10.0, 10.0), &config).unwrap();

        assert_eq!(
            store.spawn(&SpawnPoint::monster(f32::NAN, 0.0), &config),
            Err(LevelError::InvalidSpawn { index: 1 })
        );
        assert_eq!(
            store.spawn(&SpawnPoint::monster(0.0, f32::INFINITY), &config),
            Err(LevelError::InvalidSpawn { index: 1 })
        );
        assert_eq!(
            store.spawn(&SpawnPoint::monster(1.0e15, 0.0), &config),
            Err(LevelError::InvalidSpawn { index: 1 })
        );
        assert_eq!(
            store.spawn(&SpawnPoint::monster(0.0, 0.0).with_speed(f32::NAN), &config),
            Err(LevelError::InvalidSpawn { index: 1 })
        );
        assert_eq!(store.len(), 1);

        let ok = store.spawn(&SpawnPoint::monster(20.0, 20.0), &config).unwrap();
        assert_eq!(ok, AgentId(1));
    }
}
