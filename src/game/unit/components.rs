use serde::{Deserialize, Serialize};

/// Faction bits. An agent belongs to exactly one faction; hunt policies are
/// any combination of them.
pub mod factions {
    pub const NONE: u8 = 0;
    pub const HERO: u8 = 1;
    pub const MONSTER: u8 = 2;
    pub const NPC: u8 = 4;
    pub const ALL: u8 = HERO | MONSTER | NPC;
}

/// Which per-frame function drives an agent's velocity.
///
/// The discriminant is the index into the controller dispatch table.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    /// Stands still.
    #[default]
    None = 0,
    /// Follows the host's directional input.
    Player = 1,
    /// Hunts hostile agents.
    Ai = 2,
}

impl ControllerKind {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Dense index of an agent in the [`AgentStore`](super::AgentStore).
///
/// Ids are handed out in spawn order and stay valid until the store is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One entry of a level's spawn list.
///
/// Float coordinates because spawn lists come from level files and hosts;
/// everything is converted to fixed point on spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Body centre in world pixels.
    pub x: f32,
    pub y: f32,
    pub faction: u8,
    /// Factions this agent considers hostile.
    pub hunt_policy: u8,
    pub controller: ControllerKind,
    /// Whether the agent takes part in separation.
    #[serde(default = "default_true")]
    pub has_steering: bool,
    /// Overrides the controller's default speed.
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub hp: Option<i32>,
}

fn default_true() -> bool {
    true
}

impl SpawnPoint {
    /// Player-controlled hero that hunts monsters.
    pub fn hero(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            faction: factions::HERO,
            hunt_policy: factions::MONSTER,
            controller: ControllerKind::Player,
            has_steering: false,
            speed: None,
            hp: None,
        }
    }

    /// AI monster that hunts heroes and NPCs.
    pub fn monster(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            faction: factions::MONSTER,
            hunt_policy: factions::HERO | factions::NPC,
            controller: ControllerKind::Ai,
            has_steering: true,
            speed: None,
            hp: None,
        }
    }

    /// Idle bystander.
    pub fn npc(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            faction: factions::NPC,
            hunt_policy: factions::NONE,
            controller: ControllerKind::None,
            has_steering: false,
            speed: None,
            hp: None,
        }
    }

    pub fn with_controller(mut self, controller: ControllerKind) -> Self {
        self.controller = controller;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }
}
