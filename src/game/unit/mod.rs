mod components;
mod store;
mod status;
pub mod aggro;
pub mod boids;
pub mod controllers;

// Re-export public types
pub use components::{factions, AgentId, ControllerKind, SpawnPoint};
pub use store::{AgentStore, DEFAULT_HP};
pub use aggro::AggroState;
pub use boids::SteerScratch;
pub use controllers::{run_controllers, FrameContext};
