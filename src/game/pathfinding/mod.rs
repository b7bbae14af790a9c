mod types;
mod graph_build;
mod routing;
mod line_of_sight;
mod navigation;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{Direction, RoutePath, Waypoint, WaypointId};
pub use graph_build::{is_waypoint_cell, WaypointGraph};
pub use routing::NextStepTable;
pub use line_of_sight::{has_line_of_sight, SightProbe};
pub use navigation::{Navigation, SteerGoal};
