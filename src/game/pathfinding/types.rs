use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::fixed_math::FixedVec2;

/// Index of a waypoint inside a [`WaypointGraph`](super::WaypointGraph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, PartialOrd, Ord)]
pub struct WaypointId(pub u32);

impl WaypointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Cardinal directions used for neighbor classification and ray walks.
///
/// The declaration order is the edge insertion order of every waypoint's
/// neighbor list, which in turn decides how the next-step table breaks ties
/// between equally short routes. Do not reorder.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North = 0,
    South = 1,
    West = 2,
    East = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// `(row, col)` step for this direction.
    #[inline]
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }
}

/// Routing anchor placed at a junction, corner or dead end of the tile grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub row: usize,
    pub col: usize,
    /// Centre of the waypoint's tile in world pixels.
    pub position: FixedVec2,
    /// At most one neighbor per direction, in N, S, W, E order.
    pub neighbors: SmallVec<[WaypointId; 4]>,
}

/// Bounded route returned by [`NextStepTable::path_into`](super::NextStepTable::path_into).
/// Stays on the stack for the default hop cap.
pub type RoutePath = SmallVec<[WaypointId; 16]>;
