/// All-pairs next-step routing table
///
/// Provides O(1) lookups of "which neighbor do I move to next" for every
/// (current waypoint, goal waypoint) pair, built once per level by running a
/// breadth-first search rooted at every waypoint.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;

use super::graph_build::WaypointGraph;
use super::types::{RoutePath, WaypointId};

/// Value indicating no route exists (or `from == goal`)
const NO_ROUTE: u32 = u32::MAX;

/// Next-hop arena
///
/// Maps [from_idx][goal_idx] -> neighbor of `from` on a shortest hop-count
/// path toward `goal`.
/// Size: W² entries for W waypoints.
#[derive(Clone, Debug, Default)]
pub struct NextStepTable {
    /// Flattened 2D array: [from * size + goal]
    next: Box<[u32]>,

    /// Number of waypoints the table was built for
    size: usize,
}

impl NextStepTable {
    /// Create an empty table where every entry is "no route"
    pub fn new(size: usize) -> Self {
        Self {
            next: vec![NO_ROUTE; size * size].into_boxed_slice(),
            size,
        }
    }

    /// Build the full table with one BFS per goal waypoint.
    ///
    /// Each BFS is rooted at the goal; when a node is discovered from its BFS
    /// parent, the parent is that node's next hop toward the goal. Ties go to
    /// whichever parent the BFS reaches first, i.e. neighbor-list order.
    pub fn build(graph: &WaypointGraph) -> Self {
        let size = graph.len();
        let mut table = Self::new(size);

        let mut visited = FixedBitSet::with_capacity(size);
        let mut queue: VecDeque<WaypointId> = VecDeque::with_capacity(size);

        for goal in graph.waypoints() {
            visited.clear();
            queue.clear();
            visited.insert(goal.id.index());
            queue.push_back(goal.id);

            while let Some(current) = queue.pop_front() {
                let Some(node) = graph.get(current) else { continue };
                for &neighbor in &node.neighbors {
                    if visited.contains(neighbor.index()) {
                        continue;
                    }
                    visited.insert(neighbor.index());
                    table.set_route(neighbor, goal.id, current);
                    queue.push_back(neighbor);
                }
            }
        }

        table
    }

    /// Number of waypoints covered by the table
    pub fn size(&self) -> usize {
        self.size
    }

    /// Next waypoint to move to from `from` toward `goal`
    ///
    /// # Returns
    /// `None` when `from == goal`, when the goal is unreachable, or when either
    /// id is outside the table
    #[inline]
    pub fn next(&self, from: WaypointId, goal: WaypointId) -> Option<WaypointId> {
        if from.index() >= self.size || goal.index() >= self.size {
            return None;
        }
        let hop = *self.next.get(from.index() * self.size + goal.index())?;
        if hop == NO_ROUTE {
            None
        } else {
            Some(WaypointId(hop))
        }
    }

    /// Set a single entry (used while building)
    #[inline]
    pub fn set_route(&mut self, from: WaypointId, goal: WaypointId, next: WaypointId) {
        if from.index() >= self.size || goal.index() >= self.size {
            return;
        }
        if let Some(slot) = self.next.get_mut(from.index() * self.size + goal.index()) {
            *slot = next.0;
        }
    }

    /// True when `goal` can be reached from `from` (a node always reaches itself)
    pub fn is_reachable(&self, from: WaypointId, goal: WaypointId) -> bool {
        from == goal || self.next(from, goal).is_some()
    }

    /// Follow the table from `from` toward `goal`, writing the visited
    /// waypoints (starting with `from`) into `out`.
    ///
    /// Stops on reaching the goal, on a missing route, on a self-hop, or after
    /// `max_hops` hops. Truncation is silent; the cap is what keeps a corrupted
    /// table from looping forever.
    pub fn path_into(&self, from: WaypointId, goal: WaypointId, max_hops: usize, out: &mut RoutePath) {
        out.clear();
        out.push(from);

        let mut current = from;
        for _ in 0..max_hops {
            if current == goal {
                break;
            }
            match self.next(current, goal) {
                Some(next) if next != current => {
                    out.push(next);
                    current = next;
                }
                _ => break,
            }
        }
    }
}
