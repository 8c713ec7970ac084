//! Grid pathfinding used by pursuit behaviors.
//!
//! A* over four-connected cells with unit step cost plus an optional
//! per-cell surcharge. Expansion order and heap tie-breaking are fixed so
//! the same query always yields the same path, which keeps replays exact.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use lockdown_core::Vec2;

/// Neighbor expansion order: east, west, south, north.
const NEIGHBOR_OFFSETS: [Vec2; 4] = [
    Vec2 { x: 1, y: 0 },
    Vec2 { x: -1, y: 0 },
    Vec2 { x: 0, y: 1 },
    Vec2 { x: 0, y: -1 },
];

/// Surcharges for cells near known threats.
///
/// Disabled by default; pursuit planning only weighs danger when a caller
/// opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DangerModel {
    /// Added cost for cells within one step of a threat.
    pub adjacent_penalty: u32,
    /// Added cost for cells within three steps of a threat.
    pub near_penalty: u32,
}

impl DangerModel {
    /// The standard weighting: heavy next to a threat, light nearby.
    pub const STANDARD: Self = Self {
        adjacent_penalty: 50,
        near_penalty: 10,
    };

    /// Surcharge for stepping onto `at` given `threats`.
    #[must_use]
    pub fn cost(&self, at: Vec2, threats: &[Vec2]) -> u32 {
        let mut best = 0;
        for &threat in threats {
            let distance = at.manhattan_distance(threat);
            let penalty = if distance <= 1 {
                self.adjacent_penalty
            } else if distance <= 3 {
                self.near_penalty
            } else {
                0
            };
            best = best.max(penalty);
        }
        best
    }
}

/// Shortest path from `start` to `goal`, start included.
///
/// `passable` answers whether a cell may be entered; `start` itself is
/// never queried. `extra_cost` adds a surcharge for entering a cell on top
/// of the unit step cost. Ties on total estimated cost resolve by
/// insertion order, so earlier-discovered routes win.
#[must_use]
pub fn shortest_path(
    start: Vec2,
    goal: Vec2,
    passable: impl Fn(Vec2) -> bool,
    extra_cost: impl Fn(Vec2) -> u32,
) -> Option<Vec<Vec2>> {
    if start == goal {
        return Some(vec![start]);
    }
    let mut open: BinaryHeap<Reverse<(u32, u64, Vec2)>> = BinaryHeap::new();
    let mut came_from: HashMap<Vec2, Vec2> = HashMap::new();
    let mut best_cost: HashMap<Vec2, u32> = HashMap::new();
    let mut sequence: u64 = 0;
    let _ = best_cost.insert(start, 0);
    open.push(Reverse((start.manhattan_distance(goal), sequence, start)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == goal {
            return Some(reconstruct(&came_from, start, goal));
        }
        let current_cost = best_cost[&current];
        for offset in NEIGHBOR_OFFSETS {
            let next = current + offset;
            if !passable(next) {
                continue;
            }
            let step_cost = 1 + extra_cost(next);
            let tentative = current_cost.saturating_add(step_cost);
            let improved = match best_cost.get(&next) {
                Some(&known) => tentative < known,
                None => true,
            };
            if !improved {
                continue;
            }
            let _ = best_cost.insert(next, tentative);
            let _ = came_from.insert(next, current);
            sequence += 1;
            let estimate = tentative.saturating_add(next.manhattan_distance(goal));
            open.push(Reverse((estimate, sequence, next)));
        }
    }
    None
}

/// First step along the shortest path, or `None` when unreachable or
/// already at the goal.
#[must_use]
pub fn next_step(
    start: Vec2,
    goal: Vec2,
    passable: impl Fn(Vec2) -> bool,
    extra_cost: impl Fn(Vec2) -> u32,
) -> Option<Vec2> {
    let path = shortest_path(start, goal, passable, extra_cost)?;
    path.get(1).copied()
}

fn reconstruct(came_from: &HashMap<Vec2, Vec2>, start: Vec2, goal: Vec2) -> Vec<Vec2> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}
