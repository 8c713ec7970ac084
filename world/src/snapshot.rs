//! Read-only captures of the world for strategies and turn logs.
//!
//! A snapshot is a plain data tree: every cell stack in coordinate order
//! with a presentation-state string per object. The strings are computed
//! at capture time from live state, so they never need to round-trip.

use lockdown_core::{ObjectTag, Vec2};
use serde::{Deserialize, Serialize};

use crate::entities::{Avatar, Entity};
use crate::{SharedState, World};

/// One object in a captured cell stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    /// Presentation state at capture time, for example `"stunned"`.
    pub state: String,
    /// Full copy of the object.
    pub entity: Entity,
}

/// One non-empty cell, stack bottom first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Cell coordinate.
    pub at: Vec2,
    /// Objects on the cell, topmost last.
    pub stack: Vec<ObjectSnapshot>,
}

/// A complete world capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Width and height of the board.
    pub map_size: Vec2,
    /// Stun and refuge counters at capture time.
    pub shared: SharedState,
    /// Every non-empty cell in coordinate order.
    pub cells: Vec<CellSnapshot>,
}

impl WorldSnapshot {
    /// Captures the current world state.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let shared = world.shared().clone();
        let cells = world
            .board()
            .cells_ordered()
            .map(|(at, stack)| CellSnapshot {
                at,
                stack: stack
                    .iter()
                    .map(|&id| {
                        let entity = world.board().entity(id);
                        ObjectSnapshot {
                            state: presentation_state(entity, &shared).to_owned(),
                            entity: entity.clone(),
                        }
                    })
                    .collect(),
            })
            .collect();
        Self {
            map_size: world.board().map_size(),
            shared,
            cells,
        }
    }

    /// The topmost object at `at`, if the cell is non-empty.
    #[must_use]
    pub fn top(&self, at: Vec2) -> Option<&ObjectSnapshot> {
        self.cells
            .iter()
            .find(|cell| cell.at == at)
            .and_then(|cell| cell.stack.last())
    }

    /// Every object carrying `tag`, with its coordinate.
    #[must_use]
    pub fn find(&self, tag: ObjectTag) -> Vec<(Vec2, &ObjectSnapshot)> {
        self.cells
            .iter()
            .flat_map(|cell| {
                cell.stack
                    .iter()
                    .filter(|object| object.entity.tag() == tag)
                    .map(move |object| (cell.at, object))
            })
            .collect()
    }

    /// The avatar and its coordinate.
    #[must_use]
    pub fn avatar(&self) -> Option<(Vec2, &Avatar)> {
        self.cells.iter().find_map(|cell| {
            cell.stack.iter().find_map(|object| match &object.entity {
                Entity::Avatar(avatar) => Some((cell.at, avatar)),
                _ => None,
            })
        })
    }
}

fn presentation_state(entity: &Entity, shared: &SharedState) -> &'static str {
    match entity {
        Entity::Wall | Entity::Vent | Entity::Avatar(_) => "idle",
        Entity::Door(door) => {
            if door.is_open() {
                "open"
            } else {
                "closed"
            }
        }
        Entity::Refuge(refuge) => {
            if refuge.is_closed() {
                "closed"
            } else {
                "open"
            }
        }
        Entity::Generator(generator) => {
            if generator.is_active() {
                "active"
            } else {
                "inactive"
            }
        }
        Entity::BatterySpawner(spawner) => {
            if spawner.timer.is_done() {
                "idle"
            } else {
                "unavailable"
            }
        }
        Entity::ScrapSpawner(spawner) => {
            if spawner.timer.is_done() {
                "idle"
            } else {
                "unavailable"
            }
        }
        Entity::CoinSpawner(spawner) => {
            if spawner.timer.is_done() {
                "idle"
            } else {
                "unavailable"
            }
        }
        Entity::Bot(bot) => {
            if bot.has_attacked() {
                "attacking"
            } else if shared.is_stunned() {
                "stunned"
            } else {
                "idle"
            }
        }
    }
}
