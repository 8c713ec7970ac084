//! Declarative map descriptions and their validation.
//!
//! A [`MapBlueprint`] is the only way to obtain a [`World`](crate::World).
//! Everything malformed is rejected here with a [`SetupError`] so the
//! per-turn code never has to re-check structural invariants.

use lockdown_core::{BotKind, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rejected blueprint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// Both map dimensions must be at least 1.
    #[error("map size {0} has a non-positive dimension")]
    InvalidMapSize(Vec2),
    /// A placement named a coordinate outside the board rectangle.
    #[error("placement at {0} is outside the board")]
    OutOfBounds(Vec2),
    /// Respawn timers must run for at least one turn.
    #[error("spawner at {0} has a zero respawn duration")]
    ZeroDuration(Vec2),
    /// Two doors claimed the same key.
    #[error("door key {0:?} is declared twice")]
    DuplicateDoorKey(String),
    /// A generator referenced a door key no placement declares.
    #[error("door key {0:?} is not declared by any placement")]
    UnknownDoorKey(String),
    /// Every board needs exactly one avatar.
    #[error("blueprint places no avatar")]
    MissingAvatar,
    /// Every board needs exactly one avatar.
    #[error("blueprint places more than one avatar")]
    DuplicateAvatar,
    /// At most one bot of each kind may patrol a board.
    #[error("bot kind {0:?} is placed twice")]
    DuplicateBot(BotKind),
    /// A placement tried to stack on top of something unstackable.
    #[error("placement at {0} is blocked by an earlier placement")]
    BlockedPlacement(Vec2),
}

/// What to put at a single coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSpec {
    /// Impassable terrain.
    Wall,
    /// A crawl space.
    Vent,
    /// A passage toggled by generators, addressed by `key`.
    Door {
        /// Blueprint-unique name generators wire themselves to.
        key: String,
    },
    /// A safe-room tile.
    Refuge,
    /// A door-opening station.
    Generator {
        /// Scrap units one activation consumes.
        cost: u32,
        /// Points granted the first time this generator is activated.
        activation_bonus: i64,
        /// Score multiplier contributed while active.
        multiplier_bonus: f64,
        /// Keys of the doors this generator toggles.
        doors: Vec<String>,
    },
    /// A power pickup spot.
    BatterySpawner {
        /// Turns between grants.
        turns_to_respawn: u32,
        /// Power restored per grant.
        recharge_amount: u32,
        /// Points granted alongside the recharge.
        point_value: i64,
    },
    /// A scrap pickup spot.
    ScrapSpawner {
        /// Turns between grants.
        turns_to_respawn: u32,
        /// Points granted alongside the scrap unit.
        point_value: i64,
    },
    /// A points pickup spot.
    CoinSpawner {
        /// Turns between grants.
        turns_to_respawn: u32,
        /// Points granted per grant.
        point_value: i64,
    },
    /// The player start cell.
    Avatar,
    /// A hostile unit's start cell.
    Bot {
        /// Which behavior family patrols from here. Serialized as
        /// `bot_kind` so it cannot collide with the variant tag.
        #[serde(rename = "bot_kind")]
        kind: BotKind,
    },
}

/// One object at one coordinate. Placements sharing a coordinate stack in
/// declaration order, first at the bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Target cell.
    pub at: Vec2,
    /// What to create there.
    pub object: ObjectSpec,
}

/// A complete, reproducible map description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapBlueprint {
    /// Seed for every random draw the run makes.
    pub seed: u64,
    /// Width and height of the board.
    pub map_size: Vec2,
    /// Whether to ring the board perimeter with walls. A placement on a
    /// perimeter cell replaces the auto-generated wall there.
    pub walled: bool,
    /// Objects to create.
    pub placements: Vec<Placement>,
}

impl MapBlueprint {
    pub(crate) fn validate(&self) -> Result<(), SetupError> {
        if self.map_size.x < 1 || self.map_size.y < 1 {
            return Err(SetupError::InvalidMapSize(self.map_size));
        }
        let mut avatars = 0usize;
        let mut bot_kinds: Vec<BotKind> = Vec::new();
        let mut door_keys: Vec<&str> = Vec::new();
        for placement in &self.placements {
            let at = placement.at;
            let in_bounds =
                at.x >= 0 && at.y >= 0 && at.x < self.map_size.x && at.y < self.map_size.y;
            if !in_bounds {
                return Err(SetupError::OutOfBounds(at));
            }
            match &placement.object {
                ObjectSpec::Avatar => avatars += 1,
                ObjectSpec::Bot { kind } => {
                    if bot_kinds.contains(kind) {
                        return Err(SetupError::DuplicateBot(*kind));
                    }
                    bot_kinds.push(*kind);
                }
                ObjectSpec::Door { key } => {
                    if door_keys.contains(&key.as_str()) {
                        return Err(SetupError::DuplicateDoorKey(key.clone()));
                    }
                    door_keys.push(key);
                }
                ObjectSpec::BatterySpawner {
                    turns_to_respawn, ..
                }
                | ObjectSpec::ScrapSpawner {
                    turns_to_respawn, ..
                }
                | ObjectSpec::CoinSpawner {
                    turns_to_respawn, ..
                } => {
                    if *turns_to_respawn == 0 {
                        return Err(SetupError::ZeroDuration(at));
                    }
                }
                _ => {}
            }
        }
        for placement in &self.placements {
            if let ObjectSpec::Generator { doors, .. } = &placement.object {
                for key in doors {
                    if !door_keys.contains(&key.as_str()) {
                        return Err(SetupError::UnknownDoorKey(key.clone()));
                    }
                }
            }
        }
        match avatars {
            0 => Err(SetupError::MissingAvatar),
            1 => Ok(()),
            _ => Err(SetupError::DuplicateAvatar),
        }
    }
}
