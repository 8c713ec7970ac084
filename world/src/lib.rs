//! Authoritative simulation state.
//!
//! The [`World`] owns the board, every entity on it, and the process-wide
//! stun and refuge counters. Per-turn passes never touch entity internals
//! directly; they go through the mutation methods here, which keep the
//! stack bookkeeping and the entity position fields in agreement.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

mod board;
mod blueprint;
mod entities;
pub mod snapshot;

use lockdown_core::{BotKind, Direction, Event, Mover, ObjectTag, ResourceKind, Vec2};
use serde::{Deserialize, Serialize};

pub use board::{EntityId, GameBoard};
pub use blueprint::{MapBlueprint, ObjectSpec, Placement, SetupError};
pub use entities::{
    Avatar, BatterySpawner, Bot, CoinSpawner, Door, Entity, Generator, Inventory, Refuge,
    RespawnTimer, ScrapSpawner, SupportState, ATTACK_DAMAGE, DEFAULT_HEALTH,
    INVENTORY_CAPACITY, MAX_POWER, STUN_DURATION, SUPPORT_INITIAL_COUNTDOWN,
    SUPPORT_REARM_COUNTDOWN,
};

/// Turns the avatar may stay inside the refuge before eviction.
pub const MAX_TURNS_INSIDE: u32 = 10;
/// Turns the refuge stays closed after the avatar leaves it.
pub const MIN_TURNS_OUTSIDE: u32 = 5;

/// Refuge occupancy counters shared by every refuge tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefugeState {
    /// Whether the avatar currently stands on a refuge tile.
    pub occupied: bool,
    /// Consecutive turns spent inside. Reset on exit.
    pub turns_inside: u32,
    /// Consecutive turns spent outside. Reset on entry.
    pub turns_outside: u32,
}

impl Default for RefugeState {
    fn default() -> Self {
        // Starting at the threshold keeps the refuge open on turn one.
        Self {
            occupied: false,
            turns_inside: 0,
            turns_outside: MIN_TURNS_OUTSIDE,
        }
    }
}

impl RefugeState {
    /// Whether refuge tiles currently refuse entry.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.occupied && self.turns_outside < MIN_TURNS_OUTSIDE
    }
}

/// State shared process-wide rather than per entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedState {
    /// Turns every bot remains frozen. Zero means no stun is armed.
    pub stun_turns_remaining: u32,
    /// Refuge occupancy counters.
    pub refuge: RefugeState,
}

impl SharedState {
    /// Whether bots are frozen this turn.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.stun_turns_remaining > 0
    }
}

/// Passability rules for a navigation query.
#[derive(Debug, Clone, Copy, Default)]
pub struct TravelRules {
    /// Check per-mover hosting rules instead of kind-level occupiability.
    pub mover: Option<Mover>,
    /// Treat vent cells as passable.
    pub allow_vents: bool,
    /// Treat wall cells as passable.
    pub ignore_walls: bool,
}

/// The outcome of paying for a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorActivation {
    /// Activation succeeded; the contained points were awarded.
    Activated(i64),
    /// The generator was already running.
    AlreadyActive,
    /// The avatar could not cover the scrap cost.
    NotEnoughScrap,
}

/// The authoritative game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    board: GameBoard,
    shared: SharedState,
    seed: u64,
    avatar_id: EntityId,
    bot_ids: Vec<(BotKind, EntityId)>,
    generator_ids: Vec<EntityId>,
    battery_ids: Vec<EntityId>,
    scrap_ids: Vec<EntityId>,
    coin_ids: Vec<EntityId>,
    refuge_ids: Vec<EntityId>,
}

impl World {
    /// Builds a world from a validated blueprint.
    ///
    /// Walls requested by `walled` go down first; a placement on a
    /// perimeter cell replaces the auto-generated wall there. Placements
    /// sharing a cell stack in declaration order.
    pub fn from_blueprint(blueprint: &MapBlueprint) -> Result<Self, SetupError> {
        blueprint.validate()?;
        let mut board = GameBoard::new(blueprint.map_size);
        if blueprint.walled {
            place_boundary_walls(&mut board, blueprint)?;
        }

        // Doors are created up front so generators can reference keys
        // declared later in the placement list.
        let mut door_ids: Vec<(String, EntityId)> = Vec::new();
        for placement in &blueprint.placements {
            if let ObjectSpec::Door { key } = &placement.object {
                let id = board.insert(Entity::Door(Door { open: false }));
                door_ids.push((key.clone(), id));
            }
        }
        let resolve_door = |key: &str| -> Option<EntityId> {
            door_ids
                .iter()
                .find(|(candidate, _)| candidate == key)
                .map(|&(_, id)| id)
        };

        let mut avatar_id = None;
        let mut bot_ids: Vec<(BotKind, EntityId)> = Vec::new();
        let mut generator_ids = Vec::new();
        let mut battery_ids = Vec::new();
        let mut scrap_ids = Vec::new();
        let mut coin_ids = Vec::new();
        let mut refuge_ids = Vec::new();
        for placement in &blueprint.placements {
            let at = placement.at;
            let id = match &placement.object {
                ObjectSpec::Wall => board.insert(Entity::Wall),
                ObjectSpec::Vent => board.insert(Entity::Vent),
                ObjectSpec::Door { key } => match resolve_door(key) {
                    Some(id) => id,
                    None => return Err(SetupError::UnknownDoorKey(key.clone())),
                },
                ObjectSpec::Refuge => {
                    let id = board.insert(Entity::Refuge(Refuge {
                        position: at,
                        closed: false,
                    }));
                    refuge_ids.push(id);
                    id
                }
                ObjectSpec::Generator {
                    cost,
                    activation_bonus,
                    multiplier_bonus,
                    doors,
                } => {
                    let mut wired = Vec::with_capacity(doors.len());
                    for key in doors {
                        match resolve_door(key) {
                            Some(id) => wired.push(id),
                            None => return Err(SetupError::UnknownDoorKey(key.clone())),
                        }
                    }
                    let id = board.insert(Entity::Generator(Generator {
                        position: at,
                        cost: *cost,
                        active: false,
                        activation_bonus: *activation_bonus,
                        multiplier_bonus: *multiplier_bonus,
                        bonus_collected: false,
                        doors: wired,
                    }));
                    generator_ids.push(id);
                    id
                }
                ObjectSpec::BatterySpawner {
                    turns_to_respawn,
                    recharge_amount,
                    point_value,
                } => {
                    let id = board.insert(Entity::BatterySpawner(BatterySpawner {
                        position: at,
                        timer: RespawnTimer::new(*turns_to_respawn),
                        recharge_amount: *recharge_amount,
                        point_value: *point_value,
                    }));
                    battery_ids.push(id);
                    id
                }
                ObjectSpec::ScrapSpawner {
                    turns_to_respawn,
                    point_value,
                } => {
                    let id = board.insert(Entity::ScrapSpawner(ScrapSpawner {
                        position: at,
                        timer: RespawnTimer::new(*turns_to_respawn),
                        point_value: *point_value,
                    }));
                    scrap_ids.push(id);
                    id
                }
                ObjectSpec::CoinSpawner {
                    turns_to_respawn,
                    point_value,
                } => {
                    let id = board.insert(Entity::CoinSpawner(CoinSpawner {
                        position: at,
                        timer: RespawnTimer::new(*turns_to_respawn),
                        point_value: *point_value,
                    }));
                    coin_ids.push(id);
                    id
                }
                ObjectSpec::Avatar => {
                    let id = board.insert(Entity::Avatar(Avatar::new(at)));
                    avatar_id = Some(id);
                    id
                }
                ObjectSpec::Bot { kind } => {
                    let id = board.insert(Entity::Bot(Bot::new(*kind, at)));
                    bot_ids.push((*kind, id));
                    id
                }
            };
            if !board.place(at, id) {
                return Err(SetupError::BlockedPlacement(at));
            }
        }
        bot_ids.sort_by_key(|&(kind, _)| {
            BotKind::ALL.iter().position(|&candidate| candidate == kind)
        });

        let avatar_id = avatar_id.ok_or(SetupError::MissingAvatar)?;
        Ok(Self {
            board,
            shared: SharedState::default(),
            seed: blueprint.seed,
            avatar_id,
            bot_ids,
            generator_ids,
            battery_ids,
            scrap_ids,
            coin_ids,
            refuge_ids,
        })
    }

    /// The cell grid.
    #[must_use]
    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    /// Seed recorded for this run's random draws.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Process-wide stun and refuge counters.
    #[must_use]
    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    /// Mutable access to the shared counters.
    pub fn shared_mut(&mut self) -> &mut SharedState {
        &mut self.shared
    }

    /// The player unit.
    #[must_use]
    pub fn avatar(&self) -> &Avatar {
        match self.board.entity(self.avatar_id) {
            Entity::Avatar(avatar) => avatar,
            _ => unreachable!("avatar id resolves to an avatar"),
        }
    }

    fn avatar_mut(&mut self) -> &mut Avatar {
        match self.board.entity_mut(self.avatar_id) {
            Entity::Avatar(avatar) => avatar,
            _ => unreachable!("avatar id resolves to an avatar"),
        }
    }

    /// Bot kinds present on this board, in processing order.
    #[must_use]
    pub fn bot_kinds(&self) -> Vec<BotKind> {
        self.bot_ids.iter().map(|&(kind, _)| kind).collect()
    }

    fn bot_id(&self, kind: BotKind) -> Option<EntityId> {
        self.bot_ids
            .iter()
            .find(|&&(candidate, _)| candidate == kind)
            .map(|&(_, id)| id)
    }

    /// The bot of `kind`, if one patrols this board.
    #[must_use]
    pub fn bot(&self, kind: BotKind) -> Option<&Bot> {
        let id = self.bot_id(kind)?;
        match self.board.entity(id) {
            Entity::Bot(bot) => Some(bot),
            _ => unreachable!("bot id resolves to a bot"),
        }
    }

    fn bot_mut(&mut self, kind: BotKind) -> Option<&mut Bot> {
        let id = self.bot_id(kind)?;
        match self.board.entity_mut(id) {
            Entity::Bot(bot) => Some(bot),
            _ => unreachable!("bot id resolves to a bot"),
        }
    }

    /// Every refuge tile coordinate, in placement order.
    #[must_use]
    pub fn refuge_positions(&self) -> Vec<Vec2> {
        self.refuge_ids
            .iter()
            .filter_map(|&id| self.board.entity(id).position())
            .collect()
    }

    /// Whether the avatar's cell stack also holds an object with `tag`.
    #[must_use]
    pub fn avatar_overlaps(&self, tag: ObjectTag) -> bool {
        let at = self.avatar().position();
        self.board
            .stack(at)
            .iter()
            .any(|&id| self.board.entity(id).tag() == tag)
    }

    /// Position and multiplier bonus of every generator currently
    /// running, in blueprint declaration order.
    #[must_use]
    pub fn active_generators(&self) -> Vec<(Vec2, f64)> {
        self.generator_ids
            .iter()
            .filter_map(|&id| match self.board.entity(id) {
                Entity::Generator(generator) if generator.active => {
                    Some((generator.position, generator.multiplier_bonus))
                }
                _ => None,
            })
            .collect()
    }

    /// Sum of multiplier bonuses from generators currently running.
    #[must_use]
    pub fn active_multiplier_bonus(&self) -> f64 {
        self.active_generators()
            .into_iter()
            .map(|(_, bonus)| bonus)
            .sum()
    }

    /// Number of generators currently running.
    #[must_use]
    pub fn active_generator_count(&self) -> usize {
        self.generator_ids
            .iter()
            .filter(|&&id| match self.board.entity(id) {
                Entity::Generator(generator) => generator.is_active(),
                _ => false,
            })
            .count()
    }

    /// Whether `at` passes the navigation rules in `rules`.
    ///
    /// A cell topped by the avatar is always traversable so pursuit paths
    /// can terminate on the target.
    #[must_use]
    pub fn is_traversable(&self, at: Vec2, rules: TravelRules) -> bool {
        if !self.board.is_valid_coords(at) {
            return false;
        }
        match self.board.top(at) {
            None => true,
            Some(Entity::Avatar(_)) => true,
            Some(Entity::Wall) => rules.ignore_walls,
            Some(Entity::Vent) => rules.allow_vents,
            Some(top) => match rules.mover {
                Some(mover) => top.can_host(mover),
                None => top.is_occupiable_kind(),
            },
        }
    }

    /// Attempts to step `mover` one cell toward `direction`.
    ///
    /// Facing updates regardless of success. Returns the new position when
    /// the step happened.
    pub fn try_step(&mut self, mover: Mover, direction: Direction) -> Option<Vec2> {
        let from = match mover {
            Mover::Avatar => self.avatar().position(),
            Mover::Bot(kind) => self.bot(kind)?.position(),
        };
        let id = match mover {
            Mover::Avatar => self.avatar_id,
            Mover::Bot(kind) => self.bot_id(kind)?,
        };
        match self.board.entity_mut(id) {
            Entity::Avatar(avatar) => avatar.facing = Some(direction),
            Entity::Bot(bot) => bot.facing = Some(direction),
            _ => {}
        }
        let to = from + direction.offset();
        if !self.board.can_object_occupy(to, mover) {
            return None;
        }
        self.board.update_position(id, to);
        Some(to)
    }

    /// Moves the avatar without an occupancy check on the path taken.
    ///
    /// Used for eviction, where the destination was already vetted.
    pub fn force_move_avatar(&mut self, to: Vec2) {
        self.board.update_position(self.avatar_id, to);
    }

    /// Applies one attack's worth of damage. Returns remaining health.
    pub fn damage_avatar(&mut self) -> u32 {
        let avatar = self.avatar_mut();
        avatar.health = avatar.health.saturating_sub(ATTACK_DAMAGE);
        avatar.health
    }

    /// Removes up to `amount` power. Returns how much actually drained.
    pub fn drain_power(&mut self, amount: u32) -> u32 {
        let avatar = self.avatar_mut();
        let drained = amount.min(avatar.power);
        avatar.power -= drained;
        drained
    }

    /// Adds points to the running score. Negative deltas are allowed.
    pub fn award_points(&mut self, delta: i64) {
        self.avatar_mut().score += delta;
    }

    /// Records the line-of-sight result for the bot of `kind`.
    pub fn set_bot_visibility(&mut self, kind: BotKind, sees_player: bool) {
        if let Some(bot) = self.bot_mut(kind) {
            bot.can_see_player = sees_player;
        }
    }

    /// Applies or clears the support boost on the bot of `kind`.
    pub fn set_bot_boost(&mut self, kind: BotKind, boosted: bool) {
        if let Some(bot) = self.bot_mut(kind) {
            bot.boosted = boosted;
        }
    }

    /// Clears the per-turn attack flag on the bot of `kind`.
    pub fn clear_attack_flag(&mut self, kind: BotKind) {
        if let Some(bot) = self.bot_mut(kind) {
            bot.has_attacked = false;
        }
    }

    /// Marks the bot of `kind` as having landed a hit this turn.
    pub fn mark_bot_attacked(&mut self, kind: BotKind) {
        if let Some(bot) = self.bot_mut(kind) {
            bot.has_attacked = true;
        }
    }

    /// Advances the support bot's countdown. Returns whether it is
    /// emitting its boost after the tick, or `None` when absent.
    pub fn tick_support(&mut self) -> Option<bool> {
        let bot = self.bot_mut(BotKind::Support)?;
        let state = bot.support.as_mut()?;
        state.tick();
        Some(state.turned_on)
    }

    /// Shuts the support bot off and rearms its shorter countdown.
    pub fn turn_off_support(&mut self) {
        if let Some(bot) = self.bot_mut(BotKind::Support) {
            if let Some(state) = bot.support.as_mut() {
                state.turn_off();
            }
        }
    }

    /// Arms the full-duration stun on every bot.
    pub fn arm_stun(&mut self) {
        self.shared.stun_turns_remaining = STUN_DURATION;
    }

    /// Burns one turn off an armed stun.
    pub fn tick_stun(&mut self) {
        self.shared.stun_turns_remaining = self.shared.stun_turns_remaining.saturating_sub(1);
    }

    /// Whether the bot of `kind` acts this turn: its cadence lines up and
    /// no stun is armed.
    #[must_use]
    pub fn bot_can_act(&self, kind: BotKind, turn: u32) -> bool {
        match self.bot(kind) {
            Some(bot) => bot.cadence_ready(turn) && !self.shared.is_stunned(),
            None => false,
        }
    }

    /// Mirrors the shared refuge counters onto every refuge tile so
    /// occupancy checks stay cell-local.
    pub fn sync_refuge_closed(&mut self) {
        let closed = self.shared.refuge.is_closed();
        for index in 0..self.refuge_ids.len() {
            let id = self.refuge_ids[index];
            if let Entity::Refuge(refuge) = self.board.entity_mut(id) {
                refuge.closed = closed;
            }
        }
    }

    /// Pays for and switches on the generator topped-or-stacked at `at`.
    ///
    /// Opening doors and the one-time activation bonus happen here so a
    /// successful return means every side effect landed.
    pub fn activate_generator_at(&mut self, at: Vec2) -> Option<GeneratorActivation> {
        let id = self
            .generator_ids
            .iter()
            .copied()
            .find(|&id| self.board.entity(id).position() == Some(at))?;
        let (cost, active, bonus_collected, activation_bonus, doors) =
            match self.board.entity(id) {
                Entity::Generator(generator) => (
                    generator.cost,
                    generator.active,
                    generator.bonus_collected,
                    generator.activation_bonus,
                    generator.doors.clone(),
                ),
                _ => unreachable!("generator id resolves to a generator"),
            };
        if active {
            return Some(GeneratorActivation::AlreadyActive);
        }
        if !self.avatar_mut().inventory.take_scrap(cost) {
            return Some(GeneratorActivation::NotEnoughScrap);
        }
        let awarded = if bonus_collected { 0 } else { activation_bonus };
        self.avatar_mut().score += awarded;
        if let Entity::Generator(generator) = self.board.entity_mut(id) {
            generator.active = true;
            generator.bonus_collected = true;
        }
        for door_id in doors {
            if let Entity::Door(door) = self.board.entity_mut(door_id) {
                door.open = true;
            }
        }
        Some(GeneratorActivation::Activated(awarded))
    }

    /// Switches every running generator off. Doors stay as they are.
    ///
    /// Returns whether any generator was running.
    pub fn deactivate_generators(&mut self) -> bool {
        let mut any = false;
        for index in 0..self.generator_ids.len() {
            let id = self.generator_ids[index];
            if let Entity::Generator(generator) = self.board.entity_mut(id) {
                if generator.active {
                    generator.active = false;
                    any = true;
                }
            }
        }
        any
    }

    /// Ticks every pickup timer and grants whatever the avatar stands on.
    ///
    /// A grant only consumes the pickup when it can land in full; a full
    /// inventory leaves a scrap pickup waiting.
    pub fn run_spawners(&mut self, out_events: &mut Vec<Event>) {
        let avatar_at = self.avatar().position();
        for index in 0..self.battery_ids.len() {
            let id = self.battery_ids[index];
            let (at, recharge, points, ready) = match self.board.entity_mut(id) {
                Entity::BatterySpawner(spawner) => {
                    spawner.timer.tick();
                    (
                        spawner.position,
                        spawner.recharge_amount,
                        spawner.point_value,
                        spawner.timer.is_done(),
                    )
                }
                _ => continue,
            };
            if at != avatar_at || !ready {
                continue;
            }
            if let Entity::BatterySpawner(spawner) = self.board.entity_mut(id) {
                if !spawner.timer.try_reset() {
                    continue;
                }
            }
            let avatar = self.avatar_mut();
            avatar.power = (avatar.power + recharge).min(MAX_POWER);
            avatar.score += points;
            out_events.push(Event::ResourceCollected {
                at,
                kind: ResourceKind::Battery,
                points,
            });
        }
        for index in 0..self.scrap_ids.len() {
            let id = self.scrap_ids[index];
            let (at, points, ready) = match self.board.entity_mut(id) {
                Entity::ScrapSpawner(spawner) => {
                    spawner.timer.tick();
                    (
                        spawner.position,
                        spawner.point_value,
                        spawner.timer.is_done(),
                    )
                }
                _ => continue,
            };
            if at != avatar_at || !ready {
                continue;
            }
            if !self.avatar_mut().inventory.add_scrap(1) {
                continue;
            }
            if let Entity::ScrapSpawner(spawner) = self.board.entity_mut(id) {
                let _ = spawner.timer.try_reset();
            }
            self.avatar_mut().score += points;
            out_events.push(Event::ResourceCollected {
                at,
                kind: ResourceKind::Scrap,
                points,
            });
        }
        for index in 0..self.coin_ids.len() {
            let id = self.coin_ids[index];
            let (at, points, ready) = match self.board.entity_mut(id) {
                Entity::CoinSpawner(spawner) => {
                    spawner.timer.tick();
                    (
                        spawner.position,
                        spawner.point_value,
                        spawner.timer.is_done(),
                    )
                }
                _ => continue,
            };
            if at != avatar_at || !ready {
                continue;
            }
            if let Entity::CoinSpawner(spawner) = self.board.entity_mut(id) {
                if !spawner.timer.try_reset() {
                    continue;
                }
            }
            self.avatar_mut().score += points;
            out_events.push(Event::ResourceCollected {
                at,
                kind: ResourceKind::Coin,
                points,
            });
        }
    }
}

fn place_boundary_walls(
    board: &mut GameBoard,
    blueprint: &MapBlueprint,
) -> Result<(), SetupError> {
    let size = blueprint.map_size;
    let claimed: Vec<Vec2> = blueprint.placements.iter().map(|p| p.at).collect();
    let mut perimeter: Vec<Vec2> = Vec::new();
    for x in 0..size.x {
        perimeter.push(Vec2::new(x, 0));
        perimeter.push(Vec2::new(x, size.y - 1));
    }
    for y in 1..size.y.saturating_sub(1) {
        perimeter.push(Vec2::new(0, y));
        perimeter.push(Vec2::new(size.x - 1, y));
    }
    for at in perimeter {
        if claimed.contains(&at) {
            continue;
        }
        let id = board.insert(Entity::Wall);
        if !board.place(at, id) {
            return Err(SetupError::BlockedPlacement(at));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> MapBlueprint {
        MapBlueprint {
            seed: 11,
            map_size: Vec2::new(7, 7),
            walled: true,
            placements: vec![
                Placement {
                    at: Vec2::new(3, 3),
                    object: ObjectSpec::Avatar,
                },
                Placement {
                    at: Vec2::new(5, 5),
                    object: ObjectSpec::Bot {
                        kind: BotKind::Dumb,
                    },
                },
                Placement {
                    at: Vec2::new(1, 1),
                    object: ObjectSpec::Vent,
                },
                Placement {
                    at: Vec2::new(5, 1),
                    object: ObjectSpec::Door {
                        key: "north".to_owned(),
                    },
                },
                Placement {
                    at: Vec2::new(1, 5),
                    object: ObjectSpec::Generator {
                        cost: 2,
                        activation_bonus: 50,
                        multiplier_bonus: 0.25,
                        doors: vec!["north".to_owned()],
                    },
                },
                Placement {
                    at: Vec2::new(3, 1),
                    object: ObjectSpec::ScrapSpawner {
                        turns_to_respawn: 4,
                        point_value: 10,
                    },
                },
                Placement {
                    at: Vec2::new(1, 3),
                    object: ObjectSpec::Refuge,
                },
            ],
        }
    }

    fn world() -> World {
        World::from_blueprint(&blueprint()).expect("blueprint builds")
    }

    #[test]
    fn walled_blueprint_rings_the_perimeter() {
        let world = world();
        assert!(matches!(world.board().top(Vec2::new(0, 0)), Some(Entity::Wall)));
        assert!(matches!(world.board().top(Vec2::new(6, 3)), Some(Entity::Wall)));
        assert!(world.board().top(Vec2::new(2, 2)).is_none());
    }

    #[test]
    fn facing_updates_even_when_a_step_is_blocked() {
        let mut world = world();
        // (3, 3) -> north twice runs into the scrap spawner cell then the
        // boundary wall's neighbor; the first two steps land.
        assert_eq!(
            world.try_step(Mover::Avatar, Direction::North),
            Some(Vec2::new(3, 2))
        );
        assert_eq!(
            world.try_step(Mover::Avatar, Direction::North),
            Some(Vec2::new(3, 1))
        );
        assert_eq!(world.try_step(Mover::Avatar, Direction::North), None);
        assert_eq!(world.avatar().facing(), Some(Direction::North));
        assert_eq!(world.avatar().position(), Vec2::new(3, 1));
    }

    #[test]
    fn stepping_onto_a_stack_keeps_the_station_below() {
        let mut world = world();
        let _ = world.try_step(Mover::Avatar, Direction::North);
        let _ = world.try_step(Mover::Avatar, Direction::North);
        let stack = world.board().stack(Vec2::new(3, 1));
        assert_eq!(stack.len(), 2);
        assert!(world.avatar_overlaps(ObjectTag::ScrapSpawner));
    }

    #[test]
    fn generator_activation_charges_scrap_and_opens_doors() {
        let mut world = world();
        assert_eq!(
            world.activate_generator_at(Vec2::new(1, 5)),
            Some(GeneratorActivation::NotEnoughScrap)
        );
        assert!(world.avatar_mut().inventory.add_scrap(3));
        assert_eq!(
            world.activate_generator_at(Vec2::new(1, 5)),
            Some(GeneratorActivation::Activated(50))
        );
        assert_eq!(world.avatar().inventory().scrap(), 1);
        assert_eq!(world.avatar().score(), 50);
        assert!((world.active_multiplier_bonus() - 0.25).abs() < f64::EPSILON);
        match world.board().top(Vec2::new(5, 1)) {
            Some(Entity::Door(door)) => assert!(door.is_open()),
            other => panic!("expected a door, found {other:?}"),
        }
        // Re-activation after a shutdown pays scrap again but no bonus.
        assert!(world.deactivate_generators());
        match world.board().top(Vec2::new(5, 1)) {
            Some(Entity::Door(door)) => assert!(door.is_open()),
            other => panic!("expected a door, found {other:?}"),
        }
        assert!(world.avatar_mut().inventory.add_scrap(2));
        assert_eq!(
            world.activate_generator_at(Vec2::new(1, 5)),
            Some(GeneratorActivation::Activated(0))
        );
        assert_eq!(world.avatar().score(), 50);
    }

    #[test]
    fn spawner_grants_only_when_co_located_and_ready() {
        let mut world = world();
        let mut events = Vec::new();
        world.run_spawners(&mut events);
        assert!(events.is_empty());
        let _ = world.try_step(Mover::Avatar, Direction::North);
        let _ = world.try_step(Mover::Avatar, Direction::North);
        world.run_spawners(&mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(world.avatar().inventory().scrap(), 1);
        assert_eq!(world.avatar().score(), 10);
        // Timer just rearmed, so standing still yields nothing.
        events.clear();
        world.run_spawners(&mut events);
        assert!(events.is_empty());
        // After the full respawn interval the grant repeats.
        world.run_spawners(&mut events);
        world.run_spawners(&mut events);
        world.run_spawners(&mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(world.avatar().inventory().scrap(), 2);
    }

    #[test]
    fn stun_freezes_every_cadence() {
        let mut world = world();
        assert!(world.bot_can_act(BotKind::Dumb, 1));
        world.arm_stun();
        for turn in 1..=5 {
            assert!(!world.bot_can_act(BotKind::Dumb, turn));
            world.tick_stun();
        }
        assert!(world.bot_can_act(BotKind::Dumb, 6));
    }

    #[test]
    fn refuge_state_mirrors_onto_tiles() {
        let mut world = world();
        assert!(!world.shared().refuge.is_closed());
        world.shared_mut().refuge.occupied = false;
        world.shared_mut().refuge.turns_outside = 0;
        assert!(world.shared().refuge.is_closed());
        world.sync_refuge_closed();
        match world.board().top(Vec2::new(1, 3)) {
            Some(Entity::Refuge(refuge)) => assert!(refuge.is_closed()),
            other => panic!("expected a refuge, found {other:?}"),
        }
        assert!(!world
            .board()
            .can_object_occupy(Vec2::new(1, 3), Mover::Avatar));
    }

    #[test]
    fn world_round_trips_through_bincode() {
        let world = world();
        let bytes = bincode::serialize(&world).expect("serializes");
        let back: World = bincode::deserialize(&bytes).expect("deserializes");
        assert_eq!(world, back);
    }
}
