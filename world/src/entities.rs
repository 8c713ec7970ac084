//! Concrete objects that occupy board cells.
//!
//! Every entity lives in the board arena and is addressed by
//! [`EntityId`](crate::board::EntityId). The [`Entity`] enum is closed on
//! purpose: capability questions such as "can a crawler stand here" are
//! answered by matching on the variant rather than by downcasting.

use lockdown_core::{BotKind, Direction, Mover, ObjectTag, Vec2};
use serde::{Deserialize, Serialize};

use crate::board::EntityId;

/// Turns an armed stun lasts once a bot lands a hit.
pub const STUN_DURATION: u32 = 5;
/// Upper bound on avatar power.
pub const MAX_POWER: u32 = 100;
/// Health removed from the avatar by a single bot attack.
pub const ATTACK_DAMAGE: u32 = 1;
/// Health the avatar starts a run with.
pub const DEFAULT_HEALTH: u32 = 3;
/// Scrap units the avatar can carry at once.
pub const INVENTORY_CAPACITY: u32 = 10;
/// Turns the support bot waits before switching itself on at run start.
pub const SUPPORT_INITIAL_COUNTDOWN: u32 = 250;
/// Countdown the support bot rearms with after any successful attack.
pub const SUPPORT_REARM_COUNTDOWN: u32 = 50;

/// Countdown that gates respawning pickups and similar periodic effects.
///
/// A fresh timer is already expired, so the first interaction succeeds
/// without waiting a full cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespawnTimer {
    duration: u32,
    remaining: u32,
}

impl RespawnTimer {
    /// Creates an expired timer that rearms to `duration` turns.
    #[must_use]
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: 0,
        }
    }

    /// Whether the countdown has run out.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Advances the countdown by one turn.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Rearms the timer, but only from the expired state.
    ///
    /// Returns whether the reset happened.
    pub fn try_reset(&mut self) -> bool {
        if self.is_done() {
            self.remaining = self.duration;
            true
        } else {
            false
        }
    }
}

/// Bounded scrap storage carried by the avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    scrap: u32,
    capacity: u32,
}

impl Inventory {
    #[must_use]
    pub(crate) fn new(capacity: u32) -> Self {
        Self { scrap: 0, capacity }
    }

    /// Scrap units currently held.
    #[must_use]
    pub fn scrap(&self) -> u32 {
        self.scrap
    }

    /// Adds scrap, refusing the whole amount if it would exceed capacity.
    pub fn add_scrap(&mut self, amount: u32) -> bool {
        if self.scrap + amount > self.capacity {
            return false;
        }
        self.scrap += amount;
        true
    }

    /// Removes scrap, refusing if less than `amount` is held.
    pub fn take_scrap(&mut self, amount: u32) -> bool {
        if self.scrap < amount {
            return false;
        }
        self.scrap -= amount;
        true
    }
}

/// The player-controlled unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub(crate) position: Vec2,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) power: u32,
    pub(crate) score: i64,
    pub(crate) inventory: Inventory,
    pub(crate) facing: Option<Direction>,
}

impl Avatar {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            health: DEFAULT_HEALTH,
            max_health: DEFAULT_HEALTH,
            power: MAX_POWER,
            score: 0,
            inventory: Inventory::new(INVENTORY_CAPACITY),
            facing: None,
        }
    }

    /// Current board cell.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Remaining power in the 0 to [`MAX_POWER`] band.
    #[must_use]
    pub fn power(&self) -> u32 {
        self.power
    }

    /// Points accumulated so far. May be negative.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Scrap storage.
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Direction of the most recent move attempt, successful or not.
    #[must_use]
    pub fn facing(&self) -> Option<Direction> {
        self.facing
    }

    /// Whether health or power has run out.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.health == 0 || self.power == 0
    }
}

/// Extra state carried only by the support bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportState {
    pub(crate) turned_on: bool,
    pub(crate) countdown: u32,
}

impl SupportState {
    /// Whether the support bot is currently emitting its boost.
    #[must_use]
    pub fn is_turned_on(&self) -> bool {
        self.turned_on
    }

    /// Advances the countdown, switching the bot on when it runs out.
    pub(crate) fn tick(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.turned_on = true;
        }
    }

    /// Shuts the bot off and rearms the shorter post-attack countdown.
    pub(crate) fn turn_off(&mut self) {
        self.turned_on = false;
        self.countdown = SUPPORT_REARM_COUNTDOWN;
    }
}

/// A hostile unit patrolling the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub(crate) kind: BotKind,
    pub(crate) position: Vec2,
    pub(crate) vision_radius: u32,
    pub(crate) boosted_vision_radius: u32,
    pub(crate) turn_delay: u32,
    pub(crate) boosted: bool,
    pub(crate) can_see_player: bool,
    pub(crate) has_attacked: bool,
    pub(crate) facing: Option<Direction>,
    pub(crate) support: Option<SupportState>,
}

impl Bot {
    pub(crate) fn new(kind: BotKind, position: Vec2) -> Self {
        let (vision_radius, boosted_vision_radius, turn_delay) = match kind {
            BotKind::Dumb => (2, 4, 1),
            BotKind::Crawler => (30, 40, 4),
            BotKind::Hunter => (30, 40, 2),
            BotKind::Jumper => (4, 6, 3),
            BotKind::Support => (1, 2, 1),
        };
        let support = match kind {
            BotKind::Support => Some(SupportState {
                turned_on: false,
                countdown: SUPPORT_INITIAL_COUNTDOWN,
            }),
            _ => None,
        };
        Self {
            kind,
            position,
            vision_radius,
            boosted_vision_radius,
            turn_delay,
            boosted: false,
            can_see_player: false,
            has_attacked: false,
            facing: None,
            support,
        }
    }

    /// Which behavior family this bot belongs to.
    #[must_use]
    pub fn kind(&self) -> BotKind {
        self.kind
    }

    /// Current board cell.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the support boost is widening this bot's senses.
    #[must_use]
    pub fn is_boosted(&self) -> bool {
        self.boosted
    }

    /// Vision radius in effect right now.
    #[must_use]
    pub fn current_vision_radius(&self) -> u32 {
        if self.boosted {
            self.boosted_vision_radius
        } else {
            self.vision_radius
        }
    }

    /// Whether `target` falls inside the current vision square.
    ///
    /// The gate is a box of the current radius centered on the bot, so a
    /// diagonal at the corner counts as in range.
    #[must_use]
    pub fn in_vision_radius(&self, target: Vec2) -> bool {
        let delta = target - self.position;
        let radius = self.current_vision_radius() as i32;
        delta.x.abs() <= radius && delta.y.abs() <= radius
    }

    /// Result of the most recent line-of-sight pass.
    #[must_use]
    pub fn can_see_player(&self) -> bool {
        self.can_see_player
    }

    /// Whether this bot landed a hit during the current turn.
    #[must_use]
    pub fn has_attacked(&self) -> bool {
        self.has_attacked
    }

    /// Direction of the most recent move attempt.
    #[must_use]
    pub fn facing(&self) -> Option<Direction> {
        self.facing
    }

    /// Support-only state, `None` for every other kind.
    #[must_use]
    pub fn support(&self) -> Option<&SupportState> {
        self.support.as_ref()
    }

    /// Whether this bot's turn cadence lines up with `turn`.
    ///
    /// Turn numbers start at 1. A delay of 1 moves every turn, a delay of
    /// 4 moves on turns 1, 5, 9 and so on.
    #[must_use]
    pub fn cadence_ready(&self, turn: u32) -> bool {
        (turn.saturating_sub(1)) % self.turn_delay == 0
    }
}

/// A toggleable passage tied to one or more generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub(crate) open: bool,
}

impl Door {
    /// Whether the avatar may pass through.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// The single safe-room tile type.
///
/// `closed` mirrors the process-wide refuge counters and is refreshed by
/// the refuge pass each turn so occupancy checks stay cell-local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refuge {
    pub(crate) position: Vec2,
    pub(crate) closed: bool,
}

impl Refuge {
    /// Whether entry is currently refused.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A station that opens doors when the avatar pays its scrap cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    pub(crate) position: Vec2,
    pub(crate) cost: u32,
    pub(crate) active: bool,
    pub(crate) activation_bonus: i64,
    pub(crate) multiplier_bonus: f64,
    pub(crate) bonus_collected: bool,
    pub(crate) doors: Vec<EntityId>,
}

impl Generator {
    /// Scrap units one activation consumes.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Whether the generator is currently running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Score multiplier applied while this generator runs.
    #[must_use]
    pub fn multiplier_bonus(&self) -> f64 {
        self.multiplier_bonus
    }
}

/// A pickup spot that recharges power and awards points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterySpawner {
    pub(crate) position: Vec2,
    pub(crate) timer: RespawnTimer,
    pub(crate) recharge_amount: u32,
    pub(crate) point_value: i64,
}

/// A pickup spot that yields one scrap unit plus points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapSpawner {
    pub(crate) position: Vec2,
    pub(crate) timer: RespawnTimer,
    pub(crate) point_value: i64,
}

/// A pickup spot that only awards points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSpawner {
    pub(crate) position: Vec2,
    pub(crate) timer: RespawnTimer,
    pub(crate) point_value: i64,
}

/// Anything that can sit in a board cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// Impassable terrain.
    Wall,
    /// A crawl space only vent-capable movers may enter.
    Vent,
    /// A generator-controlled passage.
    Door(Door),
    /// A safe-room tile.
    Refuge(Refuge),
    /// A door-opening station.
    Generator(Generator),
    /// A power pickup spot.
    BatterySpawner(BatterySpawner),
    /// A scrap pickup spot.
    ScrapSpawner(ScrapSpawner),
    /// A points pickup spot.
    CoinSpawner(CoinSpawner),
    /// The player-controlled unit.
    Avatar(Avatar),
    /// A hostile unit.
    Bot(Bot),
}

impl Entity {
    /// Stable tag used for lookups and serialization.
    #[must_use]
    pub fn tag(&self) -> ObjectTag {
        match self {
            Entity::Wall => ObjectTag::Wall,
            Entity::Vent => ObjectTag::Vent,
            Entity::Door(_) => ObjectTag::Door,
            Entity::Refuge(_) => ObjectTag::Refuge,
            Entity::Generator(_) => ObjectTag::Generator,
            Entity::BatterySpawner(_) => ObjectTag::BatterySpawner,
            Entity::ScrapSpawner(_) => ObjectTag::ScrapSpawner,
            Entity::CoinSpawner(_) => ObjectTag::CoinSpawner,
            Entity::Avatar(_) => ObjectTag::Avatar,
            Entity::Bot(bot) => ObjectTag::Bot(bot.kind),
        }
    }

    /// Whether this kind of object can ever be stood on.
    ///
    /// Per-mover refinements such as vent access or closed doors live in
    /// [`can_host`](Self::can_host); this is the kind-level answer.
    #[must_use]
    pub fn is_occupiable_kind(&self) -> bool {
        !matches!(self, Entity::Wall | Entity::Avatar(_) | Entity::Bot(_))
    }

    /// Whether `mover` may stand on top of this object right now.
    #[must_use]
    pub fn can_host(&self, mover: Mover) -> bool {
        match self {
            Entity::Wall | Entity::Avatar(_) | Entity::Bot(_) => false,
            Entity::Vent => matches!(mover, Mover::Avatar | Mover::Bot(BotKind::Crawler)),
            Entity::Door(door) => match mover {
                Mover::Avatar => door.open,
                Mover::Bot(_) => false,
            },
            Entity::Refuge(refuge) => match mover {
                Mover::Avatar => !refuge.closed,
                Mover::Bot(_) => false,
            },
            Entity::Generator(_)
            | Entity::BatterySpawner(_)
            | Entity::ScrapSpawner(_)
            | Entity::CoinSpawner(_) => true,
        }
    }

    /// Board cell for entities that track one.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Entity::Wall | Entity::Vent | Entity::Door(_) => None,
            Entity::Refuge(refuge) => Some(refuge.position),
            Entity::Generator(generator) => Some(generator.position),
            Entity::BatterySpawner(spawner) => Some(spawner.position),
            Entity::ScrapSpawner(spawner) => Some(spawner.position),
            Entity::CoinSpawner(spawner) => Some(spawner.position),
            Entity::Avatar(avatar) => Some(avatar.position),
            Entity::Bot(bot) => Some(bot.position),
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        match self {
            Entity::Wall | Entity::Vent | Entity::Door(_) => {}
            Entity::Refuge(refuge) => refuge.position = position,
            Entity::Generator(generator) => generator.position = position,
            Entity::BatterySpawner(spawner) => spawner.position = position,
            Entity::ScrapSpawner(spawner) => spawner.position = position,
            Entity::CoinSpawner(spawner) => spawner.position = position,
            Entity::Avatar(avatar) => avatar.position = position,
            Entity::Bot(bot) => bot.position = position,
        }
    }
}
