#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lockdown engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the pure turn-phase systems, and the adapters: grid coordinates and their
//! geometry helpers, the closed [`Action`] surface strategies submit, the
//! [`Event`] values phase processors broadcast, and the stable tags used to
//! identify everything placeable on the board.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Integer 2D grid coordinate used for every position in the simulation.
///
/// `y` grows southward, matching the board layout: `(0, 0)` is the
/// north-west corner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Vec2 {
    /// Column component.
    pub x: i32,
    /// Row component.
    pub y: i32,
}

impl Vec2 {
    /// Origin coordinate `(0, 0)`.
    pub const ZERO: Vec2 = Vec2::new(0, 0);

    /// Creates a coordinate from explicit components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: Vec2) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Squared Euclidean magnitude, useful for distance comparisons.
    #[must_use]
    pub const fn magnitude_squared(self) -> i64 {
        let x = self.x as i64;
        let y = self.y as i64;
        x * x + y * y
    }

    /// Reports whether both components are nonzero.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }

    /// Clamps both components into `[min, max]`.
    #[must_use]
    pub fn clamped(self, min: i32, max: i32) -> Vec2 {
        Vec2::new(self.x.clamp(min, max), self.y.clamp(min, max))
    }

    /// Unit-ish step from `self` toward `other`: each axis clamped to
    /// `{-1, 0, 1}`.
    #[must_use]
    pub fn direction_to(self, other: Vec2) -> Vec2 {
        (other - self).clamped(-1, 1)
    }

    /// Enumerates every grid cell overlapped by the segment joining the
    /// centres of `start` and `end`, start cell first.
    ///
    /// This is the supercover crawl used for line-of-sight checks: when the
    /// segment crosses a cell corner exactly, both axes advance at once and
    /// the two corner-adjacent cells are skipped.
    #[must_use]
    pub fn line_overlap(start: Vec2, end: Vec2) -> Vec<Vec2> {
        let cx1 = f64::from(start.x) + 0.5;
        let cy1 = f64::from(start.y) + 0.5;
        let cx2 = f64::from(end.x) + 0.5;
        let cy2 = f64::from(end.y) + 0.5;

        let xdir: i32 = if cx2 > cx1 { 1 } else { -1 };
        let mut xcurrent = start.x;
        let mut xnext = if cx2 > cx1 {
            f64::from(xcurrent + 1)
        } else {
            f64::from(xcurrent)
        };
        let mut xprogress = crawl_progress(cx1, cx2, xnext);

        let ydir: i32 = if cy2 > cy1 { 1 } else { -1 };
        let mut ycurrent = start.y;
        let mut ynext = if cy2 > cy1 {
            f64::from(ycurrent + 1)
        } else {
            f64::from(ycurrent)
        };
        let mut yprogress = crawl_progress(cy1, cy2, ynext);

        let mut overlapped = Vec::new();
        if xprogress != 0.0 && yprogress != 0.0 {
            overlapped.push(Vec2::new(xcurrent, ycurrent));
        }

        while xprogress < 1.0 || yprogress < 1.0 {
            let step_x = xprogress <= yprogress;
            let step_y = yprogress <= xprogress;

            if step_x {
                xcurrent += xdir;
                xnext += f64::from(xdir);
                xprogress = crawl_progress(cx1, cx2, xnext);
            }
            if step_y {
                ycurrent += ydir;
                ynext += f64::from(ydir);
                yprogress = crawl_progress(cy1, cy2, ynext);
            }

            overlapped.push(Vec2::new(xcurrent, ycurrent));
        }

        overlapped
    }
}

/// Fractional progress of `value` along the span from `a` to `b`, saturating
/// at 1 once past `b`. A degenerate span reports full progress immediately.
fn crawl_progress(a: f64, b: f64, value: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    ((value - a) / (b - a)).abs()
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: i32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions available to the avatar and to bots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in north, east, south, west order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Grid offset produced by a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> Vec2 {
        match self {
            Direction::North => Vec2::new(0, -1),
            Direction::East => Vec2::new(1, 0),
            Direction::South => Vec2::new(0, 1),
            Direction::West => Vec2::new(-1, 0),
        }
    }

    /// Recovers a direction from a unit offset, if the offset is cardinal.
    #[must_use]
    pub fn from_offset(offset: Vec2) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.offset() == offset)
    }

    /// Presentation name recorded as an actor's facing.
    #[must_use]
    pub const fn facing_name(self) -> &'static str {
        match self {
            Direction::North => "up",
            Direction::East => "right",
            Direction::South => "down",
            Direction::West => "left",
        }
    }
}

/// Tile targeted by an explicit interact action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractTarget {
    /// The tile the avatar currently stands on.
    Here,
    /// The tile adjacent to the avatar in the given direction.
    Toward(Direction),
}

impl InteractTarget {
    /// Offset from the avatar's position to the targeted tile.
    #[must_use]
    pub const fn offset(self) -> Vec2 {
        match self {
            InteractTarget::Here => Vec2::ZERO,
            InteractTarget::Toward(direction) => direction.offset(),
        }
    }
}

/// Closed set of actions a strategy may submit each turn.
///
/// Up to two actions are consumed per turn; anything beyond that, and any
/// action the rules reject, is silently ignored. The avatar cannot currently
/// harm bots, so the engine drops `Attack`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Do nothing this slot.
    Idle,
    /// Step one tile in the given direction.
    Move(Direction),
    /// Interact with a station on the targeted tile.
    Interact(InteractTarget),
    /// Attack in the given direction.
    Attack(Direction),
}

/// The five autonomous bot variants.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BotKind {
    /// Reactive chaser: random patrol, greedy obstacle-blind pursuit.
    Dumb,
    /// Pathfinding pursuer that travels through vents.
    Crawler,
    /// Pathfinding pursuer that vents block.
    Hunter,
    /// Diagonal-biased ambusher alternating probe and pounce phases.
    Jumper,
    /// Stationary booster cycling the shared boost state.
    Support,
}

impl BotKind {
    /// All bot kinds in their deterministic processing order.
    pub const ALL: [BotKind; 5] = [
        BotKind::Dumb,
        BotKind::Crawler,
        BotKind::Hunter,
        BotKind::Jumper,
        BotKind::Support,
    ];
}

/// Capability-dispatch key answering "who is trying to stand here?".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mover {
    /// The player-controlled avatar.
    Avatar,
    /// A bot of the given kind.
    Bot(BotKind),
}

/// Stable `object_type` tag carried by everything placeable on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectTag {
    /// Impassable barrier tile.
    Wall,
    /// Crawlspace passable only by the avatar and the crawler bot.
    Vent,
    /// Generator-controlled barrier tile.
    Door,
    /// Shared safe-zone tile.
    Refuge,
    /// Scrap-fed station that opens doors and boosts scoring.
    Generator,
    /// Tile that periodically offers a power recharge.
    BatterySpawner,
    /// Tile that periodically offers generator fuel.
    ScrapSpawner,
    /// Tile that periodically offers bonus points.
    CoinSpawner,
    /// The player-controlled avatar.
    Avatar,
    /// An autonomous bot.
    Bot(BotKind),
}

/// Resource granted by an implicit spawner pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Power recharge from a battery spawner.
    Battery,
    /// Generator fuel from a scrap spawner.
    Scrap,
    /// Bonus points from a coin spawner.
    Coin,
}

/// Reason a run reached a terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// The avatar's health reached zero.
    AvatarDestroyed,
    /// The avatar's power reached zero.
    PowerDepleted,
    /// The configured maximum tick count elapsed.
    TickLimit,
}

/// Events broadcast by phase processors while resolving a tick.
///
/// Consumed by the orchestrator for tracing and terminal-state detection;
/// policy rejections deliberately stay silent and produce no event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// The avatar completed a step.
    AvatarMoved {
        /// Tile occupied before the step.
        from: Vec2,
        /// Tile occupied after the step.
        to: Vec2,
    },
    /// A bot completed a step.
    BotMoved {
        /// Bot that moved.
        bot: BotKind,
        /// Tile occupied before the step.
        from: Vec2,
        /// Tile occupied after the step.
        to: Vec2,
    },
    /// A bot landed an attack on the avatar.
    BotAttacked {
        /// Bot that attacked.
        bot: BotKind,
        /// Tile the avatar was struck on.
        target: Vec2,
    },
    /// The shared stun countdown was armed.
    StunArmed {
        /// Number of turns all bots stay inert.
        turns: u32,
    },
    /// A generator came online.
    GeneratorActivated {
        /// Tile hosting the generator.
        at: Vec2,
    },
    /// Every generator was forced offline.
    GeneratorsDisabled,
    /// A spawner granted its resource to the avatar.
    ResourceCollected {
        /// Resource granted.
        kind: ResourceKind,
        /// Tile the pickup happened on.
        at: Vec2,
        /// Points granted alongside the resource.
        points: i64,
    },
    /// The avatar entered the refuge.
    RefugeEntered,
    /// The avatar left the refuge.
    RefugeExited,
    /// The avatar was forcibly evicted from the refuge.
    AvatarEvicted {
        /// Tile the avatar was pushed to.
        to: Vec2,
    },
    /// Power drained from the avatar.
    PowerDrained {
        /// Units of power removed.
        amount: u32,
    },
    /// Points were awarded for the turn.
    PointsAwarded {
        /// Final rounded award.
        amount: i64,
    },
    /// The run reached a terminal state.
    GameEnded {
        /// Why the run ended.
        outcome: GameOutcome,
    },
}
