//! Per-kind bot movement planning.
//!
//! Planning is read-only over the world: it returns the list of step
//! directions the bot wants to take this turn and the movement pass
//! applies them one by one. Hunting kicks in whenever the vision pass
//! left `can_see_player` set; otherwise each kind falls back to its
//! patrol habit. All randomness flows through the caller's seeded RNG.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{BotKind, Direction, Vec2};
use lockdown_system_pathfinding::next_step;
use lockdown_world::{TravelRules, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Planner state that persists across turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorState {
    jumper_cooldown: u32,
}

impl Default for BehaviorState {
    fn default() -> Self {
        // The jumper starts one turn away from its first probe.
        Self { jumper_cooldown: 1 }
    }
}

impl BehaviorState {
    /// Turns until the jumper probes or pounces again.
    #[must_use]
    pub fn jumper_cooldown(&self) -> u32 {
        self.jumper_cooldown
    }
}

/// Steps the bot of `kind` wants to take this turn, in order.
///
/// The caller gates on cadence and stun before asking; planning itself
/// never checks either.
#[must_use]
pub fn plan(
    world: &World,
    kind: BotKind,
    state: &mut BehaviorState,
    rng: &mut ChaCha8Rng,
) -> Vec<Direction> {
    let Some(bot) = world.bot(kind) else {
        return Vec::new();
    };
    if kind == BotKind::Support {
        // The support bot never leaves its post.
        return Vec::new();
    }
    let hunting = bot.can_see_player();
    let delta = world.avatar().position() - bot.position();
    match kind {
        BotKind::Dumb => {
            if hunting {
                dumb_hunt(delta, rng)
            } else {
                vec![random_step(rng)]
            }
        }
        BotKind::Crawler => {
            if hunting {
                pathed_hunt(world, kind, true, bot.is_boosted())
            } else {
                Vec::new()
            }
        }
        BotKind::Hunter => {
            if hunting {
                pathed_hunt(world, kind, false, bot.is_boosted())
            } else {
                Vec::new()
            }
        }
        BotKind::Jumper => {
            if hunting {
                jumper_hunt(delta, bot.is_boosted(), state, rng)
            } else {
                jumper_patrol(rng)
            }
        }
        BotKind::Support => Vec::new(),
    }
}

fn random_step(rng: &mut ChaCha8Rng) -> Direction {
    pick(
        rng,
        &[
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ],
    )
}

fn pick(rng: &mut ChaCha8Rng, options: &[Direction]) -> Direction {
    options[rng.gen_range(0..options.len())]
}

/// Greedy single step toward the avatar, favoring the dominant axis.
/// Ties go to the horizontal axis.
fn dumb_hunt(delta: Vec2, rng: &mut ChaCha8Rng) -> Vec<Direction> {
    let step = match (delta.x, delta.y) {
        (x, 0) if x > 0 => Direction::East,
        (x, 0) if x < 0 => Direction::West,
        (0, y) if y > 0 => Direction::South,
        (0, y) if y < 0 => Direction::North,
        (x, y) if x > 0 && y > 0 => {
            if y > x {
                Direction::South
            } else {
                Direction::East
            }
        }
        (x, y) if x < 0 && y < 0 => {
            if y < x {
                Direction::North
            } else {
                Direction::West
            }
        }
        (x, y) if x > 0 && y < 0 => {
            if -y > x {
                Direction::North
            } else {
                Direction::East
            }
        }
        (x, y) if x < 0 && y > 0 => {
            if y > -x {
                Direction::South
            } else {
                Direction::West
            }
        }
        _ => return vec![random_step(rng)],
    };
    vec![step]
}

/// One A* step toward the avatar, doubled while boosted.
fn pathed_hunt(world: &World, kind: BotKind, allow_vents: bool, boosted: bool) -> Vec<Direction> {
    let from = match world.bot(kind) {
        Some(bot) => bot.position(),
        None => return Vec::new(),
    };
    let goal = world.avatar().position();
    let rules = TravelRules {
        mover: None,
        allow_vents,
        ignore_walls: false,
    };
    let Some(step) = next_step(from, goal, |at| world.is_traversable(at, rules), |_| 0) else {
        warn!(?kind, %from, %goal, "no path to the avatar");
        return Vec::new();
    };
    let Some(direction) = Direction::from_offset(step - from) else {
        return Vec::new();
    };
    if boosted {
        vec![direction, direction]
    } else {
        vec![direction]
    }
}

fn jumper_patrol(rng: &mut ChaCha8Rng) -> Vec<Direction> {
    let vertical = pick(rng, &[Direction::North, Direction::South]);
    let horizontal = pick(rng, &[Direction::East, Direction::West]);
    vec![vertical, horizontal]
}

/// Probe or pounce toward the avatar.
///
/// Unboosted, the jumper sits out its cooldown entirely, then probes
/// every cadence turn. Boosted, cooldown turns still probe and the
/// cooldown expiring triggers a double-length pounce before rearming
/// to a random 1 to 3 turns.
fn jumper_hunt(
    delta: Vec2,
    boosted: bool,
    state: &mut BehaviorState,
    rng: &mut ChaCha8Rng,
) -> Vec<Direction> {
    if boosted {
        if state.jumper_cooldown != 0 {
            state.jumper_cooldown -= 1;
            if let Some(steps) = probe_steps(delta, rng) {
                return steps;
            }
        } else {
            state.jumper_cooldown = rng.gen_range(1..=3);
            if let Some(steps) = pounce_steps(delta) {
                return steps;
            }
        }
    } else {
        if state.jumper_cooldown != 0 {
            state.jumper_cooldown -= 1;
            return Vec::new();
        }
        if let Some(steps) = probe_steps(delta, rng) {
            return steps;
        }
    }
    jumper_patrol(rng)
}

/// Two-step advance: a sidestep paired with a step toward the avatar,
/// or the full diagonal when off-axis. `None` on a zero delta.
fn probe_steps(delta: Vec2, rng: &mut ChaCha8Rng) -> Option<Vec<Direction>> {
    let steps = match (delta.x, delta.y) {
        (x, 0) if x > 0 => vec![
            pick(rng, &[Direction::North, Direction::South]),
            Direction::East,
        ],
        (x, 0) if x < 0 => vec![
            pick(rng, &[Direction::North, Direction::South]),
            Direction::West,
        ],
        (0, y) if y > 0 => vec![
            Direction::South,
            pick(rng, &[Direction::West, Direction::East]),
        ],
        (0, y) if y < 0 => vec![
            Direction::North,
            pick(rng, &[Direction::West, Direction::East]),
        ],
        (x, y) if x > 0 && y > 0 => vec![Direction::South, Direction::East],
        (x, y) if x < 0 && y < 0 => vec![Direction::North, Direction::West],
        (x, y) if x > 0 && y < 0 => vec![Direction::North, Direction::East],
        (x, y) if x < 0 && y > 0 => vec![Direction::South, Direction::West],
        _ => return None,
    };
    Some(steps)
}

/// Double-speed lunge straight at the avatar. `None` on a zero delta.
fn pounce_steps(delta: Vec2) -> Option<Vec<Direction>> {
    let steps = match (delta.x, delta.y) {
        (x, 0) if x > 0 => vec![Direction::East; 2],
        (x, 0) if x < 0 => vec![Direction::West; 2],
        (0, y) if y > 0 => vec![Direction::South; 2],
        (0, y) if y < 0 => vec![Direction::North; 2],
        (x, y) if x > 0 && y > 0 => vec![
            Direction::South,
            Direction::East,
            Direction::South,
            Direction::East,
        ],
        (x, y) if x < 0 && y < 0 => vec![
            Direction::North,
            Direction::West,
            Direction::North,
            Direction::West,
        ],
        (x, y) if x > 0 && y < 0 => vec![
            Direction::North,
            Direction::East,
            Direction::North,
            Direction::East,
        ],
        (x, y) if x < 0 && y > 0 => vec![
            Direction::South,
            Direction::West,
            Direction::South,
            Direction::West,
        ],
        _ => return None,
    };
    Some(steps)
}
