//! Applies planned steps to the board.
//!
//! Movement is the only pass that relocates units. Every step is
//! re-validated against the destination cell at apply time, so a plan
//! that looked fine when it was made simply loses the steps that became
//! illegal. Facing updates on every attempt, landed or not.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{BotKind, Direction, Event, Mover};
use lockdown_world::World;

/// Attempts one avatar step, emitting [`Event::AvatarMoved`] on success.
pub fn move_avatar(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) {
    let from = world.avatar().position();
    if let Some(to) = world.try_step(Mover::Avatar, direction) {
        out_events.push(Event::AvatarMoved { from, to });
    }
}

/// Applies a bot's planned steps in order, emitting [`Event::BotMoved`]
/// for each step that lands.
pub fn move_bot(
    world: &mut World,
    kind: BotKind,
    steps: &[Direction],
    out_events: &mut Vec<Event>,
) {
    for &direction in steps {
        let from = match world.bot(kind) {
            Some(bot) => bot.position(),
            None => return,
        };
        if let Some(to) = world.try_step(Mover::Bot(kind), direction) {
            out_events.push(Event::BotMoved { bot: kind, from, to });
        }
    }
}
