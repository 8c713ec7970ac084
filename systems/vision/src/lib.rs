//! Per-turn line-of-sight refresh for every bot.
//!
//! A bot sees the avatar when it sits inside the bot's square vision gate
//! and no opaque cell interrupts the supercover line between them. Walls
//! are always opaque; stations and terrain are opaque to a bot that could
//! not stand on them, so a crawler keeps sight through vents other bots
//! cannot peer into, and an avatar crouched in a vent is hidden from
//! everything but the crawler. Units never block sight, and an occupied
//! refuge suppresses every sighting outright.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{BotKind, Mover, Vec2};
use lockdown_world::{Entity, World};

/// Recomputes `can_see_player` for every bot on the board.
pub fn refresh(world: &mut World) {
    let avatar_at = world.avatar().position();
    let hidden = world.shared().refuge.occupied;
    for kind in world.bot_kinds() {
        let seen = match world.bot(kind) {
            Some(bot) => {
                !hidden
                    && bot.in_vision_radius(avatar_at)
                    && line_of_sight(world, kind, bot.position(), avatar_at)
            }
            None => false,
        };
        world.set_bot_visibility(kind, seen);
    }
}

/// Whether the bot of `kind` has an unbroken line from `from` to `to`.
///
/// Endpoint cells count too, so terrain underneath either end can break
/// the line. Units never block, so neither end ever blocks itself.
#[must_use]
pub fn line_of_sight(world: &World, kind: BotKind, from: Vec2, to: Vec2) -> bool {
    Vec2::line_overlap(from, to)
        .iter()
        .all(|&cell| !blocks_sight(world, kind, cell))
}

fn blocks_sight(world: &World, kind: BotKind, cell: Vec2) -> bool {
    world.board().stack(cell).iter().any(|&id| {
        match world.board().entity(id) {
            Entity::Avatar(_) | Entity::Bot(_) => false,
            Entity::Wall => true,
            other => !other.can_host(Mover::Bot(kind)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown_world::{MapBlueprint, ObjectSpec, Placement};

    fn world_with(placements: Vec<Placement>) -> World {
        World::from_blueprint(&MapBlueprint {
            seed: 1,
            map_size: Vec2::new(12, 12),
            walled: false,
            placements,
        })
        .expect("blueprint builds")
    }

    fn at(x: i32, y: i32, object: ObjectSpec) -> Placement {
        Placement {
            at: Vec2::new(x, y),
            object,
        }
    }

    #[test]
    fn close_range_sighting_sets_the_flag() {
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Avatar),
            at(4, 2, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        refresh(&mut world);
        assert!(world.bot(BotKind::Dumb).unwrap().can_see_player());
    }

    #[test]
    fn vision_gate_is_a_square() {
        // A corner diagonal is in range, one column further out is not.
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Avatar),
            at(5, 2, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        refresh(&mut world);
        assert!(!world.bot(BotKind::Dumb).unwrap().can_see_player());
        world.set_bot_boost(BotKind::Dumb, true);
        refresh(&mut world);
        assert!(world.bot(BotKind::Dumb).unwrap().can_see_player());
    }

    #[test]
    fn occupied_refuge_suppresses_every_sighting() {
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Avatar),
            at(3, 2, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        world.shared_mut().refuge.occupied = true;
        refresh(&mut world);
        assert!(!world.bot(BotKind::Dumb).unwrap().can_see_player());
    }

    #[test]
    fn walls_break_the_line() {
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Avatar),
            at(3, 2, ObjectSpec::Wall),
            at(4, 2, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        refresh(&mut world);
        assert!(!world.bot(BotKind::Dumb).unwrap().can_see_player());
    }

    #[test]
    fn vents_hide_the_avatar_from_all_but_the_crawler() {
        let placements = |kind| {
            vec![
                at(2, 2, ObjectSpec::Avatar),
                at(4, 2, ObjectSpec::Vent),
                at(6, 2, ObjectSpec::Bot { kind }),
            ]
        };
        let mut hunter_world = world_with(placements(BotKind::Hunter));
        refresh(&mut hunter_world);
        assert!(!hunter_world.bot(BotKind::Hunter).unwrap().can_see_player());

        let mut crawler_world = world_with(placements(BotKind::Crawler));
        refresh(&mut crawler_world);
        assert!(crawler_world.bot(BotKind::Crawler).unwrap().can_see_player());
    }

    #[test]
    fn a_vent_conceals_the_avatar_crouched_inside_it() {
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Vent),
            at(2, 2, ObjectSpec::Avatar),
            at(1, 1, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        refresh(&mut world);
        assert!(!world.bot(BotKind::Dumb).unwrap().can_see_player());
    }

    #[test]
    fn the_crawler_spots_an_avatar_crouched_in_a_vent() {
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Vent),
            at(2, 2, ObjectSpec::Avatar),
            at(1, 1, ObjectSpec::Bot {
                kind: BotKind::Crawler,
            }),
        ]);
        refresh(&mut world);
        assert!(world.bot(BotKind::Crawler).unwrap().can_see_player());
    }

    #[test]
    fn another_bot_does_not_block_sight() {
        let mut world = world_with(vec![
            at(2, 2, ObjectSpec::Avatar),
            at(4, 2, ObjectSpec::Bot { kind: BotKind::Dumb }),
            at(6, 2, ObjectSpec::Bot {
                kind: BotKind::Hunter,
            }),
        ]);
        refresh(&mut world);
        assert!(world.bot(BotKind::Hunter).unwrap().can_see_player());
    }
}
