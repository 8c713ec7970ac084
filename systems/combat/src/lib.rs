//! Bot attack resolution.
//!
//! Every bot takes one attack attempt per turn, after its movement. The
//! aim is the clamped delta toward the avatar, so only an adjacent avatar
//! (eight-way) can actually be struck. A landed hit damages the avatar,
//! arms the shared stun, forces every generator offline, and shuts the
//! support bot down.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{BotKind, Event, ObjectTag, Vec2};
use lockdown_world::{World, STUN_DURATION};

/// Runs the attack attempt for the bot of `kind`.
///
/// Clears the bot's per-turn attack flag first, then re-checks the attack
/// gate: the bot must see the avatar and no stun may be armed.
pub fn resolve(world: &mut World, kind: BotKind, out_events: &mut Vec<Event>) {
    world.clear_attack_flag(kind);
    let Some(bot) = world.bot(kind) else {
        return;
    };
    if !bot.can_see_player() || world.shared().is_stunned() {
        return;
    }
    let bot_at = bot.position();
    let boosted = bot.is_boosted();
    let aim = (world.avatar().position() - bot_at).clamped(-1, 1);
    if aim == Vec2::ZERO {
        return;
    }
    let mut directions = vec![aim];
    if kind == BotKind::Jumper && boosted && aim.x != 0 && aim.y != 0 {
        // A boosted jumper swings wide: the diagonal plus both of its
        // orthogonal components.
        directions.push(Vec2::new(aim.x, 0));
        directions.push(Vec2::new(0, aim.y));
    }
    for direction in directions {
        let target = bot_at + direction;
        let avatar_there = world
            .board()
            .stack(target)
            .iter()
            .any(|&id| world.board().entity(id).tag() == ObjectTag::Avatar);
        if !avatar_there {
            continue;
        }
        let _ = world.damage_avatar();
        world.arm_stun();
        let disabled = world.deactivate_generators();
        world.turn_off_support();
        world.mark_bot_attacked(kind);
        out_events.push(Event::BotAttacked { bot: kind, target });
        out_events.push(Event::StunArmed {
            turns: STUN_DURATION,
        });
        if disabled {
            out_events.push(Event::GeneratorsDisabled);
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown_core::Mover;
    use lockdown_world::{MapBlueprint, ObjectSpec, Placement, DEFAULT_HEALTH};

    fn world_with(placements: Vec<Placement>) -> World {
        World::from_blueprint(&MapBlueprint {
            seed: 9,
            map_size: Vec2::new(10, 10),
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

    fn sighted(world: &mut World, kind: BotKind) {
        world.set_bot_visibility(kind, true);
    }

    #[test]
    fn adjacent_hit_damages_and_stuns() {
        let mut world = world_with(vec![
            at(3, 3, ObjectSpec::Avatar),
            at(4, 3, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        sighted(&mut world, BotKind::Dumb);
        let mut events = Vec::new();
        resolve(&mut world, BotKind::Dumb, &mut events);
        assert_eq!(world.avatar().health(), DEFAULT_HEALTH - 1);
        assert_eq!(world.shared().stun_turns_remaining, STUN_DURATION);
        assert!(world.bot(BotKind::Dumb).unwrap().has_attacked());
        assert_eq!(
            events,
            vec![
                Event::BotAttacked {
                    bot: BotKind::Dumb,
                    target: Vec2::new(3, 3),
                },
                Event::StunArmed {
                    turns: STUN_DURATION,
                },
            ]
        );
    }

    #[test]
    fn no_sight_means_no_attack() {
        let mut world = world_with(vec![
            at(3, 3, ObjectSpec::Avatar),
            at(4, 3, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        let mut events = Vec::new();
        resolve(&mut world, BotKind::Dumb, &mut events);
        assert_eq!(world.avatar().health(), DEFAULT_HEALTH);
        assert!(events.is_empty());
    }

    #[test]
    fn armed_stun_blocks_every_attack() {
        let mut world = world_with(vec![
            at(3, 3, ObjectSpec::Avatar),
            at(4, 3, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        sighted(&mut world, BotKind::Dumb);
        world.arm_stun();
        let mut events = Vec::new();
        resolve(&mut world, BotKind::Dumb, &mut events);
        assert_eq!(world.avatar().health(), DEFAULT_HEALTH);
        assert!(events.is_empty());
    }

    #[test]
    fn distant_avatar_is_out_of_reach() {
        let mut world = world_with(vec![
            at(3, 3, ObjectSpec::Avatar),
            at(6, 3, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        sighted(&mut world, BotKind::Dumb);
        let mut events = Vec::new();
        resolve(&mut world, BotKind::Dumb, &mut events);
        assert_eq!(world.avatar().health(), DEFAULT_HEALTH);
        assert!(events.is_empty());
    }

    #[test]
    fn diagonal_adjacency_is_in_reach() {
        let mut world = world_with(vec![
            at(3, 3, ObjectSpec::Avatar),
            at(4, 4, ObjectSpec::Bot {
                kind: BotKind::Jumper,
            }),
        ]);
        sighted(&mut world, BotKind::Jumper);
        let mut events = Vec::new();
        resolve(&mut world, BotKind::Jumper, &mut events);
        assert_eq!(world.avatar().health(), DEFAULT_HEALTH - 1);
    }

    #[test]
    fn a_hit_forces_generators_offline_and_rearms_support() {
        let mut world = world_with(vec![
            at(3, 3, ObjectSpec::Avatar),
            at(4, 3, ObjectSpec::Bot { kind: BotKind::Dumb }),
            at(8, 8, ObjectSpec::Bot {
                kind: BotKind::Support,
            }),
            at(1, 1, ObjectSpec::Door {
                key: "gate".to_owned(),
            }),
            at(3, 2, ObjectSpec::Generator {
                cost: 0,
                activation_bonus: 0,
                multiplier_bonus: 0.5,
                doors: vec!["gate".to_owned()],
            }),
        ]);
        assert!(matches!(
            world.activate_generator_at(Vec2::new(3, 2)),
            Some(lockdown_world::GeneratorActivation::Activated(0))
        ));
        // Run the support countdown until the boost is on.
        let mut turned_on = false;
        for _ in 0..300 {
            turned_on = world.tick_support().unwrap_or(false);
        }
        assert!(turned_on);
        sighted(&mut world, BotKind::Dumb);
        let mut events = Vec::new();
        resolve(&mut world, BotKind::Dumb, &mut events);
        assert_eq!(world.active_generator_count(), 0);
        assert!(!world
            .bot(BotKind::Support)
            .unwrap()
            .support()
            .unwrap()
            .is_turned_on());
        assert!(events.contains(&Event::GeneratorsDisabled));
        // The opened door stays open through the shutdown.
        assert!(world
            .board()
            .can_object_occupy(Vec2::new(1, 1), Mover::Avatar));
    }
}
