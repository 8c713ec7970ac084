//! Avatar interactions with stations.
//!
//! Explicit interactions target the avatar's own cell or one orthogonal
//! neighbor and currently only generators respond. Implicit interactions
//! run once a turn without any action: every pickup spot the avatar is
//! standing on hands over its resource if its timer allows.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{Event, InteractTarget};
use lockdown_world::{GeneratorActivation, World};

/// Resolves one explicit interact action.
///
/// Aiming at anything that is not a generator, or at a generator the
/// avatar cannot pay for, does nothing.
pub fn handle_action(world: &mut World, target: InteractTarget, out_events: &mut Vec<Event>) {
    let at = world.avatar().position() + target.offset();
    match world.activate_generator_at(at) {
        Some(GeneratorActivation::Activated(_)) => {
            out_events.push(Event::GeneratorActivated { at });
        }
        Some(GeneratorActivation::AlreadyActive | GeneratorActivation::NotEnoughScrap) | None => {}
    }
}

/// Runs the implicit pickup pass for the current avatar cell.
pub fn handle_implicit(world: &mut World, out_events: &mut Vec<Event>) {
    world.run_spawners(out_events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown_core::{Direction, Mover, ResourceKind, Vec2};
    use lockdown_world::{MapBlueprint, ObjectSpec, Placement, MAX_POWER};

    fn world() -> World {
        World::from_blueprint(&MapBlueprint {
            seed: 2,
            map_size: Vec2::new(9, 9),
            walled: false,
            placements: vec![
                Placement {
                    at: Vec2::new(4, 4),
                    object: ObjectSpec::Avatar,
                },
                Placement {
                    at: Vec2::new(5, 4),
                    object: ObjectSpec::Generator {
                        cost: 1,
                        activation_bonus: 75,
                        multiplier_bonus: 0.0,
                        doors: vec!["vault".to_owned()],
                    },
                },
                Placement {
                    at: Vec2::new(1, 1),
                    object: ObjectSpec::Door {
                        key: "vault".to_owned(),
                    },
                },
                Placement {
                    at: Vec2::new(4, 3),
                    object: ObjectSpec::ScrapSpawner {
                        turns_to_respawn: 3,
                        point_value: 5,
                    },
                },
                Placement {
                    at: Vec2::new(4, 5),
                    object: ObjectSpec::BatterySpawner {
                        turns_to_respawn: 3,
                        recharge_amount: 20,
                        point_value: 5,
                    },
                },
            ],
        })
        .expect("blueprint builds")
    }

    #[test]
    fn generator_needs_scrap_before_it_responds() {
        let mut world = world();
        let mut events = Vec::new();
        handle_action(
            &mut world,
            InteractTarget::Toward(Direction::East),
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(world.active_generator_count(), 0);

        // Pick scrap up off the spawner to the north, then pay.
        let _ = world.try_step(Mover::Avatar, Direction::North);
        handle_implicit(&mut world, &mut events);
        assert_eq!(world.avatar().inventory().scrap(), 1);
        let _ = world.try_step(Mover::Avatar, Direction::South);
        events.clear();
        handle_action(
            &mut world,
            InteractTarget::Toward(Direction::East),
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::GeneratorActivated {
                at: Vec2::new(5, 4),
            }]
        );
        assert_eq!(world.avatar().score(), 5 + 75);
        assert_eq!(world.avatar().inventory().scrap(), 0);
    }

    #[test]
    fn interacting_here_reaches_the_cell_underfoot() {
        let mut world = world();
        // Stand on the generator cell itself and activate from there.
        let mut events = Vec::new();
        let _ = world.try_step(Mover::Avatar, Direction::North);
        handle_implicit(&mut world, &mut events);
        let _ = world.try_step(Mover::Avatar, Direction::South);
        let _ = world.try_step(Mover::Avatar, Direction::East);
        events.clear();
        handle_action(&mut world, InteractTarget::Here, &mut events);
        assert_eq!(
            events,
            vec![Event::GeneratorActivated {
                at: Vec2::new(5, 4),
            }]
        );
    }

    #[test]
    fn battery_pickup_caps_at_full_power() {
        let mut world = world();
        let mut events = Vec::new();
        let _ = world.try_step(Mover::Avatar, Direction::South);
        handle_implicit(&mut world, &mut events);
        assert_eq!(world.avatar().power(), MAX_POWER);
        assert_eq!(
            events,
            vec![Event::ResourceCollected {
                kind: ResourceKind::Battery,
                at: Vec2::new(4, 5),
                points: 5,
            }]
        );
        assert_eq!(world.avatar().score(), 5);
    }

    #[test]
    fn aiming_at_empty_space_is_a_no_op() {
        let mut world = world();
        let mut events = Vec::new();
        handle_action(
            &mut world,
            InteractTarget::Toward(Direction::West),
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(world.avatar().score(), 0);
    }
}
