//! Refuge occupancy bookkeeping and overstay eviction.
//!
//! Runs once per turn after the avatar has moved. It recomputes whether
//! the avatar stands on a refuge tile, advances the shared inside and
//! outside counters, evicts on overstay, and mirrors the resulting
//! closed flag onto every refuge tile.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{Direction, Event, Mover, Vec2};
use lockdown_world::{Entity, World, MAX_TURNS_INSIDE};
use thiserror::Error;

/// No adjacent cell could accept the evicted avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no adjacent cell can accept the avatar evicted from {0}")]
pub struct EvictionError(pub Vec2);

/// Runs the per-turn refuge pass.
pub fn handle(world: &mut World, out_events: &mut Vec<Event>) -> Result<(), EvictionError> {
    let avatar_at = world.avatar().position();
    let on_refuge = world.refuge_positions().contains(&avatar_at);
    let was_occupied = world.shared().refuge.occupied;
    if on_refuge && !was_occupied {
        out_events.push(Event::RefugeEntered);
    }
    if !on_refuge && was_occupied {
        out_events.push(Event::RefugeExited);
    }

    let refuge = &mut world.shared_mut().refuge;
    refuge.occupied = on_refuge;
    if on_refuge {
        refuge.turns_inside += 1;
        refuge.turns_outside = 0;
    } else {
        refuge.turns_outside += 1;
        refuge.turns_inside = 0;
    }

    if world.shared().refuge.turns_inside >= MAX_TURNS_INSIDE {
        let to = eviction_target(world, avatar_at).ok_or(EvictionError(avatar_at))?;
        world.force_move_avatar(to);
        world.shared_mut().refuge.occupied = false;
        out_events.push(Event::AvatarEvicted { to });
        out_events.push(Event::RefugeExited);
    }

    world.sync_refuge_closed();
    Ok(())
}

/// First adjacent cell, scanning north, east, south, west, that can take
/// the avatar: in bounds, hostable, not a refuge tile, and bot-free.
fn eviction_target(world: &World, from: Vec2) -> Option<Vec2> {
    Direction::ALL.into_iter().find_map(|direction| {
        let to = from + direction.offset();
        if !world.board().is_occupiable(to) {
            return None;
        }
        let stack = world.board().stack(to);
        let bot_present = stack
            .iter()
            .any(|&id| matches!(world.board().entity(id), Entity::Bot(_)));
        if bot_present {
            return None;
        }
        match world.board().top(to) {
            Some(Entity::Refuge(_)) => None,
            Some(top) if !top.can_host(Mover::Avatar) => None,
            _ => Some(to),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown_core::BotKind;
    use lockdown_world::{MapBlueprint, ObjectSpec, Placement, MIN_TURNS_OUTSIDE};

    fn world_with(placements: Vec<Placement>) -> World {
        World::from_blueprint(&MapBlueprint {
            seed: 6,
            map_size: Vec2::new(9, 9),
            walled: true,
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
    fn entry_and_exit_transitions_emit_events() {
        // The refuge placed first hosts the avatar placed second.
        let mut world = world_with(vec![
            at(4, 4, ObjectSpec::Refuge),
            at(4, 4, ObjectSpec::Avatar),
        ]);
        let mut events = Vec::new();
        handle(&mut world, &mut events).expect("no eviction yet");
        assert_eq!(events, vec![Event::RefugeEntered]);
        assert!(world.shared().refuge.occupied);
        assert_eq!(world.shared().refuge.turns_inside, 1);

        world.force_move_avatar(Vec2::new(5, 4));
        events.clear();
        handle(&mut world, &mut events).expect("no eviction");
        assert_eq!(events, vec![Event::RefugeExited]);
        assert_eq!(world.shared().refuge.turns_outside, 1);
        assert!(world.shared().refuge.is_closed());
    }

    #[test]
    fn overstay_evicts_to_the_first_open_side() {
        let mut world = world_with(vec![
            at(4, 4, ObjectSpec::Refuge),
            at(4, 4, ObjectSpec::Avatar),
            // Block the north exit so eviction falls through to east.
            at(4, 3, ObjectSpec::Wall),
        ]);
        let mut events = Vec::new();
        for _ in 0..MAX_TURNS_INSIDE {
            handle(&mut world, &mut events).expect("eviction succeeds");
        }
        assert_eq!(world.avatar().position(), Vec2::new(5, 4));
        assert!(events.contains(&Event::AvatarEvicted {
            to: Vec2::new(5, 4),
        }));
        assert!(!world.shared().refuge.occupied);
    }

    #[test]
    fn eviction_skips_cells_holding_bots() {
        let mut world = world_with(vec![
            at(4, 4, ObjectSpec::Refuge),
            at(4, 4, ObjectSpec::Avatar),
            at(4, 3, ObjectSpec::Bot { kind: BotKind::Dumb }),
        ]);
        let mut events = Vec::new();
        for _ in 0..MAX_TURNS_INSIDE {
            handle(&mut world, &mut events).expect("eviction succeeds");
        }
        assert_eq!(world.avatar().position(), Vec2::new(5, 4));
    }

    #[test]
    fn boxed_in_refuge_reports_the_failure() {
        let mut world = world_with(vec![
            at(1, 1, ObjectSpec::Refuge),
            at(1, 1, ObjectSpec::Avatar),
            at(2, 1, ObjectSpec::Wall),
            at(1, 2, ObjectSpec::Wall),
        ]);
        let mut events = Vec::new();
        let mut result = Ok(());
        for _ in 0..MAX_TURNS_INSIDE {
            result = handle(&mut world, &mut events);
        }
        assert_eq!(result, Err(EvictionError(Vec2::new(1, 1))));
    }

    #[test]
    fn refuge_reopens_after_the_cooldown() {
        let mut world = world_with(vec![
            at(4, 4, ObjectSpec::Refuge),
            at(4, 5, ObjectSpec::Avatar),
        ]);
        world.shared_mut().refuge.turns_outside = 0;
        world.sync_refuge_closed();
        assert!(!world.board().can_object_occupy(Vec2::new(4, 4), Mover::Avatar));
        let mut events = Vec::new();
        for _ in 0..MIN_TURNS_OUTSIDE {
            handle(&mut world, &mut events).expect("no eviction");
        }
        assert!(!world.shared().refuge.is_closed());
        assert!(world.board().can_object_occupy(Vec2::new(4, 4), Mover::Avatar));
    }
}
