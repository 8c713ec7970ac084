//! Power drain and per-turn scoring.
//!
//! Power bleeds passively on a fixed cadence, with a separate cadence for
//! the per-generator surcharge. Scoring awards a flat survival figure per
//! turn, scaled by a multiplier that running generators raise, vents
//! lower, and an occupied refuge zeroes out.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use lockdown_core::{Event, ObjectTag, Vec2};
use lockdown_world::{RespawnTimer, World};
use serde::{Deserialize, Serialize};

/// Survival points generated each turn before the multiplier.
pub const BASE_POINTS_PER_TURN: i64 = 100;
/// Multiplier lost while the avatar crouches in a vent.
pub const VENT_MULTIPLIER_REDUCTION: f64 = 0.5;
/// Extra power each running generator costs per drain cadence.
pub const GENERATOR_POWER_PENALTY: u32 = 0;

/// Cadenced power-drain state, owned by the caller across turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerDrain {
    passive_cooldown: RespawnTimer,
    generator_cooldown: RespawnTimer,
    decay_amount: u32,
}

impl Default for PowerDrain {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl PowerDrain {
    /// Drain setup taking `decay_amount` power every `frequency` turns.
    #[must_use]
    pub fn new(frequency: u32, decay_amount: u32) -> Self {
        Self {
            passive_cooldown: RespawnTimer::new(frequency),
            generator_cooldown: RespawnTimer::new(frequency),
            decay_amount,
        }
    }

    /// Runs one turn of drain. Does nothing once power is already gone.
    pub fn run(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        self.passive_cooldown.tick();
        self.generator_cooldown.tick();
        if world.avatar().power() == 0 {
            return;
        }
        let mut amount = 0;
        if self.passive_cooldown.try_reset() {
            amount += self.decay_amount;
        }
        if self.generator_cooldown.try_reset() {
            amount += world.active_generator_count() as u32 * GENERATOR_POWER_PENALTY;
        }
        if amount == 0 {
            return;
        }
        let drained = world.drain_power(amount);
        out_events.push(Event::PowerDrained { amount: drained });
    }
}

/// One named contribution to the turn's multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MultiplierSource {
    /// The survival baseline every turn starts from.
    Survival {
        /// Contribution to the multiplier, always `1.0`.
        value: f64,
    },
    /// A running generator's bonus.
    Generator {
        /// Board cell of the generator.
        at: Vec2,
        /// Contribution to the multiplier.
        value: f64,
    },
    /// The cost of crouching in a vent.
    Vent {
        /// Contribution to the multiplier, always negative.
        value: f64,
    },
    /// An occupied refuge replaces every other source with zero.
    Refuge,
}

/// How one turn's point award was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointBreakdown {
    /// Points generated before the multiplier.
    pub base: i64,
    /// Multiplier applied to the base figure.
    pub multiplier: f64,
    /// Rounded award actually added to the score.
    pub award: i64,
    /// Where the multiplier came from, one entry per contribution.
    pub sources: Vec<MultiplierSource>,
}

/// Awards the turn's survival points and reports the breakdown.
pub fn award_points(world: &mut World, out_events: &mut Vec<Event>) -> PointBreakdown {
    let mut sources = Vec::new();
    let multiplier = if world.shared().refuge.occupied {
        sources.push(MultiplierSource::Refuge);
        0.0
    } else {
        let mut m = 1.0;
        sources.push(MultiplierSource::Survival { value: 1.0 });
        for (at, bonus) in world.active_generators() {
            sources.push(MultiplierSource::Generator { at, value: bonus });
            m += bonus;
        }
        if world.avatar_overlaps(ObjectTag::Vent) {
            sources.push(MultiplierSource::Vent {
                value: -VENT_MULTIPLIER_REDUCTION,
            });
            m -= VENT_MULTIPLIER_REDUCTION;
        }
        m
    };
    let award = (BASE_POINTS_PER_TURN as f64 * multiplier).round() as i64;
    world.award_points(award);
    out_events.push(Event::PointsAwarded { amount: award });
    PointBreakdown {
        base: BASE_POINTS_PER_TURN,
        multiplier,
        award,
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown_core::{Direction, Mover, Vec2};
    use lockdown_world::{MapBlueprint, ObjectSpec, Placement, MAX_POWER};

    fn world() -> World {
        World::from_blueprint(&MapBlueprint {
            seed: 4,
            map_size: Vec2::new(8, 8),
            walled: false,
            placements: vec![
                Placement {
                    at: Vec2::new(2, 2),
                    object: ObjectSpec::Avatar,
                },
                Placement {
                    at: Vec2::new(3, 2),
                    object: ObjectSpec::Vent,
                },
                Placement {
                    at: Vec2::new(2, 3),
                    object: ObjectSpec::Refuge,
                },
                Placement {
                    at: Vec2::new(5, 5),
                    object: ObjectSpec::Generator {
                        cost: 0,
                        activation_bonus: 0,
                        multiplier_bonus: 0.25,
                        doors: vec![],
                    },
                },
            ],
        })
        .expect("blueprint builds")
    }

    #[test]
    fn passive_drain_takes_one_power_per_turn() {
        let mut world = world();
        let mut drain = PowerDrain::default();
        let mut events = Vec::new();
        for _ in 0..3 {
            drain.run(&mut world, &mut events);
        }
        assert_eq!(world.avatar().power(), MAX_POWER - 3);
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|event| *event == Event::PowerDrained { amount: 1 }));
    }

    #[test]
    fn slower_cadence_drains_on_schedule() {
        let mut world = world();
        let mut drain = PowerDrain::new(3, 2);
        let mut events = Vec::new();
        drain.run(&mut world, &mut events);
        assert_eq!(world.avatar().power(), MAX_POWER - 2);
        drain.run(&mut world, &mut events);
        drain.run(&mut world, &mut events);
        assert_eq!(world.avatar().power(), MAX_POWER - 2);
        drain.run(&mut world, &mut events);
        assert_eq!(world.avatar().power(), MAX_POWER - 4);
    }

    #[test]
    fn exhausted_power_stops_draining() {
        let mut world = world();
        let mut drain = PowerDrain::new(1, MAX_POWER);
        let mut events = Vec::new();
        drain.run(&mut world, &mut events);
        assert_eq!(world.avatar().power(), 0);
        drain.run(&mut world, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn baseline_turn_awards_the_flat_figure() {
        let mut world = world();
        let mut events = Vec::new();
        let breakdown = award_points(&mut world, &mut events);
        assert_eq!(breakdown.award, 100);
        assert_eq!(world.avatar().score(), 100);
        assert_eq!(events, vec![Event::PointsAwarded { amount: 100 }]);
        assert_eq!(
            breakdown.sources,
            vec![MultiplierSource::Survival { value: 1.0 }]
        );
    }

    #[test]
    fn vents_halve_and_generators_raise_the_award() {
        let mut world = world();
        assert!(world.activate_generator_at(Vec2::new(5, 5)).is_some());
        let mut events = Vec::new();
        let breakdown = award_points(&mut world, &mut events);
        assert_eq!(breakdown.award, 125);
        let _ = world.try_step(Mover::Avatar, Direction::East);
        let breakdown = award_points(&mut world, &mut events);
        assert!((breakdown.multiplier - 0.75).abs() < f64::EPSILON);
        assert_eq!(breakdown.award, 75);
        assert_eq!(
            breakdown.sources,
            vec![
                MultiplierSource::Survival { value: 1.0 },
                MultiplierSource::Generator {
                    at: Vec2::new(5, 5),
                    value: 0.25,
                },
                MultiplierSource::Vent { value: -0.5 },
            ]
        );
    }

    #[test]
    fn occupied_refuge_zeroes_the_award() {
        let mut world = world();
        world.shared_mut().refuge.occupied = true;
        let mut events = Vec::new();
        let breakdown = award_points(&mut world, &mut events);
        assert_eq!(breakdown.award, 0);
        assert_eq!(world.avatar().score(), 0);
        assert_eq!(breakdown.sources, vec![MultiplierSource::Refuge]);
    }
}
