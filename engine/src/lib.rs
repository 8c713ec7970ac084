//! Turn orchestration.
//!
//! The engine owns the world and the per-turn pass order. A [`Strategy`]
//! supplies the avatar's actions each turn inside a wall-clock budget;
//! everything else, bot planning included, runs off the blueprint seed so
//! a run is a pure function of blueprint plus strategy.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use lockdown_core::{Action, Event, GameOutcome};
use lockdown_system_behavior::{plan, BehaviorState};
use lockdown_system_economy::{award_points, PointBreakdown, PowerDrain};
use lockdown_system_refuge::EvictionError;
use lockdown_world::{
    snapshot::WorldSnapshot, Avatar, MapBlueprint, SetupError, World,
};

/// Turns, ticks, and budgets that bound a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run ends after this many turns regardless of game state.
    pub tick_limit: u32,
    /// Actions consumed from a strategy per turn; extras are dropped.
    pub max_actions_per_turn: usize,
    /// Wall-clock budget for one [`Strategy::decide`] call.
    pub action_budget: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_limit: 500,
            max_actions_per_turn: 2,
            action_budget: Duration::from_millis(100),
        }
    }
}

/// Decides the avatar's actions each turn.
pub trait Strategy {
    /// Returns the actions to attempt this turn, most urgent first.
    ///
    /// Runs against a defensive snapshot; nothing returned here mutates
    /// the world directly.
    fn decide(&mut self, turn: u32, world: &WorldSnapshot, avatar: &Avatar) -> Vec<Action>;
}

/// Everything recorded about one finished turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-indexed turn number.
    pub tick: u32,
    /// Board state after the turn resolved.
    pub board: WorldSnapshot,
    /// Avatar state after the turn resolved.
    pub avatar: Avatar,
    /// How this turn's points were computed.
    pub points: PointBreakdown,
    /// Everything that happened, in resolution order.
    pub events: Vec<Event>,
}

/// A full run, sufficient for exact playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    /// Seed every random draw flowed from.
    pub seed: u64,
    /// The map the run was played on.
    pub blueprint: MapBlueprint,
    /// One record per resolved turn.
    pub turns: Vec<TurnRecord>,
    /// Why the run ended.
    pub outcome: GameOutcome,
    /// Final score.
    pub final_score: i64,
}

/// A run that could not continue.
#[derive(Debug, Error)]
pub enum RunError {
    /// The refuge pass found no cell to evict the avatar to.
    #[error("refuge eviction failed: {0}")]
    Eviction(#[from] EvictionError),
}

/// The turn orchestrator.
pub struct Engine {
    blueprint: MapBlueprint,
    world: World,
    config: EngineConfig,
    rng: ChaCha8Rng,
    behavior: BehaviorState,
    power: PowerDrain,
    turn: u32,
    outcome: Option<GameOutcome>,
}

impl Engine {
    /// Builds a world from `blueprint` and prepares turn one.
    pub fn new(blueprint: &MapBlueprint, config: EngineConfig) -> Result<Self, SetupError> {
        let world = World::from_blueprint(blueprint)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(blueprint.seed),
            blueprint: blueprint.clone(),
            world,
            config,
            behavior: BehaviorState::default(),
            power: PowerDrain::default(),
            turn: 1,
            outcome: None,
        })
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Why the run ended, once it has.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Runs turns until a terminal state and returns the full artifact.
    pub fn run(mut self, strategy: &mut dyn Strategy) -> Result<RunArtifact, RunError> {
        let mut turns = Vec::new();
        while self.outcome.is_none() {
            turns.push(self.tick(strategy)?);
        }
        let outcome = self.outcome.unwrap_or(GameOutcome::TickLimit);
        Ok(RunArtifact {
            seed: self.blueprint.seed,
            blueprint: self.blueprint,
            turns,
            outcome,
            final_score: self.world.avatar().score(),
        })
    }

    /// Resolves one full turn.
    pub fn tick(&mut self, strategy: &mut dyn Strategy) -> Result<TurnRecord, RunError> {
        let tick = self.turn;
        let mut events = Vec::new();

        let actions = self.collect_actions(strategy, tick);
        for action in actions {
            match action {
                Action::Move(direction) => {
                    lockdown_system_movement::move_avatar(&mut self.world, direction, &mut events);
                }
                Action::Interact(target) => {
                    lockdown_system_interact::handle_action(&mut self.world, target, &mut events);
                }
                // The avatar has no attack; idling is idling.
                Action::Attack(_) | Action::Idle => {}
            }
        }
        lockdown_system_interact::handle_implicit(&mut self.world, &mut events);

        lockdown_system_refuge::handle(&mut self.world, &mut events)?;

        self.world.tick_stun();
        let boost_on = self.world.tick_support().unwrap_or(false);
        for kind in self.world.bot_kinds() {
            self.world.set_bot_boost(kind, boost_on);
        }
        lockdown_system_vision::refresh(&mut self.world);

        for kind in self.world.bot_kinds() {
            if self.world.bot_can_act(kind, tick) {
                let steps = plan(&self.world, kind, &mut self.behavior, &mut self.rng);
                lockdown_system_movement::move_bot(&mut self.world, kind, &steps, &mut events);
            }
            lockdown_system_combat::resolve(&mut self.world, kind, &mut events);
            if self.world.avatar().health() == 0 {
                self.end(GameOutcome::AvatarDestroyed, &mut events);
                break;
            }
        }

        self.power.run(&mut self.world, &mut events);
        if self.outcome.is_none() && self.world.avatar().power() == 0 {
            self.end(GameOutcome::PowerDepleted, &mut events);
        }

        let points = award_points(&mut self.world, &mut events);

        if self.outcome.is_none() && tick >= self.config.tick_limit {
            self.end(GameOutcome::TickLimit, &mut events);
        }
        self.turn += 1;
        debug!(tick, score = self.world.avatar().score(), "turn resolved");

        Ok(TurnRecord {
            tick,
            board: WorldSnapshot::capture(&self.world),
            avatar: self.world.avatar().clone(),
            points,
            events,
        })
    }

    fn end(&mut self, outcome: GameOutcome, out_events: &mut Vec<Event>) {
        self.outcome = Some(outcome);
        out_events.push(Event::GameEnded { outcome });
    }

    /// Asks the strategy for its actions, enforcing the wall-clock
    /// budget. An overrun discards the whole turn's actions.
    fn collect_actions(&mut self, strategy: &mut dyn Strategy, tick: u32) -> Vec<Action> {
        let snapshot = WorldSnapshot::capture(&self.world);
        let avatar = self.world.avatar().clone();
        let started = Instant::now();
        let mut actions = strategy.decide(tick, &snapshot, &avatar);
        let elapsed = started.elapsed();
        if elapsed > self.config.action_budget {
            warn!(tick, ?elapsed, "strategy overran its budget, actions dropped");
            return Vec::new();
        }
        actions.truncate(self.config.max_actions_per_turn);
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdown_core::Vec2;
    use lockdown_world::{ObjectSpec, Placement};

    struct Idle;

    impl Strategy for Idle {
        fn decide(&mut self, _: u32, _: &WorldSnapshot, _: &Avatar) -> Vec<Action> {
            vec![Action::Idle]
        }
    }

    fn blueprint() -> MapBlueprint {
        MapBlueprint {
            seed: 77,
            map_size: Vec2::new(8, 8),
            walled: true,
            placements: vec![Placement {
                at: Vec2::new(3, 3),
                object: ObjectSpec::Avatar,
            }],
        }
    }

    #[test]
    fn tick_limit_closes_the_run() {
        let config = EngineConfig {
            tick_limit: 5,
            ..EngineConfig::default()
        };
        let engine = Engine::new(&blueprint(), config).expect("engine builds");
        let artifact = engine.run(&mut Idle).expect("run finishes");
        assert_eq!(artifact.outcome, GameOutcome::TickLimit);
        assert_eq!(artifact.turns.len(), 5);
        assert_eq!(artifact.final_score, 500);
        assert_eq!(
            artifact.turns.last().unwrap().events.last(),
            Some(&Event::GameEnded {
                outcome: GameOutcome::TickLimit,
            })
        );
    }

    #[test]
    fn excess_actions_are_dropped() {
        struct Spammer;
        impl Strategy for Spammer {
            fn decide(&mut self, _: u32, _: &WorldSnapshot, _: &Avatar) -> Vec<Action> {
                vec![Action::Move(lockdown_core::Direction::East); 5]
            }
        }
        let config = EngineConfig {
            tick_limit: 1,
            ..EngineConfig::default()
        };
        let engine = Engine::new(&blueprint(), config).expect("engine builds");
        let artifact = engine.run(&mut Spammer).expect("run finishes");
        // Of five requested steps only two are taken.
        assert_eq!(artifact.turns[0].avatar.position(), Vec2::new(5, 3));
    }

    #[test]
    fn overrunning_strategy_loses_its_turn() {
        struct Sleeper;
        impl Strategy for Sleeper {
            fn decide(&mut self, _: u32, _: &WorldSnapshot, _: &Avatar) -> Vec<Action> {
                std::thread::sleep(Duration::from_millis(20));
                vec![Action::Move(lockdown_core::Direction::East)]
            }
        }
        let config = EngineConfig {
            tick_limit: 1,
            action_budget: Duration::from_millis(1),
            ..EngineConfig::default()
        };
        let engine = Engine::new(&blueprint(), config).expect("engine builds");
        let artifact = engine.run(&mut Sleeper).expect("run finishes");
        assert_eq!(artifact.turns[0].avatar.position(), Vec2::new(3, 3));
    }
}
