#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a lockdown scenario from the terminal.
//!
//! Loads a map blueprint (or the built-in demo arena), drives a full run
//! with the baseline [`Wanderer`] strategy, prints the outcome, and
//! optionally writes the turn log and a summary as JSON.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lockdown_core::{Action, BotKind, Direction, GameOutcome, InteractTarget, Mover, Vec2};
use lockdown_engine::{Engine, EngineConfig, Strategy};
use lockdown_system_pathfinding::{next_step, DangerModel};
use lockdown_world::{
    snapshot::WorldSnapshot, Avatar, Entity, MapBlueprint, ObjectSpec, Placement,
};

/// Command-line options.
#[derive(Parser, Debug)]
#[command(name = "lockdown", about = "Runs a lockdown break-in scenario.")]
struct Args {
    /// Map blueprint JSON file. Omit it to play the built-in demo arena.
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// Overrides the blueprint's random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the turn limit.
    #[arg(long)]
    ticks: Option<u32>,

    /// Overrides the per-turn strategy budget, in milliseconds.
    #[arg(long, value_name = "MS")]
    budget_ms: Option<u64>,

    /// Directory to write `turns.json` and `results.json` into.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

/// Compact result record written next to the full turn log.
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    outcome: GameOutcome,
    turns: usize,
    final_score: i64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut blueprint = match &args.map {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading map {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing map {}", path.display()))?
        }
        None => demo_arena(),
    };
    if let Some(seed) = args.seed {
        blueprint.seed = seed;
    }

    let mut config = EngineConfig::default();
    if let Some(ticks) = args.ticks {
        config.tick_limit = ticks;
    }
    if let Some(ms) = args.budget_ms {
        config.action_budget = Duration::from_millis(ms);
    }

    let engine = Engine::new(&blueprint, config).context("blueprint rejected")?;
    let mut strategy = Wanderer::default();
    let artifact = engine.run(&mut strategy).context("run aborted")?;

    let summary = RunSummary {
        seed: artifact.seed,
        outcome: artifact.outcome,
        turns: artifact.turns.len(),
        final_score: artifact.final_score,
    };
    info!(
        outcome = ?summary.outcome,
        turns = summary.turns,
        score = summary.final_score,
        "run finished"
    );

    if let Some(dir) = &args.out {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        fs::write(
            dir.join("turns.json"),
            serde_json::to_vec_pretty(&artifact).context("encoding turn log")?,
        )
        .context("writing turns.json")?;
        fs::write(
            dir.join("results.json"),
            serde_json::to_vec_pretty(&summary).context("encoding summary")?,
        )
        .context("writing results.json")?;
        info!(dir = %dir.display(), "artifacts written");
    }

    println!("outcome: {:?}", summary.outcome);
    println!("turns:   {}", summary.turns);
    println!("score:   {}", summary.final_score);
    Ok(())
}

/// Baseline strategy: farms pickups, feeds generators when scrap allows, and
/// routes around bots using the standard danger weighting.
struct Wanderer {
    danger: DangerModel,
}

impl Default for Wanderer {
    fn default() -> Self {
        Self {
            danger: DangerModel::STANDARD,
        }
    }
}

impl Strategy for Wanderer {
    fn decide(&mut self, _turn: u32, world: &WorldSnapshot, avatar: &Avatar) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(target) = affordable_generator(world, avatar) {
            actions.push(Action::Interact(target));
        }
        let here = avatar.position();
        let threats = bot_positions(world);
        if let Some(goal) = pickup_goal(world, avatar) {
            let step = next_step(
                here,
                goal,
                |at| walkable(world, at),
                |at| self.danger.cost(at, &threats),
            );
            if let Some(to) = step {
                if let Some(direction) = Direction::from_offset(to - here) {
                    actions.push(Action::Move(direction));
                }
            }
        }
        if actions.is_empty() {
            actions.push(Action::Idle);
        }
        actions
    }
}

/// An inactive generator underfoot or one step away that the held scrap can
/// pay for.
fn affordable_generator(world: &WorldSnapshot, avatar: &Avatar) -> Option<InteractTarget> {
    let targets = [
        InteractTarget::Here,
        InteractTarget::Toward(Direction::North),
        InteractTarget::Toward(Direction::East),
        InteractTarget::Toward(Direction::South),
        InteractTarget::Toward(Direction::West),
    ];
    targets.into_iter().find(|target| {
        let at = avatar.position() + target.offset();
        stack_at(world, at).any(|entity| match entity {
            Entity::Generator(generator) => {
                !generator.is_active() && avatar.inventory().scrap() >= generator.cost()
            }
            _ => false,
        })
    })
}

/// Coordinate of the most attractive ready pickup, if any.
///
/// Batteries jump the queue when power runs low and scrap does when an
/// inactive generator is still waiting for fuel; otherwise the nearest
/// ready spawner wins, coordinate order breaking ties.
fn pickup_goal(world: &WorldSnapshot, avatar: &Avatar) -> Option<Vec2> {
    let here = avatar.position();
    let fueling = world.cells.iter().flat_map(|cell| &cell.stack).any(|object| {
        matches!(&object.entity, Entity::Generator(generator) if !generator.is_active())
    });
    let mut best: Option<(u32, u32, Vec2)> = None;
    for cell in &world.cells {
        for object in &cell.stack {
            if object.state != "idle" {
                continue;
            }
            let priority = match &object.entity {
                Entity::BatterySpawner(_) => {
                    if avatar.power() < 50 {
                        0
                    } else {
                        2
                    }
                }
                Entity::ScrapSpawner(_) => {
                    if fueling {
                        1
                    } else {
                        3
                    }
                }
                Entity::CoinSpawner(_) => 2,
                _ => continue,
            };
            let candidate = (priority, here.manhattan_distance(cell.at), cell.at);
            if best.map_or(true, |current| candidate < current) {
                best = Some(candidate);
            }
        }
    }
    best.map(|(_, _, at)| at)
}

/// Every cell currently hosting a bot.
fn bot_positions(world: &WorldSnapshot) -> Vec<Vec2> {
    world
        .cells
        .iter()
        .filter(|cell| {
            cell.stack
                .iter()
                .any(|object| matches!(object.entity, Entity::Bot(_)))
        })
        .map(|cell| cell.at)
        .collect()
}

/// Whether the avatar may step onto `at` given the captured board.
fn walkable(world: &WorldSnapshot, at: Vec2) -> bool {
    if at.x < 0 || at.y < 0 || at.x >= world.map_size.x || at.y >= world.map_size.y {
        return false;
    }
    match world.top(at) {
        None => true,
        Some(object) => object.entity.can_host(Mover::Avatar),
    }
}

fn stack_at(world: &WorldSnapshot, at: Vec2) -> impl Iterator<Item = &Entity> {
    world
        .cells
        .iter()
        .filter(move |cell| cell.at == at)
        .flat_map(|cell| cell.stack.iter().map(|object| &object.entity))
}

/// The built-in showcase map: an 11 by 9 walled arena split by a gated wall.
///
/// The west half holds the avatar, a refuge, and the scrap and coin
/// spawners. A generator opens the east gate, behind which the battery
/// spawner and most of the bots wait. A vent in the dividing wall lets the
/// crawler through early.
fn demo_arena() -> MapBlueprint {
    let mut placements = vec![
        Placement {
            at: Vec2::new(1, 1),
            object: ObjectSpec::Avatar,
        },
        Placement {
            at: Vec2::new(1, 4),
            object: ObjectSpec::Refuge,
        },
        Placement {
            at: Vec2::new(2, 2),
            object: ObjectSpec::ScrapSpawner {
                turns_to_respawn: 4,
                point_value: 10,
            },
        },
        Placement {
            at: Vec2::new(4, 3),
            object: ObjectSpec::CoinSpawner {
                turns_to_respawn: 5,
                point_value: 25,
            },
        },
        Placement {
            at: Vec2::new(8, 6),
            object: ObjectSpec::BatterySpawner {
                turns_to_respawn: 6,
                recharge_amount: 20,
                point_value: 0,
            },
        },
        Placement {
            at: Vec2::new(3, 6),
            object: ObjectSpec::Generator {
                cost: 2,
                activation_bonus: 50,
                multiplier_bonus: 0.25,
                doors: vec!["east_gate".to_owned()],
            },
        },
        Placement {
            at: Vec2::new(6, 2),
            object: ObjectSpec::Vent,
        },
        Placement {
            at: Vec2::new(6, 4),
            object: ObjectSpec::Door {
                key: "east_gate".to_owned(),
            },
        },
        Placement {
            at: Vec2::new(9, 7),
            object: ObjectSpec::Bot {
                kind: BotKind::Dumb,
            },
        },
        Placement {
            at: Vec2::new(7, 7),
            object: ObjectSpec::Bot {
                kind: BotKind::Crawler,
            },
        },
        Placement {
            at: Vec2::new(9, 1),
            object: ObjectSpec::Bot {
                kind: BotKind::Hunter,
            },
        },
        Placement {
            at: Vec2::new(8, 3),
            object: ObjectSpec::Bot {
                kind: BotKind::Jumper,
            },
        },
        Placement {
            at: Vec2::new(8, 5),
            object: ObjectSpec::Bot {
                kind: BotKind::Support,
            },
        },
    ];
    for y in [1, 3, 5, 6, 7] {
        placements.push(Placement {
            at: Vec2::new(6, y),
            object: ObjectSpec::Wall,
        });
    }
    MapBlueprint {
        seed: 2024,
        map_size: Vec2::new(11, 9),
        walled: true,
        placements,
    }
}
