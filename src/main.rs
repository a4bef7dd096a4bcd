//! Ant Colony - Entry Point
//!
//! Seeds the demo colony, runs the simulation host on a tokio runtime and
//! offers a small command loop for driving it.

use ant_colony::command::{Command, CommandOutcome};
use ant_colony::core::config::ColonyConfig;
use ant_colony::core::error::Result;
use ant_colony::core::types::EntityId;
use ant_colony::ecs::world::World;
use ant_colony::entity::kind::EntityKind;
use ant_colony::host::{HostHandle, SimulationHost};
use ant_colony::scenario::seed_demo_world;

use std::io::{self, Write};
use std::path::Path;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("ant_colony=debug")
        .init();

    tracing::info!("Ant Colony starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => ColonyConfig::load(Path::new(&path))?,
        None => ColonyConfig::default(),
    };

    let rt = Runtime::new()?;
    let world = seed_demo_world(config)?;
    let (handle, join) = {
        let _guard = rt.enter();
        SimulationHost::spawn(world)
    };

    println!("\n=== ANT COLONY ===");
    println!();
    println!("Commands:");
    println!("  tick / t               - Advance the simulation by one tick");
    println!("  run <n>                - Run n ticks");
    println!("  start / stop           - Start or stop interval ticking");
    println!("  status / s             - Show colony status");
    println!("  ants                   - List every ant");
    println!("  tasks                  - List task templates");
    println!("  assign <task> <id..>   - Give ants a task, e.g. assign Find Food 3 4");
    println!("  quit / q               - Exit");
    println!();

    loop {
        rt.block_on(display_status(&handle))?;

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            let outcome = rt.block_on(handle.send(Command::Tick))?;
            if let CommandOutcome::Ticked { events } = outcome {
                for event in &events {
                    println!("  {:?}", event);
                }
            }
            continue;
        }

        if let Some(n) = input.strip_prefix("run ") {
            match n.trim().parse::<u32>() {
                Ok(n) => {
                    println!("Running {} ticks...", n);
                    let mut events = 0;
                    for _ in 0..n {
                        if let CommandOutcome::Ticked { events: e } = rt.block_on(handle.send(Command::Tick))? {
                            events += e.len();
                        }
                    }
                    println!("Completed {} ticks ({} events).", n, events);
                }
                Err(_) => println!("Usage: run <number>"),
            }
            continue;
        }

        if input == "start" {
            rt.block_on(handle.send(Command::StartTick))?;
            continue;
        }

        if input == "stop" {
            rt.block_on(handle.send(Command::StopTick))?;
            continue;
        }

        if input == "status" || input == "s" {
            rt.block_on(display_detailed_status(&handle))?;
            continue;
        }

        if input == "ants" {
            rt.block_on(display_ants(&handle))?;
            continue;
        }

        if input == "tasks" {
            let names = rt.block_on(handle.inspect(|w| {
                w.tasks
                    .iter()
                    .map(|t| format!("{} ({} behaviors{})", t.name, t.len(), if t.repeating { ", repeating" } else { "" }))
                    .collect::<Vec<_>>()
            }))?;
            for name in names {
                println!("  {}", name);
            }
            continue;
        }

        if let Some(args) = input.strip_prefix("assign ") {
            match parse_assign(args) {
                Some((name, ants)) => {
                    let lookup = name.clone();
                    match rt.block_on(handle.inspect(move |w| w.task(&lookup).cloned()))? {
                        Some(task) => match rt.block_on(handle.send(Command::AssignTask { task, ants })) {
                            Ok(_) => println!("Assigned {}", name),
                            Err(e) => println!("Could not assign: {}", e),
                        },
                        None => println!("No task named {:?}", name),
                    }
                }
                None => println!("Usage: assign <task name> <ant id> [<ant id>..]"),
            }
            continue;
        }

        println!("Unknown command. Available: tick, run <n>, start, stop, status, ants, tasks, assign, quit");
    }

    rt.block_on(handle.shutdown())?;
    let world = rt.block_on(join).map_err(io::Error::other)?;
    println!(
        "\nGoodbye! Final state: {} entities, {} living ants, {} ticks elapsed.",
        world.store.len(),
        world.living_ant_count(),
        world.time
    );
    Ok(())
}

/// Split `Find Food 3 4` into the task name and the trailing ant ids
fn parse_assign(args: &str) -> Option<(String, Vec<EntityId>)> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let first_id = tokens.iter().position(|t| t.parse::<u64>().is_ok())?;
    if first_id == 0 {
        return None;
    }
    let ants = tokens[first_id..]
        .iter()
        .map(|t| t.parse::<u64>().ok().map(EntityId))
        .collect::<Option<Vec<_>>>()?;
    Some((tokens[..first_id].join(" "), ants))
}

async fn display_status(handle: &HostHandle) -> Result<()> {
    let line = handle
        .inspect(|w| {
            format!(
                "--- Tick {} | Ants: {} | Brood: {} | Food: {} | {} ---",
                w.time,
                w.living_ant_count(),
                [EntityKind::Egg, EntityKind::Larva, EntityKind::Pupa]
                    .iter()
                    .map(|k| w.store.count_of(*k))
                    .sum::<usize>(),
                w.store.count_of(EntityKind::Food),
                if w.ticking { "running" } else { "paused" }
            )
        })
        .await?;
    println!();
    println!("{}", line);
    Ok(())
}

async fn display_detailed_status(handle: &HostHandle) -> Result<()> {
    let report = handle
        .inspect(|w| {
            let mut lines = vec![format!("=== Status (Tick {}) ===", w.time)];
            for kind in EntityKind::ALL {
                let count = w.store.count_of(kind);
                if count > 0 {
                    lines.push(format!("  {:<12} {}", kind.tag(), count));
                }
            }
            lines.push(format!("  {:<12} {}", "EDGES", w.edges.len()));
            lines
        })
        .await?;
    for line in report {
        println!("{}", line);
    }
    Ok(())
}

async fn display_ants(handle: &HostHandle) -> Result<()> {
    let rows = handle.inspect(|w| w.ant_ids().into_iter().filter_map(|id| ant_row(w, id)).collect::<Vec<_>>()).await?;
    for row in rows {
        println!("{}", row);
    }
    Ok(())
}

fn ant_row(world: &World, id: EntityId) -> Option<String> {
    let entity = world.get(id)?;
    let ant = entity.ant()?;
    let position = entity
        .position
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    Some(format!(
        "  {} {:?} at {} | cal {} | age {} | task {} | holding {}{}",
        id,
        ant.sub_type,
        position,
        entity.calories,
        entity.age,
        ant.task_name().unwrap_or("none"),
        ant.holding.map(|h| h.to_string()).unwrap_or_else(|| "nothing".to_string()),
        if entity.alive { "" } else { " | dead" }
    ))
}
