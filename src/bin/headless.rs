//! Headless Colony Runner
//!
//! Runs the demo colony for a fixed number of ticks and prints a JSON
//! summary (or the full state tree) to stdout.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use ant_colony::command::{Command, CommandExecutor, CommandOutcome};
use ant_colony::core::config::ColonyConfig;
use ant_colony::core::error::{ColonyError, Result};
use ant_colony::entity::kind::EntityKind;
use ant_colony::entity::tasks::Task;
use ant_colony::scenario::seed_demo_world;
use ant_colony::simulation::tick::TickEvent;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Colony Runner - batch simulation with a JSON summary
#[derive(Parser, Debug)]
#[command(name = "headless")]
#[command(about = "Run the demo ant colony without a UI and print a JSON summary")]
struct Args {
    /// Number of ticks to run
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with an array of task templates to register
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Task name to give every ant before the run
    #[arg(long)]
    assign: Option<String>,

    /// Print the full state tree instead of the summary
    #[arg(long)]
    snapshot: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    living_ants: usize,
    dead_ants: usize,
    entities: BTreeMap<&'static str, usize>,
    events: BTreeMap<&'static str, usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ColonyConfig::load(path)?,
        None => ColonyConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;
    let mut world = seed_demo_world(config)?;

    if let Some(path) = &args.tasks {
        let tasks: Vec<Task> = serde_json::from_str(&fs::read_to_string(path)?)?;
        tracing::info!("Registering {} tasks from {}", tasks.len(), path.display());
        for task in tasks {
            CommandExecutor::execute(&mut world, Command::CreateTask { task })?;
        }
    }

    if let Some(name) = &args.assign {
        let task = world
            .task(name)
            .cloned()
            .ok_or_else(|| ColonyError::TaskNotFound(name.clone()))?;
        let ants = world.ant_ids();
        tracing::info!("Assigning {:?} to {} ants", name, ants.len());
        CommandExecutor::execute(&mut world, Command::AssignTask { task, ants })?;
    }

    let mut events: BTreeMap<&'static str, usize> = BTreeMap::new();
    for _ in 0..args.ticks {
        if let CommandOutcome::Ticked { events: tick_events } = CommandExecutor::execute(&mut world, Command::Tick)? {
            for event in &tick_events {
                *events.entry(event_name(event)).or_default() += 1;
            }
        }
    }
    tracing::info!("Finished {} ticks", world.time);

    if args.snapshot {
        println!("{}", world.snapshot_json()?);
        return Ok(());
    }

    let living_ants = world.living_ant_count();
    let summary = RunSummary {
        seed,
        ticks: world.time,
        living_ants,
        dead_ants: world.store.count_of(EntityKind::Ant) - living_ants,
        entities: EntityKind::ALL
            .iter()
            .map(|k| (k.tag(), world.store.count_of(*k)))
            .collect(),
        events,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn event_name(event: &TickEvent) -> &'static str {
    match event {
        TickEvent::AntStarved { .. } => "ANT_STARVED",
        TickEvent::LarvaStarved { .. } => "LARVA_STARVED",
        TickEvent::StageChanged { .. } => "STAGE_CHANGED",
        TickEvent::PheromoneEvaporated { .. } => "PHEROMONE_EVAPORATED",
        TickEvent::EntityLifted { .. } => "ENTITY_LIFTED",
    }
}
