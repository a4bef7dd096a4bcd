//! Colony configuration with documented constants
//!
//! All behavioural constants of the tick engine are collected here. The
//! config is owned by the [`World`](crate::ecs::world::World) and can be
//! loaded from TOML; any field left out of the file keeps its default.

use crate::core::error::{ColonyError, Result};
use crate::entity::kind::{BackgroundKind, EntityKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the colony simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    // === WORLD ===
    /// World width in grid cells
    pub world_width: i32,

    /// World height in grid cells
    pub world_height: i32,

    /// Seed for the world's random number generator
    ///
    /// Every random draw in the engine (RANDOM conditions, random moves,
    /// idle turns) comes from one generator seeded with this value.
    pub seed: u64,

    /// Wall-clock interval between ticks when the host is ticking
    pub ms_per_tick: u64,

    // === LIFE CYCLE ===
    /// Age (ticks) after which an egg hatches into a larva
    pub egg_hatch_age: u64,

    /// Age (ticks) after which a pupa hatches into an ant
    pub pupa_hatch_age: u64,

    /// Calories a larva starts with. Larvae lose one calorie per tick.
    pub larva_starting_calories: i64,

    /// Calories at which a fed larva pupates
    pub larva_end_calories: i64,

    // === ANTS ===
    /// Calories a newly hatched ant starts with
    pub ant_starting_calories: i64,

    /// Ceiling for ant calories; eating never goes past it
    pub ant_max_calories: i64,

    /// Most calories an ant takes from a food item in one EAT action
    pub ant_calories_per_eat: i64,

    /// Radius (cells) within which an ant reveals fogged entities
    pub ant_vision_radius: f64,

    /// Chance per idle tick that an ant turns 90 degrees instead of resting
    pub idle_turn_chance: f64,

    /// Upper bound on entity selection from the editor
    pub max_selectable_ants: usize,

    /// Name of the location whose anchor cell random moves never step onto
    pub colony_entrance: Option<String>,

    // === PHEROMONES ===
    /// Maximum pheromone quantity; reinforcement is clamped to this
    pub pheromone_max_quantity: i64,

    /// Quantity a freshly laid pheromone starts with
    pub pheromone_initial_quantity: i64,

    // === TYPE-TAG SETS ===
    /// Entity types an ant cannot move into
    pub blocking_kinds: Vec<EntityKind>,

    /// Entity types subject to gravity
    pub falling_kinds: Vec<EntityKind>,

    /// Entity types that stop a falling entity from dropping further
    pub stop_falling_kinds: Vec<EntityKind>,

    /// Falling types that background tiles can hold up (tunnel walkers)
    pub supported_kinds: Vec<EntityKind>,

    /// Background sub-types that support `supported_kinds`
    pub supporting_backgrounds: Vec<BackgroundKind>,

    /// Types that can cling to diagonal neighbours instead of falling
    pub climbing_kinds: Vec<EntityKind>,

    /// Types hidden by fog of war unless an ant is nearby
    pub fog_kinds: Vec<EntityKind>,

    /// Types an ant is allowed to pick up by kind. Stones are included so
    /// several ants can lift them together; obelisks stay put.
    pub pickupable_kinds: Vec<EntityKind>,

    /// Types an ant can feed when holding food
    pub feedable_kinds: Vec<EntityKind>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        use EntityKind::*;
        Self {
            world_width: 100,
            world_height: 100,
            seed: 12345,
            ms_per_tick: 16,

            egg_hatch_age: 100,
            pupa_hatch_age: 200,
            larva_starting_calories: 500,
            larva_end_calories: 1000,

            ant_starting_calories: 4000,
            ant_max_calories: 4000,
            ant_calories_per_eat: 100,
            ant_vision_radius: 8.0,
            idle_turn_chance: 0.05,
            max_selectable_ants: 25,
            colony_entrance: None,

            pheromone_max_quantity: 120,
            pheromone_initial_quantity: 120,

            blocking_kinds: vec![Dirt, Food, Egg, Larva, Pupa, Stone, Obelisk, DeadAnt],
            falling_kinds: vec![Ant, Dirt, Food, Egg, Larva, Pupa, Stone, DeadAnt],
            stop_falling_kinds: vec![Dirt, Food, Egg, Larva, Pupa, Stone, Obelisk, DeadAnt],
            supported_kinds: vec![Ant],
            supporting_backgrounds: vec![BackgroundKind::Dirt],
            climbing_kinds: vec![Ant],
            fog_kinds: vec![Dirt, Food, Egg, Larva, Pupa, Stone, DeadAnt],
            pickupable_kinds: vec![Dirt, Food, Egg, Larva, Pupa, Stone, DeadAnt],
            feedable_kinds: vec![Ant, Larva],
        }
    }
}

impl ColonyConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config resized to the given world
    pub fn with_world_size(width: i32, height: i32) -> Self {
        Self {
            world_width: width,
            world_height: height,
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ColonyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.world_width <= 0 || self.world_height <= 0 {
            return Err(ColonyError::InvalidConfig(format!(
                "world size must be positive, got {}x{}",
                self.world_width, self.world_height
            )));
        }

        if self.larva_end_calories <= self.larva_starting_calories {
            return Err(ColonyError::InvalidConfig(format!(
                "larva_end_calories ({}) should exceed larva_starting_calories ({})",
                self.larva_end_calories, self.larva_starting_calories
            )));
        }

        if self.ant_starting_calories > self.ant_max_calories {
            return Err(ColonyError::InvalidConfig(format!(
                "ant_starting_calories ({}) exceeds ant_max_calories ({})",
                self.ant_starting_calories, self.ant_max_calories
            )));
        }

        if self.pheromone_max_quantity <= 0
            || self.pheromone_initial_quantity > self.pheromone_max_quantity
        {
            return Err(ColonyError::InvalidConfig(
                "pheromone quantities must satisfy 0 < initial <= max".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.idle_turn_chance) {
            return Err(ColonyError::InvalidConfig(format!(
                "idle_turn_chance ({}) must be a probability",
                self.idle_turn_chance
            )));
        }

        Ok(())
    }

    #[inline]
    pub fn is_blocking(&self, kind: EntityKind) -> bool {
        self.blocking_kinds.contains(&kind)
    }
}
