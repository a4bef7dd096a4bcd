//! Demo world used by the binaries, benchmarks and scenario tests

use rand::Rng;

use crate::core::config::ColonyConfig;
use crate::core::error::{ColonyError, Result};
use crate::core::types::GridPos;
use crate::ecs::world::World;
use crate::entity::factory::{
    make_ant, make_background, make_dirt, make_food, make_location, make_obelisk, make_stone,
};
use crate::entity::kind::{AntSubType, BackgroundKind};
use crate::entity::tasks::COLONY_ENTRANCE;

/// Smallest world the demo layout fits in
pub const DEMO_MIN_WIDTH: i32 = 50;
pub const DEMO_MIN_HEIGHT: i32 = 50;

const GROUND_FRACTION: f64 = 0.35;
const FOOD_CRUMBS: usize = 15;
const CRUMB_CALORIES: i64 = 1000;

/// Build the demo colony: a dirt layer under open sky, the colony entrance
/// and a second location, a queen with six workers, an obelisk, a stone
/// that needs two ants, and food crumbs scattered high in the sky.
pub fn seed_demo_world(mut config: ColonyConfig) -> Result<World> {
    if config.world_width < DEMO_MIN_WIDTH || config.world_height < DEMO_MIN_HEIGHT {
        return Err(ColonyError::InvalidConfig(format!(
            "demo world needs at least {}x{} cells",
            DEMO_MIN_WIDTH, DEMO_MIN_HEIGHT
        )));
    }
    config
        .colony_entrance
        .get_or_insert_with(|| COLONY_ENTRANCE.to_string());
    let entrance = config.colony_entrance.clone().unwrap_or_default();
    let (width, height) = (config.world_width, config.world_height);
    let mut world = World::new(config);

    world.add_entity(make_location(entrance, 5, 5, GridPos::new(25, 29)))?;
    world.add_entity(make_location("Location Two", 5, 5, GridPos::new(40, 20)))?;

    let ground = (height as f64 * GROUND_FRACTION) as i32;
    for x in 0..width {
        for y in 0..height {
            let layer = if y < ground {
                BackgroundKind::Dirt
            } else {
                BackgroundKind::Sky
            };
            world.add_entity(make_background(GridPos::new(x, y), layer))?;
        }
        world.add_entity(make_dirt(GridPos::new(x, 0)))?;
    }

    let config = world.config.clone();
    world.add_entity(make_ant(GridPos::new(25, 30), AntSubType::Queen, &config))?;
    for x in [18, 28, 30, 32, 33, 35] {
        world.add_entity(make_ant(GridPos::new(x, 30), AntSubType::Worker, &config))?;
    }

    world.add_entity(make_obelisk(GridPos::new(20, 40), 4, 8))?;
    world.add_entity(make_stone(GridPos::new(35, 35), 2))?;

    let sky_floor = (height as f64 * 0.6).ceil() as i32 + 1;
    for _ in 0..FOOD_CRUMBS {
        let position = GridPos::new(
            world.rng.gen_range(0..width),
            world.rng.gen_range(sky_floor..height),
        );
        world.add_entity(make_food(position, CRUMB_CALORIES, "Crumb"))?;
    }

    tracing::info!(
        "Seeded demo world: {} entities, {} ants",
        world.store.len(),
        world.living_ant_count()
    );
    Ok(world)
}
