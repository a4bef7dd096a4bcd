//! Tick system - orchestrates simulation updates
//!
//! One call to [`run_tick`] is one synchronous pass over the world. The
//! engine owns no timers; the host decides when to call it.

use serde::Serialize;

use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::kind::EntityKind;
use crate::entity::lifecycle::put_down_entity;
use crate::simulation::behavior::perform_task;
use crate::simulation::environment::{apply_gravity, update_pheromones, update_visibility};
use crate::simulation::life_cycle::update_life_cycles;
use crate::simulation::lift::resolve_lifts;

/// Events generated during a tick
///
/// Returned by `run_tick` so hosts can log what happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TickEvent {
    /// An ant ran out of calories
    AntStarved { id: EntityId },
    LarvaStarved { id: EntityId },
    /// Egg, larva or pupa moved to its next stage under the same id
    StageChanged {
        id: EntityId,
        from: EntityKind,
        to: EntityKind,
    },
    PheromoneEvaporated { id: EntityId },
    /// A big entity got all its holders and was raised
    EntityLifted { id: EntityId, holders: usize },
}

/// Run a single simulation tick
///
/// Order matters:
/// 1. Resolve cooperative lifts (so reassigned tasks run this tick)
/// 2. Ants: age, one task step, calorie decay, starvation
/// 3. Brood life cycles
/// 4. Pheromone reinforcement and decay
/// 5. Gravity
/// 6. Fog of war
/// 7. Advance the tick counter
pub fn run_tick(world: &mut World) -> Vec<TickEvent> {
    let mut events = Vec::new();

    resolve_lifts(world, &mut events);
    update_ants(world, &mut events);
    update_life_cycles(world, &mut events);
    update_pheromones(world, &mut events);
    apply_gravity(world);
    update_visibility(world);

    world.time += 1;
    events
}

fn update_ants(world: &mut World, events: &mut Vec<TickEvent>) {
    for id in world.ant_ids() {
        match world.store.get_mut(id) {
            Some(ant) if ant.alive => ant.age += 1,
            _ => continue,
        }

        perform_task(world, id);

        let Some(ant) = world.store.get_mut(id) else {
            continue;
        };
        ant.calories -= 1;
        if ant.calories > 0 {
            continue;
        }
        ant.alive = false;
        let holding = ant.holding();
        tracing::debug!("Ant {} starved at tick {}", id, world.time);
        events.push(TickEvent::AntStarved { id });
        if holding.is_some() {
            if let Err(e) = put_down_entity(&mut world.store, id) {
                tracing::warn!("Starved ant {} could not drop its load: {}", id, e);
            }
        }
    }
}
