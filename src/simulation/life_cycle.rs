//! Brood development: egg -> larva -> pupa -> ant

use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::factory::{make_hatched_ant, make_larva, make_pupa};
use crate::entity::kind::{AntSubType, EntityKind};
use crate::entity::lifecycle::change_entity_type;
use crate::entity::record::Entity;
use crate::simulation::tick::TickEvent;

pub fn update_life_cycles(world: &mut World, events: &mut Vec<TickEvent>) {
    update_eggs(world, events);
    update_larvae(world, events);
    update_pupae(world, events);
}

fn update_eggs(world: &mut World, events: &mut Vec<TickEvent>) {
    for id in world.store.ids_of(EntityKind::Egg).to_vec() {
        let Some(egg) = world.store.get_mut(id) else {
            continue;
        };
        egg.age += 1;
        if egg.age > world.config.egg_hatch_age {
            let larva = make_larva(egg.position, brood_sub_type(egg), &world.config);
            replace_stage(world, id, larva, events);
        }
    }
}

fn update_larvae(world: &mut World, events: &mut Vec<TickEvent>) {
    for id in world.store.ids_of(EntityKind::Larva).to_vec() {
        let Some(larva) = world.store.get_mut(id) else {
            continue;
        };
        larva.age += 1;
        if !larva.alive {
            continue;
        }
        larva.calories -= 1;
        if larva.calories <= 0 {
            larva.alive = false;
            tracing::debug!("Larva {} starved", id);
            events.push(TickEvent::LarvaStarved { id });
            continue;
        }
        if larva.calories >= world.config.larva_end_calories {
            let pupa = make_pupa(larva.position, brood_sub_type(larva));
            replace_stage(world, id, pupa, events);
        }
    }
}

fn update_pupae(world: &mut World, events: &mut Vec<TickEvent>) {
    for id in world.store.ids_of(EntityKind::Pupa).to_vec() {
        let Some(pupa) = world.store.get_mut(id) else {
            continue;
        };
        pupa.age += 1;
        if pupa.age > world.config.pupa_hatch_age {
            let ant = make_hatched_ant(pupa.position, brood_sub_type(pupa), &world.config);
            replace_stage(world, id, ant, events);
        }
    }
}

fn brood_sub_type(entity: &Entity) -> AntSubType {
    entity.sub_type().unwrap_or_default()
}

/// Swap in the next stage's record under the same id. Holding relations and
/// fog state carry over; everything else starts fresh.
fn replace_stage(world: &mut World, id: EntityId, mut next: Entity, events: &mut Vec<TickEvent>) {
    let Some(current) = world.store.get(id) else {
        return;
    };
    let from = current.kind;
    let to = next.kind;
    next.held_by = current.held_by.clone();
    next.lifted = current.lifted;
    next.visible = current.visible;
    next.last_seen_pos = current.last_seen_pos;
    next.prev_position = current.prev_position;
    next.kind = from;

    if let Err(e) = world.store.replace_entity(id, next) {
        tracing::error!("Could not advance {} from {}: {}", id, from, e);
        return;
    }
    if let Err(e) = change_entity_type(&mut world.store, id, from, to) {
        tracing::error!("Could not retype {}: {}", id, e);
        return;
    }
    tracing::debug!("{} developed {} -> {}", id, from, to);
    events.push(TickEvent::StageChanged { id, from, to });
}
