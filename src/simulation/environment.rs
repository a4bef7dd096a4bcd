//! World-level passes: pheromone decay, gravity and fog of war, plus trail
//! laying for the editor

use crate::core::error::{ColonyError, Result};
use crate::core::types::{EdgeId, EntityId, GridPos};
use crate::ecs::world::World;
use crate::entity::factory::make_pheromone;
use crate::entity::kind::EntityKind;
use crate::simulation::tick::TickEvent;

/// Pheromones under an ant are reinforced up to the cap; the rest decay and
/// are removed once empty
pub fn update_pheromones(world: &mut World, events: &mut Vec<TickEvent>) {
    let max = world.config.pheromone_max_quantity;
    for id in world.store.ids_of(EntityKind::Pheromone).to_vec() {
        let Some(position) = world.store.get(id).and_then(|p| p.position) else {
            continue;
        };
        let ants_here = world
            .store
            .entities_at(position)
            .any(|e| e.kind == EntityKind::Ant);
        let Some(pheromone) = world.store.get_mut(id).and_then(|e| e.pheromone_mut()) else {
            continue;
        };
        let quantity = if ants_here {
            pheromone.quantity + 1
        } else {
            pheromone.quantity - 1
        };
        pheromone.quantity = quantity.clamp(0, max);
        if pheromone.quantity <= 0 {
            world.remove_entity(id);
            events.push(TickEvent::PheromoneEvaporated { id });
        }
    }
}

/// Drop every unsupported falling entity by one cell
pub fn apply_gravity(world: &mut World) {
    let config = &world.config;
    for kind in config.falling_kinds.iter().copied() {
        for id in world.store.ids_of(kind).to_vec() {
            let Some(entity) = world.store.get(id) else {
                continue;
            };
            let Some(position) = entity.position else {
                continue;
            };
            if entity.lifted {
                continue;
            }
            let beneath = position.below();
            let stops_fall = |other: EntityId| {
                other != id
                    && world
                        .store
                        .get(other)
                        .map_or(false, |e| config.stop_falling_kinds.contains(&e.kind))
            };

            let resting = world
                .store
                .fast_collides_with(&entity.rect_at(beneath))
                .into_iter()
                .any(stops_fall);

            let mut supported = false;
            if config.supported_kinds.contains(&kind) {
                supported = world.store.stacked_with(id).into_iter().any(|other| {
                    world
                        .store
                        .get(other)
                        .and_then(|e| e.background())
                        .map_or(false, |b| config.supporting_backgrounds.contains(&b))
                });
                if !supported && config.climbing_kinds.contains(&kind) {
                    supported = world.store.neighbors(id, true).into_iter().any(stops_fall);
                }
            }

            if !supported && !resting && world.store.inside_world(beneath) {
                world.store.move_entity(id, beneath);
            }
        }
    }
}

/// Recompute fog of war from every ant's vision radius
pub fn update_visibility(world: &mut World) {
    let mut previously_visible = Vec::new();
    for kind in world.config.fog_kinds.clone() {
        for id in world.store.ids_of(kind).to_vec() {
            let Some(entity) = world.store.get_mut(id) else {
                continue;
            };
            if entity.position.is_none() {
                entity.visible = true;
                continue;
            }
            if entity.visible {
                previously_visible.push(id);
                entity.visible = false;
            }
        }
    }

    let radius = world.config.ant_vision_radius;
    let mut revealed = Vec::new();
    for ant in world.store.ids_of(EntityKind::Ant) {
        if let Some(pos) = world.store.get(*ant).and_then(|a| a.position) {
            revealed.extend(world.store.entities_in_radius(pos, radius));
        }
    }
    for id in revealed {
        if let Some(entity) = world.store.get_mut(id) {
            entity.visible = true;
        }
    }

    for id in previously_visible {
        if let Some(entity) = world.store.get_mut(id) {
            if !entity.visible {
                entity.last_seen_pos = entity.position;
            }
        }
    }
}

/// Lay pheromones along `edge` from `from` to `to`, one cell at a time along
/// the longer axis. Each marker points at the next one. A marker of the same
/// edge already at `from` is reused. Returns the newly laid markers.
pub fn mark_trail(world: &mut World, edge: EdgeId, from: GridPos, to: GridPos) -> Result<Vec<EntityId>> {
    if !world.edges.contains_key(&edge) {
        return Err(ColonyError::EdgeNotFound(edge));
    }
    for pos in [from, to] {
        if !world.store.inside_world(pos) {
            return Err(ColonyError::OutOfWorld(pos));
        }
    }
    let quantity = world.config.pheromone_initial_quantity;
    let mut laid = Vec::new();

    let existing = world
        .store
        .entities_at(from)
        .find(|e| e.pheromone().map_or(false, |p| p.edge == Some(edge)))
        .map(|e| e.id);
    let mut prev_id = match existing {
        Some(id) => id,
        None => {
            let id = world.add_entity(make_pheromone(from, 0.0, quantity, Some(edge)))?;
            laid.push(id);
            id
        }
    };

    let mut cursor = from;
    while cursor != to {
        let prev_pos = cursor;
        let diff = to - cursor;
        if diff.x.abs() > diff.y.abs() {
            cursor.x += diff.x.signum();
        } else {
            cursor.y += diff.y.signum();
        }
        let theta = (cursor - prev_pos).theta();
        let id = world.add_entity(make_pheromone(cursor, theta, quantity, Some(edge)))?;
        if let Some(prev) = world.store.get_mut(prev_id) {
            prev.theta = theta;
        }
        prev_id = id;
        laid.push(id);
    }

    world.editor.prev_pheromone = Some(prev_id);
    Ok(laid)
}
