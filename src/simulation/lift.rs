//! Cooperative lifting of big entities
//!
//! A big entity (`to_lift > 1`) stays on the grid while ants attach to it.
//! Once enough holders are attached it is raised one cell, every holder is
//! handed a synthetic "Picking up ..." task that gathers it under the load,
//! and after the group has gathered the entity follows the lead holder.

use crate::core::types::{EntityId, GridPos, Rect};
use crate::ecs::world::World;
use crate::entity::kind::EntityKind;
use crate::entity::lifecycle::maybe_move_entity;
use crate::entity::record::Entity;
use crate::entity::tasks::{picking_up_task, PICKING_UP_PREFIX};
use crate::simulation::tick::TickEvent;

/// Rounds halves up, matching how gather points have always been placed
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Cell where holders of `entity` gather: just right of its horizontal
/// centre, on the row the holders stand on
pub fn gather_point(entity: &Entity) -> Option<GridPos> {
    let pos = entity.position?;
    let x = round_half_up(pos.x as f64 + entity.width as f64 / 2.0);
    let y = if entity.lifted { pos.y - 1 } else { pos.y };
    Some(GridPos::new(x, y))
}

/// Big entities currently held by a living ant, in ant order
fn held_big_entities(world: &World) -> Vec<EntityId> {
    let mut held = Vec::new();
    for id in world.store.ids_of(EntityKind::Ant) {
        let Some(ant) = world.store.get(*id).filter(|a| a.alive) else {
            continue;
        };
        if let Some(h) = ant.holding() {
            if !held.contains(&h) {
                held.push(h);
            }
        }
    }
    held.retain(|h| world.store.get(*h).map_or(false, |e| e.is_big()));
    held
}

pub fn resolve_lifts(world: &mut World, events: &mut Vec<TickEvent>) {
    for big_id in held_big_entities(world) {
        let Some(big) = world.store.get(big_id) else {
            continue;
        };
        if !big.ready_to_lift() {
            continue;
        }
        if big.lifted {
            follow_lead_holder(world, big_id);
        } else {
            lift(world, big_id, events);
        }
    }
}

fn lift(world: &mut World, big_id: EntityId, events: &mut Vec<TickEvent>) {
    let Some(big) = world.store.get(big_id) else {
        return;
    };
    let (Some(pos), Some(gather)) = (big.position, gather_point(big)) else {
        return;
    };
    let kind = big.kind;
    let holders = big.held_by.clone();

    let did_move = maybe_move_entity(
        &mut world.store,
        big_id,
        pos.above(),
        true,
        &world.config.blocking_kinds,
    );
    if let Some(big) = world.store.get_mut(big_id) {
        big.lifted = did_move;
    }
    if !did_move {
        return;
    }

    for (i, holder) in holders.iter().enumerate() {
        if let Some(ant) = world.store.get_mut(*holder).and_then(|e| e.ant_mut()) {
            ant.lead_holder = i == 0;
            ant.task_stack.clear();
            ant.replace_task(picking_up_task(kind, Rect::cell(gather)));
        }
    }
    tracing::debug!("{} lifted by {} holders", big_id, holders.len());
    events.push(TickEvent::EntityLifted {
        id: big_id,
        holders: holders.len(),
    });
}

/// Once no holder is still gathering, keep the load centred one row above
/// the lead holder, one cell per tick
fn follow_lead_holder(world: &mut World, big_id: EntityId) {
    let Some(big) = world.store.get(big_id) else {
        return;
    };
    let Some(pos) = big.position else {
        return;
    };
    let gathering = big.held_by.iter().any(|h| {
        world
            .store
            .get(*h)
            .and_then(|a| a.ant())
            .and_then(|a| a.task_name())
            .map_or(false, |name| name.starts_with(PICKING_UP_PREFIX))
    });
    if gathering {
        return;
    }
    let lead = big
        .held_by
        .iter()
        .copied()
        .find(|h| world.store.get(*h).and_then(|a| a.ant()).map_or(false, |a| a.lead_holder))
        .or_else(|| big.held_by.first().copied());
    let Some(lead_pos) = lead.and_then(|l| world.store.get(l)).and_then(|l| l.position) else {
        return;
    };

    let half_width = round_half_up(big.width as f64 / 2.0);
    let desired = GridPos::new(lead_pos.x - half_width, lead_pos.y + 1);
    let delta = desired - pos;
    let step = if delta.x == 0 && delta.y == 0 {
        return;
    } else if delta.x.abs() >= delta.y.abs() {
        GridPos::new(delta.x.signum(), 0)
    } else {
        GridPos::new(0, delta.y.signum())
    };
    maybe_move_entity(
        &mut world.store,
        big_id,
        pos + step,
        false,
        &world.config.blocking_kinds,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ColonyConfig;
    use crate::entity::factory::{make_ant, make_stone};
    use crate::entity::kind::AntSubType;
    use crate::entity::lifecycle::pick_up_entity;
    use crate::entity::tasks::HOLDING_AND_IDLE_TASK;

    #[test]
    fn test_gather_point_rounds_half_up() {
        let mut stone = make_stone(GridPos::new(4, 2), 2);
        assert_eq!(gather_point(&stone), Some(GridPos::new(5, 2)));
        stone.width = 2;
        stone.lifted = true;
        assert_eq!(gather_point(&stone), Some(GridPos::new(5, 1)));
    }

    #[test]
    fn test_lift_waits_for_enough_holders() {
        let mut world = World::new(ColonyConfig::with_world_size(20, 20));
        let config = world.config.clone();
        let a = world
            .add_entity(make_ant(GridPos::new(5, 5), AntSubType::Worker, &config))
            .unwrap();
        let b = world
            .add_entity(make_ant(GridPos::new(7, 5), AntSubType::Worker, &config))
            .unwrap();
        let stone = world.add_entity(make_stone(GridPos::new(6, 5), 2)).unwrap();
        let mut events = Vec::new();

        pick_up_entity(&mut world.store, a, stone).unwrap();
        resolve_lifts(&mut world, &mut events);
        assert!(!world.get(stone).unwrap().lifted);
        assert!(events.is_empty());

        pick_up_entity(&mut world.store, b, stone).unwrap();
        resolve_lifts(&mut world, &mut events);
        let lifted = world.get(stone).unwrap();
        assert!(lifted.lifted);
        assert_eq!(lifted.position, Some(GridPos::new(6, 6)));
        assert_eq!(events, vec![TickEvent::EntityLifted { id: stone, holders: 2 }]);

        let lead = world.get(a).unwrap().ant().unwrap();
        let other = world.get(b).unwrap().ant().unwrap();
        assert!(lead.lead_holder && !other.lead_holder);
        assert_eq!(lead.task_name(), Some("Picking up STONE"));
        assert_eq!(other.task_name(), Some("Picking up STONE"));
        assert_ne!(other.task_name(), Some(HOLDING_AND_IDLE_TASK));
    }

    #[test]
    fn test_lifted_entity_follows_lead_once_gathered() {
        let mut world = World::new(ColonyConfig::with_world_size(20, 20));
        let config = world.config.clone();
        let a = world
            .add_entity(make_ant(GridPos::new(7, 5), AntSubType::Worker, &config))
            .unwrap();
        let b = world
            .add_entity(make_ant(GridPos::new(7, 4), AntSubType::Worker, &config))
            .unwrap();
        let stone = world.add_entity(make_stone(GridPos::new(6, 5), 2)).unwrap();
        pick_up_entity(&mut world.store, a, stone).unwrap();
        pick_up_entity(&mut world.store, b, stone).unwrap();
        let mut events = Vec::new();
        resolve_lifts(&mut world, &mut events);
        assert_eq!(world.get(stone).unwrap().position, Some(GridPos::new(6, 6)));

        // holders still gathering: the load waits
        world.store.move_entity(a, GridPos::new(9, 5));
        resolve_lifts(&mut world, &mut events);
        assert_eq!(world.get(stone).unwrap().position, Some(GridPos::new(6, 6)));

        for holder in [a, b] {
            let ant = world.store.get_mut(holder).unwrap().ant_mut().unwrap();
            ant.replace_task(crate::entity::tasks::holding_and_idle_task());
        }
        resolve_lifts(&mut world, &mut events);
        assert_eq!(world.get(stone).unwrap().position, Some(GridPos::new(7, 6)));
        resolve_lifts(&mut world, &mut events);
        assert_eq!(world.get(stone).unwrap().position, Some(GridPos::new(8, 6)));
        resolve_lifts(&mut world, &mut events);
        assert_eq!(world.get(stone).unwrap().position, Some(GridPos::new(8, 6)));
    }
}
