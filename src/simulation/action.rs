//! Action execution - one concrete ant action per call
//!
//! Actions never fail loudly: a target that cannot be resolved, an
//! obstruction or a missing precondition turns the action into a no-op for
//! this tick.

use std::f64::consts::FRAC_PI_2;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::{EntityId, GridPos, Rect};
use crate::ecs::world::World;
use crate::entity::factory::make_egg;
use crate::entity::kind::{AntSubType, EntityKind};
use crate::entity::lifecycle::{maybe_move_entity, pick_up_entity, put_down_entity};
use crate::entity::record::AntState;
use crate::entity::tasks::{picking_up_task, AntAction, MoveTarget, PickupTarget, Place};
use crate::simulation::condition::{marked_dirt, place_rect};
use crate::simulation::lift::gather_point;

/// Perform `action` for one ant
pub fn perform_action(world: &mut World, ant_id: EntityId, action: &AntAction) {
    drop_incomplete_lift(world, ant_id, action);

    match action {
        AntAction::Idle => idle(world, ant_id),
        AntAction::Move { target } => move_ant(world, ant_id, target, None),
        AntAction::Pickup { target } => pickup(world, ant_id, target),
        AntAction::Putdown { at } => putdown(world, ant_id, at.as_ref()),
        AntAction::Eat { food } => eat(world, ant_id, *food),
        AntAction::Feed => feed(world, ant_id),
        AntAction::Lay => lay(world, ant_id),
        AntAction::Mark | AntAction::Communicate => {}
    }
}

/// Coarse form of an action. A high-level MOVE to a place becomes a random
/// step that stays inside that place; other actions run unchanged.
pub fn perform_high_level_action(world: &mut World, ant_id: EntityId, action: &AntAction) {
    match action {
        AntAction::Move {
            target: MoveTarget::Place(place),
        } => {
            drop_incomplete_lift(world, ant_id, action);
            move_ant(world, ant_id, &MoveTarget::Random, Some(place));
        }
        other => perform_action(world, ant_id, other),
    }
}

fn ant_state_mut(world: &mut World, id: EntityId) -> Option<&mut AntState> {
    world.store.get_mut(id).and_then(|e| e.ant_mut())
}

/// An ant holding a big entity that is not fully lifted lets go before doing
/// anything other than PUTDOWN or IDLE
fn drop_incomplete_lift(world: &mut World, ant_id: EntityId, action: &AntAction) {
    if matches!(action, AntAction::Putdown { .. } | AntAction::Idle) {
        return;
    }
    let Some(held) = world
        .store
        .get(ant_id)
        .and_then(|a| a.holding())
        .and_then(|h| world.store.get(h))
    else {
        return;
    };
    if held.is_big() && held.held_by.len() < held.to_lift {
        tracing::debug!("{} drops {} to {}", ant_id, held.id, action.name());
        if let Err(e) = put_down_entity(&mut world.store, ant_id) {
            tracing::warn!("Forced drop by {} failed: {}", ant_id, e);
        }
    }
}

fn idle(world: &mut World, ant_id: EntityId) {
    let Some(position) = world.store.get(ant_id).and_then(|a| a.position) else {
        return;
    };
    let stacked = world.store.stacked_with(ant_id).into_iter().any(|other| {
        world.store.get(other).map_or(false, |e| {
            e.kind == EntityKind::Ant || world.config.is_blocking(e.kind)
        })
    });

    if stacked {
        let free = world
            .store
            .empty_neighbor_positions(ant_id, &world.config.blocking_kinds);
        if let Some(&pos) = free.choose(&mut world.rng) {
            world.store.move_entity(ant_id, pos);
        }
    } else if world.rng.gen::<f64>() < world.config.idle_turn_chance {
        let factor = if world.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        if let Some(ant) = world.store.get_mut(ant_id) {
            ant.theta += factor * FRAC_PI_2;
        }
    } else if let Some(ant) = world.store.get_mut(ant_id) {
        ant.calories += 1;
    }

    if let Some(ant) = world.store.get_mut(ant_id) {
        ant.prev_position = ant.position.or(Some(position));
    }
}

// === MOVE ===

fn move_ant(world: &mut World, ant_id: EntityId, target: &MoveTarget, constraint: Option<&Place>) {
    let Some(position) = world.store.get(ant_id).and_then(|a| a.position) else {
        return;
    };
    let destination = match target {
        MoveTarget::Trail => match trail_heading(world, position) {
            Some(theta) => Some(position.step_toward(theta)),
            None => random_destination(world, ant_id, constraint),
        },
        MoveTarget::Random => random_destination(world, ant_id, constraint),
        MoveTarget::Place(place) => place_rect(&world.store, place).map(|r| r.position),
    };
    if let Some(destination) = destination {
        step_toward(world, ant_id, position, destination);
    }
}

/// Heading of the first pheromone in the ant's cell
fn trail_heading(world: &World, position: GridPos) -> Option<f64> {
    world
        .store
        .entities_at(position)
        .find(|e| e.kind == EntityKind::Pheromone)
        .map(|p| p.theta)
}

/// Pick a free neighbouring cell. Cells outside `constraint` and the colony
/// entrance anchor are never chosen; the previous position is avoided unless
/// it is the only option left.
fn random_destination(
    world: &mut World,
    ant_id: EntityId,
    constraint: Option<&Place>,
) -> Option<GridPos> {
    let mut free = world
        .store
        .empty_neighbor_positions(ant_id, &world.config.blocking_kinds);

    if let Some(place) = constraint {
        let area = place_rect(&world.store, place)?;
        free.retain(|pos| area.contains(*pos));
    }

    let entrance = world
        .config
        .colony_entrance
        .as_deref()
        .and_then(|name| world.store.find_location(name))
        .and_then(|loc| loc.position);
    if let Some(entrance) = entrance {
        free.retain(|pos| *pos != entrance);
    }

    let prev = world.store.get(ant_id).and_then(|a| a.prev_position);
    let fresh: Vec<GridPos> = free.iter().copied().filter(|pos| Some(*pos) != prev).collect();
    let candidates = if fresh.is_empty() { free } else { fresh };
    candidates.choose(&mut world.rng).copied()
}

#[derive(Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
}

fn unit_step(axis: Axis, delta: i32) -> GridPos {
    match axis {
        Axis::X => GridPos::new(delta.signum(), 0),
        Axis::Y => GridPos::new(0, delta.signum()),
    }
}

/// One orthogonal step toward `destination`, preferring the axis with more
/// distance left and falling back to the other one when blocked
fn step_toward(world: &mut World, ant_id: EntityId, position: GridPos, destination: GridPos) {
    let delta = destination - position;
    if delta.x == 0 && delta.y == 0 {
        return;
    }

    let primary = match delta.x.abs().cmp(&delta.y.abs()) {
        std::cmp::Ordering::Greater => Axis::X,
        std::cmp::Ordering::Less => Axis::Y,
        std::cmp::Ordering::Equal => {
            if world.rng.gen_bool(0.5) {
                Axis::X
            } else {
                Axis::Y
            }
        }
    };
    let secondary = if primary == Axis::X { Axis::Y } else { Axis::X };
    let along = |axis: Axis| if axis == Axis::X { delta.x } else { delta.y };

    let mut blocker = None;
    for axis in [primary, secondary] {
        if along(axis) == 0 {
            continue;
        }
        let next = position + unit_step(axis, along(axis));
        if maybe_move_entity(&mut world.store, ant_id, next, false, &world.config.blocking_kinds) {
            if let Some(ant) = ant_state_mut(world, ant_id) {
                ant.blocked = false;
                ant.blocked_by = None;
            }
            return;
        }
        if blocker.is_none() {
            blocker = blocker_at(world, ant_id, next);
        }
    }

    if let Some(ant) = ant_state_mut(world, ant_id) {
        ant.blocked = true;
        ant.blocked_by = blocker;
    }
}

fn blocker_at(world: &World, ant_id: EntityId, pos: GridPos) -> Option<EntityId> {
    let rect = world.store.get(ant_id)?.rect_at(pos);
    world
        .store
        .blocker_in(&rect, &world.config.blocking_kinds, Some(ant_id))
}

// === HOLDING ===

fn pickup(world: &mut World, ant_id: EntityId, target: &PickupTarget) {
    let Some(ant) = world.store.get(ant_id) else {
        return;
    };
    if ant.holding().is_some() {
        return;
    }

    let target_id = match target {
        PickupTarget::Blocker => ant.ant().and_then(|a| a.blocked_by),
        PickupTarget::MarkedDirt => marked_dirt(&world.store, ant_id).choose(&mut world.rng).copied(),
        PickupTarget::Kind(kind) => {
            if !world.config.pickupable_kinds.contains(kind) {
                return;
            }
            let matching: Vec<EntityId> = world
                .store
                .neighbors(ant_id, false)
                .into_iter()
                .filter(|n| world.store.get(*n).map_or(false, |e| e.kind == *kind))
                .collect();
            matching.choose(&mut world.rng).copied()
        }
        PickupTarget::Entity(id) => world
            .store
            .neighbors(ant_id, false)
            .into_iter()
            .find(|n| n == id),
    };
    let Some(target) = target_id.and_then(|id| world.store.get(id)) else {
        return;
    };
    if target.position.is_none() {
        return;
    }
    let target_id = target.id;
    let target_kind = target.kind;
    let gather = gather_point(target);

    if let Err(e) = pick_up_entity(&mut world.store, ant_id, target_id) {
        tracing::debug!("{} could not pick up {}: {}", ant_id, target_id, e);
        return;
    }

    let is_big = world.store.get(target_id).map_or(false, |e| e.is_big());
    if let (true, Some(gather)) = (is_big, gather) {
        if let Some(ant) = ant_state_mut(world, ant_id) {
            ant.task_stack.clear();
            ant.replace_task(picking_up_task(target_kind, Rect::cell(gather)));
        }
        tracing::debug!("{} joins the lift of {} at {}", ant_id, target_id, gather);
    }
}

fn putdown(world: &mut World, ant_id: EntityId, at: Option<&Place>) {
    let Some(ant) = world.store.get(ant_id) else {
        return;
    };
    let (Some(ant_rect), Some(_)) = (ant.rect(), ant.holding()) else {
        return;
    };
    let place = match at {
        Some(place) => match place_rect(&world.store, place) {
            Some(rect) => rect,
            None => return,
        },
        None => Rect::cell(ant_rect.position),
    };
    let place_free = world
        .store
        .blocker_in(&place, &world.config.blocking_kinds, None)
        .is_none();
    if !ant_rect.overlaps(&place) || !place_free {
        return;
    }

    if let Err(e) = put_down_entity(&mut world.store, ant_id) {
        tracing::warn!("{} failed to put down: {}", ant_id, e);
        return;
    }
    step_aside(world, ant_id);
}

/// Move to the first free orthogonal neighbour, if any
fn step_aside(world: &mut World, ant_id: EntityId) {
    let free = world
        .store
        .empty_neighbor_positions(ant_id, &world.config.blocking_kinds);
    if let Some(&pos) = free.first() {
        world.store.move_entity(ant_id, pos);
    }
}

// === FOOD ===

fn eat(world: &mut World, ant_id: EntityId, food: Option<EntityId>) {
    let neighbor_food: Vec<EntityId> = world
        .store
        .neighbors(ant_id, false)
        .into_iter()
        .filter(|n| world.store.get(*n).map_or(false, |e| e.kind == EntityKind::Food))
        .collect();
    let target = match food {
        None => neighbor_food.choose(&mut world.rng).copied(),
        Some(id) => neighbor_food.into_iter().find(|n| *n == id),
    };
    let (Some(food_id), Some(ant)) = (target, world.store.get(ant_id)) else {
        return;
    };
    let ant_calories = ant.calories;
    let Some(food_calories) = world.store.get(food_id).map(|f| f.calories) else {
        return;
    };

    let eaten = world
        .config
        .ant_calories_per_eat
        .min(food_calories)
        .min(world.config.ant_max_calories - ant_calories)
        .max(0);
    if let Some(ant) = world.store.get_mut(ant_id) {
        ant.calories += eaten;
    }
    let remaining = match world.store.get_mut(food_id) {
        Some(food) => {
            food.calories -= eaten;
            food.calories
        }
        None => return,
    };
    if remaining <= 0 {
        world.remove_entity(food_id);
    }
}

fn feed(world: &mut World, ant_id: EntityId) {
    let Some(food) = world
        .store
        .get(ant_id)
        .and_then(|a| a.holding())
        .and_then(|h| world.store.get(h))
        .filter(|h| h.kind == EntityKind::Food)
    else {
        return;
    };
    let (food_id, food_calories) = (food.id, food.calories);

    let feedable: Vec<EntityId> = world
        .store
        .neighbors(ant_id, false)
        .into_iter()
        .filter(|n| {
            world
                .store
                .get(*n)
                .map_or(false, |e| world.config.feedable_kinds.contains(&e.kind))
        })
        .collect();
    let larva = feedable
        .iter()
        .copied()
        .find(|n| world.store.get(*n).map_or(false, |e| e.kind == EntityKind::Larva));
    let Some(recipient) = larva.or_else(|| feedable.choose(&mut world.rng).copied()) else {
        return;
    };

    if let Some(fed) = world.store.get_mut(recipient) {
        fed.calories += food_calories;
    }
    world.remove_entity(food_id);
    tracing::debug!("{} fed {} ({} calories)", ant_id, recipient, food_calories);
}

// === BROOD ===

fn lay(world: &mut World, ant_id: EntityId) {
    let Some(queen) = world.store.get(ant_id) else {
        return;
    };
    let Some(position) = queen.position else {
        return;
    };
    if queen.sub_type() != Some(AntSubType::Queen) {
        return;
    }
    let in_the_way = world
        .store
        .stacked_with(ant_id)
        .into_iter()
        .any(|other| world.store.get(other).map_or(false, |e| world.config.is_blocking(e.kind)));
    let dirt_below = world
        .store
        .entities_at(position.below())
        .any(|e| e.kind == EntityKind::Dirt);
    if in_the_way || !dirt_below {
        return;
    }

    match world.add_entity(make_egg(Some(position), AntSubType::Worker)) {
        Ok(egg) => tracing::debug!("{} laid {} at {}", ant_id, egg, position),
        Err(e) => {
            tracing::warn!("{} failed to lay: {}", ant_id, e);
            return;
        }
    }
    step_aside(world, ant_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ColonyConfig;
    use crate::entity::factory::{
        make_ant, make_dirt, make_food, make_larva, make_location, make_pheromone, make_stone,
    };
    use crate::entity::tasks::{PICKING_UP_PREFIX, IDLE_TASK};

    fn world() -> World {
        World::new(ColonyConfig::with_world_size(20, 20))
    }

    fn spawn_ant(world: &mut World, pos: GridPos, sub_type: AntSubType) -> EntityId {
        let config = world.config.clone();
        world.add_entity(make_ant(pos, sub_type, &config)).unwrap()
    }

    fn pos_of(world: &World, id: EntityId) -> Option<GridPos> {
        world.get(id).and_then(|e| e.position)
    }

    #[test]
    fn test_move_to_place_steps_one_cell() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        world.add_entity(make_location("Target", 1, 1, GridPos::new(9, 6))).unwrap();
        perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Place(Place::named("Target"))));
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(6, 5)));
    }

    #[test]
    fn test_move_falls_back_to_other_axis() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        world.add_entity(make_dirt(GridPos::new(6, 5))).unwrap();
        let area = Place::Area(Rect::cell(GridPos::new(9, 7)));
        perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Place(area)));
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(5, 6)));
        assert!(!world.get(ant).unwrap().ant().unwrap().blocked);
    }

    #[test]
    fn test_move_blocked_records_blocker() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let dirt = world.add_entity(make_dirt(GridPos::new(6, 5))).unwrap();
        let area = Place::Area(Rect::cell(GridPos::new(9, 5)));
        perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Place(area)));
        let state = world.get(ant).unwrap().ant().unwrap();
        assert!(state.blocked);
        assert_eq!(state.blocked_by, Some(dirt));
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(5, 5)));

        perform_action(&mut world, ant, &AntAction::pickup(PickupTarget::Blocker));
        assert_eq!(world.get(ant).unwrap().holding(), Some(dirt));
    }

    #[test]
    fn test_random_move_avoids_previous_position() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        // only (5, 6) and (4, 5) are free; (4, 5) was the previous cell
        world.add_entity(make_dirt(GridPos::new(6, 5))).unwrap();
        world.add_entity(make_dirt(GridPos::new(5, 4))).unwrap();
        world.store.get_mut(ant).unwrap().prev_position = Some(GridPos::new(4, 5));
        for _ in 0..10 {
            world.store.move_entity(ant, GridPos::new(5, 5));
            world.store.get_mut(ant).unwrap().prev_position = Some(GridPos::new(4, 5));
            perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Random));
            assert_eq!(pos_of(&world, ant), Some(GridPos::new(5, 6)));
        }
    }

    #[test]
    fn test_random_move_returns_when_only_previous_is_free() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        for pos in [GridPos::new(6, 5), GridPos::new(5, 4), GridPos::new(5, 6)] {
            world.add_entity(make_dirt(pos)).unwrap();
        }
        world.store.get_mut(ant).unwrap().prev_position = Some(GridPos::new(4, 5));
        perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Random));
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(4, 5)));
    }

    #[test]
    fn test_random_move_never_enters_colony_entrance() {
        let mut config = ColonyConfig::with_world_size(20, 20);
        config.colony_entrance = Some("Colony Entrance".into());
        let mut world = World::new(config);
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        world
            .add_entity(make_location("Colony Entrance", 1, 1, GridPos::new(5, 6)))
            .unwrap();
        for _ in 0..30 {
            world.store.move_entity(ant, GridPos::new(5, 5));
            perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Random));
            assert_ne!(pos_of(&world, ant), Some(GridPos::new(5, 6)));
        }
    }

    #[test]
    fn test_high_level_move_stays_inside_location() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        world.add_entity(make_location("Room", 2, 1, GridPos::new(5, 5))).unwrap();
        perform_high_level_action(
            &mut world,
            ant,
            &AntAction::move_to(MoveTarget::Place(Place::named("Room"))),
        );
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(6, 5)));
    }

    #[test]
    fn test_trail_follows_pheromone_heading() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        world
            .add_entity(make_pheromone(GridPos::new(5, 5), FRAC_PI_2, 10, None))
            .unwrap();
        perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Trail));
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(5, 6)));
    }

    #[test]
    fn test_trail_without_pheromone_moves_randomly() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        for pos in [GridPos::new(6, 5), GridPos::new(5, 4), GridPos::new(5, 6)] {
            world.add_entity(make_dirt(pos)).unwrap();
        }
        perform_action(&mut world, ant, &AntAction::move_to(MoveTarget::Trail));
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(4, 5)));
    }

    #[test]
    fn test_putdown_at_named_location() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        world.add_entity(make_location("Pile", 2, 2, GridPos::new(5, 5))).unwrap();
        world.add_entity(make_location("Elsewhere", 1, 1, GridPos::new(12, 12))).unwrap();
        let food = world.add_entity(make_food(GridPos::new(5, 6), 10, "Seed")).unwrap();
        perform_action(&mut world, ant, &AntAction::pickup(PickupTarget::Entity(food)));

        // the ant is not standing on "Elsewhere"
        perform_action(
            &mut world,
            ant,
            &AntAction::Putdown {
                at: Some(Place::named("Elsewhere")),
            },
        );
        assert_eq!(world.get(ant).unwrap().holding(), Some(food));

        perform_action(
            &mut world,
            ant,
            &AntAction::Putdown {
                at: Some(Place::named("Pile")),
            },
        );
        assert_eq!(world.get(ant).unwrap().holding(), None);
        assert_eq!(pos_of(&world, food), Some(GridPos::new(5, 5)));
        assert!(world.get(food).unwrap().held_by.is_empty());
    }

    #[test]
    fn test_putdown_onto_obstruction_is_refused() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let food = world.add_entity(make_food(GridPos::new(5, 6), 10, "Seed")).unwrap();
        perform_action(&mut world, ant, &AntAction::pickup(PickupTarget::Entity(food)));
        world.add_entity(make_dirt(GridPos::new(5, 5))).unwrap();

        perform_action(&mut world, ant, &AntAction::Putdown { at: None });
        assert_eq!(world.get(ant).unwrap().holding(), Some(food));
        assert_eq!(pos_of(&world, food), None);
        assert_eq!(pos_of(&world, ant), Some(GridPos::new(5, 5)));
    }

    #[test]
    fn test_putdown_requires_free_cell_and_steps_aside() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let food = world.add_entity(make_food(GridPos::new(5, 6), 10, "Seed")).unwrap();
        perform_action(&mut world, ant, &AntAction::pickup(PickupTarget::Kind(EntityKind::Food)));
        assert_eq!(world.get(ant).unwrap().holding(), Some(food));

        perform_action(&mut world, ant, &AntAction::Putdown { at: None });
        assert_eq!(pos_of(&world, food), Some(GridPos::new(5, 5)));
        assert_ne!(pos_of(&world, ant), Some(GridPos::new(5, 5)));
        assert_eq!(world.get(ant).unwrap().holding(), None);
        assert!(world.store.check_consistency().is_ok());
    }

    #[test]
    fn test_eat_transfers_capped_calories() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let food = world.add_entity(make_food(GridPos::new(6, 5), 150, "Seed")).unwrap();
        world.store.get_mut(ant).unwrap().calories = 100;

        perform_action(&mut world, ant, &AntAction::Eat { food: None });
        assert_eq!(world.get(ant).unwrap().calories, 200);
        assert_eq!(world.get(food).unwrap().calories, 50);

        perform_action(&mut world, ant, &AntAction::Eat { food: Some(food) });
        assert_eq!(world.get(ant).unwrap().calories, 250);
        assert!(world.get(food).is_none());
    }

    #[test]
    fn test_feed_prefers_larva() {
        let mut world = world();
        let config = world.config.clone();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let other = spawn_ant(&mut world, GridPos::new(4, 5), AntSubType::Worker);
        let larva = world
            .add_entity(make_larva(Some(GridPos::new(6, 5)), AntSubType::Worker, &config))
            .unwrap();
        let food = world.add_entity(make_food(GridPos::new(5, 6), 70, "Seed")).unwrap();
        perform_action(&mut world, ant, &AntAction::pickup(PickupTarget::Entity(food)));

        perform_action(&mut world, ant, &AntAction::Feed);
        assert_eq!(world.get(larva).unwrap().calories, config.larva_starting_calories + 70);
        assert_eq!(world.get(other).unwrap().calories, config.ant_starting_calories);
        assert!(world.get(food).is_none());
        assert_eq!(world.get(ant).unwrap().holding(), None);
    }

    #[test]
    fn test_lay_requires_queen_on_dirt() {
        let mut world = world();
        let worker = spawn_ant(&mut world, GridPos::new(3, 5), AntSubType::Worker);
        let queen = spawn_ant(&mut world, GridPos::new(8, 5), AntSubType::Queen);
        world.add_entity(make_dirt(GridPos::new(3, 4))).unwrap();
        world.add_entity(make_dirt(GridPos::new(8, 4))).unwrap();

        perform_action(&mut world, worker, &AntAction::Lay);
        assert_eq!(world.store.count_of(EntityKind::Egg), 0);

        perform_action(&mut world, queen, &AntAction::Lay);
        assert_eq!(world.store.count_of(EntityKind::Egg), 1);
        let egg = world.store.ids_of(EntityKind::Egg)[0];
        assert_eq!(pos_of(&world, egg), Some(GridPos::new(8, 5)));
        assert_ne!(pos_of(&world, queen), Some(GridPos::new(8, 5)));
    }

    #[test]
    fn test_big_pickup_replaces_task_and_drops_on_other_action() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let stone = world.add_entity(make_stone(GridPos::new(6, 5), 2)).unwrap();

        perform_action(&mut world, ant, &AntAction::pickup(PickupTarget::Entity(stone)));
        let state = world.get(ant).unwrap().ant().unwrap();
        assert_eq!(state.holding, Some(stone));
        assert!(state.task_name().unwrap().starts_with(PICKING_UP_PREFIX));
        assert_eq!(state.task_epoch, 1);

        // only one of two holders: anything but IDLE/PUTDOWN lets go
        perform_action(&mut world, ant, &AntAction::Idle);
        assert_eq!(world.get(ant).unwrap().holding(), Some(stone));
        perform_action(&mut world, ant, &AntAction::Eat { food: None });
        assert_eq!(world.get(ant).unwrap().holding(), None);
        assert!(world.get(stone).unwrap().held_by.is_empty());
        assert_ne!(world.get(ant).unwrap().ant().unwrap().task_name(), Some(IDLE_TASK));
    }

    #[test]
    fn test_mark_and_communicate_do_nothing() {
        let mut world = world();
        let ant = spawn_ant(&mut world, GridPos::new(5, 5), AntSubType::Worker);
        let before = world.get(ant).cloned();
        perform_action(&mut world, ant, &AntAction::Mark);
        perform_action(&mut world, ant, &AntAction::Communicate);
        assert_eq!(world.get(ant).cloned(), before);
    }
}
