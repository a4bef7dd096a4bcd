//! Guard evaluation for IF and WHILE behaviors

use rand::Rng;

use crate::core::types::{EntityId, Rect};
use crate::ecs::world::World;
use crate::entity::kind::EntityKind;
use crate::entity::tasks::{Condition, ConditionTest, HeldQuery, NeighborQuery, Place};
use crate::spatial::store::SpatialStore;

/// Resolve a place to its bounding box. Unknown names resolve to `None`.
pub fn place_rect(store: &SpatialStore, place: &Place) -> Option<Rect> {
    match place {
        Place::Named(name) => store.find_location(name).and_then(|l| l.rect()),
        Place::Area(rect) => Some(*rect),
    }
}

/// Dirt next to `id` that shares its cell with a neighbouring pheromone
pub fn marked_dirt(store: &SpatialStore, id: EntityId) -> Vec<EntityId> {
    let neighbors: Vec<_> = store
        .neighbors(id, false)
        .into_iter()
        .filter_map(|n| store.get(n))
        .collect();
    neighbors
        .iter()
        .filter(|dirt| dirt.kind == EntityKind::Dirt)
        .filter(|dirt| {
            neighbors
                .iter()
                .any(|p| p.kind == EntityKind::Pheromone && p.position == dirt.position)
        })
        .map(|dirt| dirt.id)
        .collect()
}

/// Evaluate `condition` for one ant. The `not` flag is applied last.
///
/// Only RANDOM, CALORIES and AGE consult the comparator; LOCATION, HOLDING,
/// NEIGHBORING and BLOCKED are plain membership tests.
pub fn evaluate_condition(world: &mut World, ant_id: EntityId, condition: &Condition) -> bool {
    let Some(ant) = world.store.get(ant_id) else {
        return false;
    };

    let is_true = match &condition.test {
        ConditionTest::Location(place) => match (ant.rect(), place_rect(&world.store, place)) {
            (Some(ant_rect), Some(place_rect)) => ant_rect.overlaps(&place_rect),
            _ => false,
        },
        ConditionTest::Holding(query) => {
            let held = ant.holding().and_then(|h| world.store.get(h));
            match query {
                HeldQuery::Anything => held.is_some(),
                HeldQuery::Nothing => held.is_none(),
                HeldQuery::Kind(kind) => held.map_or(false, |h| h.kind == *kind),
            }
        }
        ConditionTest::Neighboring(query) => neighboring(&world.store, ant_id, query),
        ConditionTest::Blocked => ant.ant().map_or(false, |a| a.blocked),
        ConditionTest::Random(literal) => {
            let sample: f64 = world.rng.gen();
            condition.comparator.compare(sample, *literal)
        }
        ConditionTest::Calories(literal) => condition.comparator.compare(ant.calories as f64, *literal),
        ConditionTest::Age(literal) => condition.comparator.compare(ant.age as f64, *literal),
    };

    if condition.not {
        !is_true
    } else {
        is_true
    }
}

fn neighboring(store: &SpatialStore, ant_id: EntityId, query: &NeighborQuery) -> bool {
    let neighbors = store.neighbors(ant_id, false);
    let any_kind = |kind: EntityKind| {
        neighbors
            .iter()
            .any(|n| store.get(*n).map_or(false, |e| e.kind == kind))
    };
    match query {
        NeighborQuery::Anything => !neighbors.is_empty(),
        NeighborQuery::Nothing => neighbors.is_empty(),
        NeighborQuery::Kind(kind) => any_kind(*kind),
        NeighborQuery::Trail => any_kind(EntityKind::Pheromone),
        NeighborQuery::MarkedDirt => !marked_dirt(store, ant_id).is_empty(),
        NeighborQuery::Entity(id) => neighbors.contains(id),
        NeighborQuery::Named(name) => neighbors
            .iter()
            .any(|n| store.get(*n).and_then(|e| e.name()) == Some(name.as_str())),
    }
}
