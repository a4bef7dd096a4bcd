//! Factory functions for every entity type
//!
//! Factories return unplaced records with `EntityId::UNASSIGNED`; the store
//! assigns the id when the entity is added.

use crate::core::config::ColonyConfig;
use crate::core::types::{EdgeId, GridPos};
use crate::entity::kind::{AntSubType, BackgroundKind, EntityKind};
use crate::entity::record::{AntState, Entity, LocationState, PheromoneState, Traits};
use crate::entity::tasks::idle_task;

pub fn make_ant(position: GridPos, sub_type: AntSubType, config: &ColonyConfig) -> Entity {
    make_hatched_ant(Some(position), sub_type, config)
}

pub fn make_dirt(position: GridPos) -> Entity {
    Entity::new(EntityKind::Dirt, Some(position), Traits::Plain)
}

pub fn make_food(position: GridPos, calories: i64, name: impl Into<String>) -> Entity {
    let mut food = Entity::new(EntityKind::Food, Some(position), Traits::Food { name: name.into() });
    food.calories = calories;
    food
}

pub fn make_egg(position: Option<GridPos>, sub_type: AntSubType) -> Entity {
    Entity::new(EntityKind::Egg, position, Traits::Brood { sub_type })
}

pub fn make_larva(position: Option<GridPos>, sub_type: AntSubType, config: &ColonyConfig) -> Entity {
    let mut larva = Entity::new(EntityKind::Larva, position, Traits::Brood { sub_type });
    larva.calories = config.larva_starting_calories;
    larva
}

pub fn make_pupa(position: Option<GridPos>, sub_type: AntSubType) -> Entity {
    Entity::new(EntityKind::Pupa, position, Traits::Brood { sub_type })
}

/// Ant hatched from a pupa; may start unplaced if the pupa was being carried
pub fn make_hatched_ant(
    position: Option<GridPos>,
    sub_type: AntSubType,
    config: &ColonyConfig,
) -> Entity {
    let mut ant = Entity::new(
        EntityKind::Ant,
        position,
        Traits::Ant(AntState::new(sub_type, Some(idle_task()))),
    );
    ant.calories = config.ant_starting_calories;
    ant
}

pub fn make_location(name: impl Into<String>, width: i32, height: i32, position: GridPos) -> Entity {
    let mut location = Entity::new(
        EntityKind::Location,
        Some(position),
        Traits::Location(LocationState {
            name: name.into(),
            incoming_edges: Vec::new(),
            outgoing_edges: Vec::new(),
        }),
    );
    location.width = width;
    location.height = height;
    location
}

pub fn make_pheromone(position: GridPos, theta: f64, quantity: i64, edge: Option<EdgeId>) -> Entity {
    let mut pheromone = Entity::new(
        EntityKind::Pheromone,
        Some(position),
        Traits::Pheromone(PheromoneState {
            edge,
            quantity,
        }),
    );
    pheromone.theta = theta;
    pheromone
}

/// A stone; `to_lift` above one makes it a group lift
pub fn make_stone(position: GridPos, to_lift: usize) -> Entity {
    let mut stone = Entity::new(EntityKind::Stone, Some(position), Traits::Plain);
    stone.to_lift = to_lift.max(1);
    stone
}

pub fn make_obelisk(position: GridPos, width: i32, height: i32) -> Entity {
    let mut obelisk = Entity::new(EntityKind::Obelisk, Some(position), Traits::Plain);
    obelisk.width = width;
    obelisk.height = height;
    obelisk.to_lift = (width * height).max(1) as usize;
    obelisk
}

pub fn make_background(position: GridPos, sub_type: BackgroundKind) -> Entity {
    Entity::new(EntityKind::Background, Some(position), Traits::Background { sub_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ant_starts_idle_with_calories() {
        let config = ColonyConfig::default();
        let ant = make_ant(GridPos::new(2, 3), AntSubType::Queen, &config);
        assert_eq!(ant.kind, EntityKind::Ant);
        assert_eq!(ant.calories, config.ant_starting_calories);
        assert_eq!(ant.sub_type(), Some(AntSubType::Queen));
        assert_eq!(ant.ant().and_then(|a| a.task_name()), Some("Idle"));
    }

    #[test]
    fn test_brood_keeps_sub_type() {
        let config = ColonyConfig::default();
        let larva = make_larva(Some(GridPos::new(0, 0)), AntSubType::Queen, &config);
        assert_eq!(larva.calories, config.larva_starting_calories);
        assert_eq!(larva.sub_type(), Some(AntSubType::Queen));
    }

    #[test]
    fn test_obelisk_is_big() {
        let obelisk = make_obelisk(GridPos::new(0, 0), 2, 3);
        assert!(obelisk.is_big());
        assert_eq!(obelisk.rect().map(|r| r.max_y()), Some(2));
    }
}
