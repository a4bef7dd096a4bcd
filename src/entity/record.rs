//! Entity records stored in the spatial store

use crate::core::types::{EdgeId, EntityId, GridPos, Rect};
use crate::entity::kind::{AntSubType, BackgroundKind, EntityKind};
use crate::entity::tasks::{Task, TaskFrame};
use serde::{Deserialize, Serialize};

/// Ant-only state: what it holds and where it is in its task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntState {
    pub sub_type: AntSubType,
    pub holding: Option<EntityId>,
    /// First holder of a big entity leads the group move
    pub lead_holder: bool,
    /// Last move attempt was stopped by an obstruction
    pub blocked: bool,
    pub blocked_by: Option<EntityId>,
    pub task: Option<Task>,
    pub task_index: usize,
    pub task_stack: Vec<TaskFrame>,
    /// Bumped whenever the active task is replaced
    pub task_epoch: u64,
}

impl AntState {
    pub fn new(sub_type: AntSubType, task: Option<Task>) -> Self {
        Self {
            sub_type,
            holding: None,
            lead_holder: false,
            blocked: false,
            blocked_by: None,
            task,
            task_index: 0,
            task_stack: Vec::new(),
            task_epoch: 0,
        }
    }

    /// Replace the active task and start it from the top
    pub fn replace_task(&mut self, task: Task) {
        self.task = Some(task);
        self.task_index = 0;
        self.task_epoch += 1;
    }

    pub fn task_name(&self) -> Option<&str> {
        self.task.as_ref().map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationState {
    pub name: String,
    pub incoming_edges: Vec<EdgeId>,
    pub outgoing_edges: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PheromoneState {
    pub edge: Option<EdgeId>,
    pub quantity: i64,
}

/// Type-specific extension of an entity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Traits {
    Plain,
    Ant(AntState),
    /// Egg, larva or pupa; remembers what it will hatch into
    Brood { sub_type: AntSubType },
    Food { name: String },
    Location(LocationState),
    Pheromone(PheromoneState),
    Background { sub_type: BackgroundKind },
}

/// A single entity. Relations to other entities are held as ids and
/// resolved against the store on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Option<GridPos>,
    pub prev_position: Option<GridPos>,
    pub width: i32,
    pub height: i32,
    pub age: u64,
    pub calories: i64,
    pub alive: bool,
    pub held_by: Vec<EntityId>,
    /// Number of simultaneous holders needed to move this entity
    pub to_lift: usize,
    pub lifted: bool,
    pub visible: bool,
    pub last_seen_pos: Option<GridPos>,
    pub theta: f64,
    pub traits: Traits,
}

impl Entity {
    pub fn new(kind: EntityKind, position: Option<GridPos>, traits: Traits) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            kind,
            position,
            prev_position: position,
            width: 1,
            height: 1,
            age: 0,
            calories: 0,
            alive: true,
            held_by: Vec::new(),
            to_lift: 1,
            lifted: false,
            visible: true,
            last_seen_pos: position,
            theta: 0.0,
            traits,
        }
    }

    /// Bounding box at the current position, if placed
    pub fn rect(&self) -> Option<Rect> {
        self.position.map(|p| Rect::new(p, self.width, self.height))
    }

    /// Bounding box as if the entity stood at `position`
    pub fn rect_at(&self, position: GridPos) -> Rect {
        Rect::new(position, self.width, self.height)
    }

    pub fn is_big(&self) -> bool {
        self.to_lift > 1
    }

    /// Enough holders are attached to move it
    pub fn ready_to_lift(&self) -> bool {
        self.held_by.len() >= self.to_lift
    }

    pub fn ant(&self) -> Option<&AntState> {
        match &self.traits {
            Traits::Ant(ant) => Some(ant),
            _ => None,
        }
    }

    pub fn ant_mut(&mut self) -> Option<&mut AntState> {
        match &mut self.traits {
            Traits::Ant(ant) => Some(ant),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&LocationState> {
        match &self.traits {
            Traits::Location(loc) => Some(loc),
            _ => None,
        }
    }

    pub fn location_mut(&mut self) -> Option<&mut LocationState> {
        match &mut self.traits {
            Traits::Location(loc) => Some(loc),
            _ => None,
        }
    }

    pub fn pheromone(&self) -> Option<&PheromoneState> {
        match &self.traits {
            Traits::Pheromone(p) => Some(p),
            _ => None,
        }
    }

    pub fn pheromone_mut(&mut self) -> Option<&mut PheromoneState> {
        match &mut self.traits {
            Traits::Pheromone(p) => Some(p),
            _ => None,
        }
    }

    /// Queen/worker for ants and brood
    pub fn sub_type(&self) -> Option<AntSubType> {
        match &self.traits {
            Traits::Ant(ant) => Some(ant.sub_type),
            Traits::Brood { sub_type } => Some(*sub_type),
            _ => None,
        }
    }

    pub fn background(&self) -> Option<BackgroundKind> {
        match &self.traits {
            Traits::Background { sub_type } => Some(*sub_type),
            _ => None,
        }
    }

    /// Name of a location or food item
    pub fn name(&self) -> Option<&str> {
        match &self.traits {
            Traits::Location(loc) => Some(loc.name.as_str()),
            Traits::Food { name } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn holding(&self) -> Option<EntityId> {
        self.ant().and_then(|a| a.holding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_defaults() {
        let e = Entity::new(EntityKind::Dirt, Some(GridPos::new(1, 2)), Traits::Plain);
        assert_eq!(e.id, EntityId::UNASSIGNED);
        assert_eq!((e.width, e.height), (1, 1));
        assert_eq!(e.to_lift, 1);
        assert!(!e.is_big());
        assert_eq!(e.rect(), Some(Rect::cell(GridPos::new(1, 2))));
    }

    #[test]
    fn test_replace_task_bumps_epoch() {
        let mut ant = AntState::new(AntSubType::Worker, None);
        ant.task_index = 3;
        ant.replace_task(crate::entity::tasks::idle_task());
        assert_eq!(ant.task_index, 0);
        assert_eq!(ant.task_epoch, 1);
        assert_eq!(ant.task_name(), Some("Idle"));
    }
}
