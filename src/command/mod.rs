//! Command surface for input and editor collaborators
//!
//! Commands are applied immediately against the world:
//! Command -> CommandExecutor -> CommandOutcome

pub mod executor;

use serde::{Deserialize, Serialize};

use crate::core::types::{EdgeId, EntityId, GridPos};
use crate::ecs::world::{AntMode, Edge, UserMode};
use crate::entity::record::Entity;
use crate::entity::tasks::Task;
use crate::simulation::tick::TickEvent;

pub use executor::CommandExecutor;

/// A discrete operation against the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    CreateEntity {
        entity: Entity,
    },
    DestroyEntity {
        id: EntityId,
    },
    /// Give each ant its own copy of `task`, starting from the top
    AssignTask {
        task: Task,
        ants: Vec<EntityId>,
    },
    /// Upsert into the registry; a differing `original_name` is a rename
    UpdateTask {
        task: Task,
        #[serde(default)]
        original_name: Option<String>,
    },
    CreateTask {
        task: Task,
    },
    SetSelectedEntities {
        ids: Vec<EntityId>,
    },
    SetUserMode {
        mode: UserMode,
    },
    SetAntMode {
        mode: AntMode,
    },
    UpdateLocationName {
        id: EntityId,
        name: String,
    },
    UpdateNextLocationName {
        name: String,
    },
    CreateEdge {
        start: EntityId,
    },
    UpdateEdge {
        id: EdgeId,
        edge: Edge,
    },
    SetCurEdge {
        edge: Option<EdgeId>,
    },
    /// Lay a trail of pheromones for `edge` between two cells
    MarkTrail {
        edge: EdgeId,
        from: GridPos,
        to: GridPos,
    },
    UpdateTheta {
        id: EntityId,
        theta: f64,
    },
    SetPrevPheromone {
        id: Option<EntityId>,
    },
    StartTick,
    StopTick,
    Tick,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateEntity { .. } => "CREATE_ENTITY",
            Command::DestroyEntity { .. } => "DESTROY_ENTITY",
            Command::AssignTask { .. } => "ASSIGN_TASK",
            Command::UpdateTask { .. } => "UPDATE_TASK",
            Command::CreateTask { .. } => "CREATE_TASK",
            Command::SetSelectedEntities { .. } => "SET_SELECTED_ENTITIES",
            Command::SetUserMode { .. } => "SET_USER_MODE",
            Command::SetAntMode { .. } => "SET_ANT_MODE",
            Command::UpdateLocationName { .. } => "UPDATE_LOCATION_NAME",
            Command::UpdateNextLocationName { .. } => "UPDATE_NEXT_LOCATION_NAME",
            Command::CreateEdge { .. } => "CREATE_EDGE",
            Command::UpdateEdge { .. } => "UPDATE_EDGE",
            Command::SetCurEdge { .. } => "SET_CUR_EDGE",
            Command::MarkTrail { .. } => "MARK_TRAIL",
            Command::UpdateTheta { .. } => "UPDATE_THETA",
            Command::SetPrevPheromone { .. } => "SET_PREV_PHEROMONE",
            Command::StartTick => "START_TICK",
            Command::StopTick => "STOP_TICK",
            Command::Tick => "TICK",
        }
    }
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandOutcome {
    Applied,
    EntityCreated { id: EntityId },
    EdgeCreated { id: EdgeId },
    TrailMarked { pheromones: Vec<EntityId> },
    Ticked { events: Vec<TickEvent> },
}
