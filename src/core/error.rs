use thiserror::Error;

use crate::core::types::{EdgeId, EntityId, GridPos};

#[derive(Error, Debug)]
pub enum ColonyError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Entity {0} is not an ant")]
    NotAnAnt(EntityId),

    #[error("Position {0} is outside the world")]
    OutOfWorld(GridPos),

    #[error("Ant {0} is already holding something")]
    AlreadyHolding(EntityId),

    #[error("Ant {0} is not holding anything")]
    NotHolding(EntityId),

    #[error("Entity {0} already exists")]
    DuplicateEntity(EntityId),

    #[error("New entity {0} cannot arrive holding or held by another entity")]
    UnresolvedHolding(EntityId),

    #[error("Entity {0} already has all the holders it needs")]
    LiftFull(EntityId),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Simulation host is no longer running")]
    HostClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ColonyError>;
