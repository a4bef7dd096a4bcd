//! Entity type tags and sub-types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of every entity in the store. Each tag has its own id bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Ant,
    Dirt,
    Food,
    Egg,
    Larva,
    Pupa,
    Location,
    Pheromone,
    Stone,
    Obelisk,
    Background,
    DeadAnt,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Ant,
        EntityKind::Dirt,
        EntityKind::Food,
        EntityKind::Egg,
        EntityKind::Larva,
        EntityKind::Pupa,
        EntityKind::Location,
        EntityKind::Pheromone,
        EntityKind::Stone,
        EntityKind::Obelisk,
        EntityKind::Background,
        EntityKind::DeadAnt,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Ant => "ANT",
            EntityKind::Dirt => "DIRT",
            EntityKind::Food => "FOOD",
            EntityKind::Egg => "EGG",
            EntityKind::Larva => "LARVA",
            EntityKind::Pupa => "PUPA",
            EntityKind::Location => "LOCATION",
            EntityKind::Pheromone => "PHEROMONE",
            EntityKind::Stone => "STONE",
            EntityKind::Obelisk => "OBELISK",
            EntityKind::Background => "BACKGROUND",
            EntityKind::DeadAnt => "DEAD_ANT",
        }
    }

}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AntSubType {
    Queen,
    #[default]
    Worker,
}

/// Background tiles are either open sky or excavatable underground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundKind {
    Sky,
    Dirt,
}
