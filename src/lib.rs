//! Ant Colony - tick-based ant colony simulation engine
//!
//! A grid world of typed entities, ants driven by shared behavior-tree
//! tasks, brood life cycles, cooperative lifting, pheromone trails, gravity
//! and fog of war. The engine is single-threaded; [`host`] schedules ticks.

pub mod command;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod host;
pub mod scenario;
pub mod simulation;
pub mod spatial;
