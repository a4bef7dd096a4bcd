//! Entity records, factories and lifecycle helpers

pub mod factory;
pub mod kind;
pub mod lifecycle;
pub mod record;
pub mod tasks;

pub use kind::{AntSubType, BackgroundKind, EntityKind};
pub use lifecycle::{change_entity_type, maybe_move_entity, pick_up_entity, put_down_entity};
pub use record::{AntState, Entity, Traits};
pub use tasks::{Behavior, Task, TaskRegistry};
