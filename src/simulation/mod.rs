pub mod action;
pub mod behavior;
pub mod condition;
pub mod environment;
pub mod life_cycle;
pub mod lift;
pub mod tick;

pub use action::{perform_action, perform_high_level_action};
pub use behavior::{perform_behavior, perform_task, BehaviorOutcome};
pub use condition::evaluate_condition;
pub use environment::{apply_gravity, mark_trail, update_pheromones, update_visibility};
pub use life_cycle::update_life_cycles;
pub use lift::{gather_point, resolve_lifts};
pub use tick::{run_tick, TickEvent};
