//! Behavior-tree interpreter
//!
//! Each living ant attempts exactly one top-level step of its task per tick.
//! Nested IF/WHILE nodes recurse within that step; a WHILE body runs at most
//! once per tick because the WHILE node itself stays incomplete.

use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::tasks::{idle_task, is_picking_up_task, Behavior, Task, TaskFrame};
use crate::simulation::action::{perform_action, perform_high_level_action};
use crate::simulation::condition::evaluate_condition;

/// What the scheduler should do with the task index after one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorOutcome {
    /// Node not finished; retry it next tick
    Continuing,
    /// Node finished; move to the next one
    CompletedAdvance,
    /// The active task was replaced; start it from its first node
    CompletedRestart,
}

/// Look up a task template by name. A missing name is malformed task data:
/// loud in debug builds, the idle task otherwise.
pub fn lookup_task(world: &World, name: &str) -> Task {
    let found = world.tasks.get(name);
    debug_assert!(found.is_some(), "task {:?} is not in the registry", name);
    match found {
        Some(task) => task.clone(),
        None => {
            tracing::error!("Task {:?} not found, falling back to idle", name);
            idle_task()
        }
    }
}

/// Run one step of the ant's active task
pub fn perform_task(world: &mut World, ant_id: EntityId) {
    let Some(state) = world.store.get(ant_id).and_then(|e| e.ant()) else {
        return;
    };
    let Some(task) = state.task.as_ref() else {
        return;
    };
    let index = state.task_index;
    let epoch = state.task_epoch;
    let repeating = task.repeating;
    let len = task.len();

    if index >= len {
        finish_task(world, ant_id, repeating);
        return;
    }

    let behavior = task.behavior_queue[index].clone();
    let outcome = perform_behavior(world, ant_id, &behavior);

    let Some(state) = world.store.get_mut(ant_id).and_then(|e| e.ant_mut()) else {
        return;
    };
    if state.task_epoch != epoch {
        state.task_index = 0;
        return;
    }
    match outcome {
        BehaviorOutcome::Continuing => {}
        BehaviorOutcome::CompletedAdvance => {
            state.task_index += 1;
            if repeating {
                state.task_index %= len;
            }
        }
        BehaviorOutcome::CompletedRestart => state.task_index = 0,
    }
}

/// Past the end of the queue: repeat, or pop back to the parent task (which
/// always restarts from its first node), or fall back to idle. Frames left by
/// a finished lift's gather task are dropped on the way.
fn finish_task(world: &mut World, ant_id: EntityId, repeating: bool) {
    let parent = match world.store.get_mut(ant_id).and_then(|e| e.ant_mut()) {
        Some(state) if repeating => {
            state.task_index = 0;
            return;
        }
        Some(state) => {
            let mut frame = state.task_stack.pop();
            while frame.as_ref().map_or(false, |f| is_picking_up_task(&f.name)) {
                frame = state.task_stack.pop();
            }
            frame
        }
        None => return,
    };
    let next = match parent {
        Some(frame) => lookup_task(world, &frame.name),
        None => idle_task(),
    };
    tracing::debug!("{} finished its task, now {}", ant_id, next.name);
    if let Some(state) = world.store.get_mut(ant_id).and_then(|e| e.ant_mut()) {
        state.replace_task(next);
    }
}

/// Evaluate one behavior node, recursing into IF and WHILE bodies
pub fn perform_behavior(world: &mut World, ant_id: EntityId, behavior: &Behavior) -> BehaviorOutcome {
    match behavior {
        Behavior::DoAction { action } => {
            perform_action(world, ant_id, action);
            BehaviorOutcome::CompletedAdvance
        }
        Behavior::HighLevelDoAction { action } => {
            perform_high_level_action(world, ant_id, action);
            BehaviorOutcome::CompletedAdvance
        }
        Behavior::If {
            condition,
            behavior,
            else_behavior,
        } => {
            let branch = if evaluate_condition(world, ant_id, condition) {
                Some(&**behavior)
            } else {
                else_behavior.as_deref()
            };
            match branch.map(|b| perform_behavior(world, ant_id, b)) {
                Some(BehaviorOutcome::CompletedRestart) => BehaviorOutcome::CompletedRestart,
                _ => BehaviorOutcome::CompletedAdvance,
            }
        }
        Behavior::While { condition, behavior } => {
            if !evaluate_condition(world, ant_id, condition) {
                return BehaviorOutcome::CompletedAdvance;
            }
            match perform_behavior(world, ant_id, behavior) {
                BehaviorOutcome::CompletedRestart => BehaviorOutcome::CompletedRestart,
                _ => BehaviorOutcome::Continuing,
            }
        }
        Behavior::SwitchTask { task } => {
            let next = lookup_task(world, task);
            if let Some(state) = world.store.get_mut(ant_id).and_then(|e| e.ant_mut()) {
                if let Some(current) = state.task_name().map(str::to_string) {
                    state.task_stack.push(TaskFrame {
                        name: current,
                        index: state.task_index,
                    });
                }
                tracing::debug!("{} switches to task {:?}", ant_id, next.name);
                state.replace_task(next);
            }
            BehaviorOutcome::CompletedRestart
        }
    }
}
