//! Command execution - applies editor and input commands to the world

use crate::command::{Command, CommandOutcome};
use crate::core::error::{ColonyError, Result};
use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::simulation::environment::mark_trail;
use crate::simulation::tick::run_tick;

/// Applies commands to the world. Every id is checked before anything is
/// mutated, so a rejected command leaves the world untouched.
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn execute(world: &mut World, command: Command) -> Result<CommandOutcome> {
        tracing::debug!("Applying {}", command.name());
        match command {
            Command::CreateEntity { entity } => {
                let id = world.add_entity(entity)?;
                Ok(CommandOutcome::EntityCreated { id })
            }
            Command::DestroyEntity { id } => {
                world.remove_entity(id).ok_or(ColonyError::EntityNotFound(id))?;
                Ok(CommandOutcome::Applied)
            }
            Command::AssignTask { task, ants } => {
                for id in &ants {
                    require_ant(world, *id)?;
                }
                for id in ants {
                    if let Some(ant) = world.store.get_mut(id).and_then(|e| e.ant_mut()) {
                        ant.task_stack.clear();
                        ant.replace_task(task.clone());
                    }
                }
                Ok(CommandOutcome::Applied)
            }
            Command::UpdateTask { task, original_name } => {
                world.tasks.update(task, original_name.as_deref());
                Ok(CommandOutcome::Applied)
            }
            Command::CreateTask { task } => {
                world.tasks.upsert(task);
                Ok(CommandOutcome::Applied)
            }
            Command::SetSelectedEntities { mut ids } => {
                ids.truncate(world.config.max_selectable_ants);
                world.editor.selected = ids;
                Ok(CommandOutcome::Applied)
            }
            Command::SetUserMode { mode } => {
                world.editor.user_mode = mode;
                Ok(CommandOutcome::Applied)
            }
            Command::SetAntMode { mode } => {
                world.editor.ant_mode = mode;
                Ok(CommandOutcome::Applied)
            }
            Command::UpdateLocationName { id, name } => {
                let location = world
                    .store
                    .get_mut(id)
                    .and_then(|e| e.location_mut())
                    .ok_or(ColonyError::EntityNotFound(id))?;
                location.name = name;
                Ok(CommandOutcome::Applied)
            }
            Command::UpdateNextLocationName { name } => {
                world.editor.next_location_name = name;
                Ok(CommandOutcome::Applied)
            }
            Command::CreateEdge { start } => {
                let id = world.create_edge(start)?;
                Ok(CommandOutcome::EdgeCreated { id })
            }
            Command::UpdateEdge { id, edge } => {
                world.update_edge(id, edge)?;
                Ok(CommandOutcome::Applied)
            }
            Command::SetCurEdge { edge } => {
                if let Some(id) = edge {
                    if !world.edges.contains_key(&id) {
                        return Err(ColonyError::EdgeNotFound(id));
                    }
                }
                world.editor.cur_edge = edge;
                Ok(CommandOutcome::Applied)
            }
            Command::MarkTrail { edge, from, to } => {
                let pheromones = mark_trail(world, edge, from, to)?;
                Ok(CommandOutcome::TrailMarked { pheromones })
            }
            Command::UpdateTheta { id, theta } => {
                let entity = world.store.get_mut(id).ok_or(ColonyError::EntityNotFound(id))?;
                entity.theta = theta;
                Ok(CommandOutcome::Applied)
            }
            Command::SetPrevPheromone { id } => {
                if let Some(id) = id {
                    if !world.store.contains(id) {
                        return Err(ColonyError::EntityNotFound(id));
                    }
                }
                world.editor.prev_pheromone = id;
                Ok(CommandOutcome::Applied)
            }
            Command::StartTick => {
                if !world.ticking {
                    tracing::info!("Ticking started at tick {}", world.time);
                }
                world.ticking = true;
                Ok(CommandOutcome::Applied)
            }
            Command::StopTick => {
                if world.ticking {
                    tracing::info!("Ticking stopped at tick {}", world.time);
                }
                world.ticking = false;
                Ok(CommandOutcome::Applied)
            }
            Command::Tick => Ok(CommandOutcome::Ticked {
                events: run_tick(world),
            }),
        }
    }
}

fn require_ant(world: &World, id: EntityId) -> Result<()> {
    match world.get(id) {
        None => Err(ColonyError::EntityNotFound(id)),
        Some(e) if e.ant().is_none() => Err(ColonyError::NotAnAnt(id)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ColonyConfig;
    use crate::core::types::GridPos;
    use crate::entity::factory::{make_ant, make_dirt, make_food, make_location, make_pheromone};
    use crate::entity::kind::{AntSubType, EntityKind};
    use crate::entity::lifecycle::pick_up_entity;
    use crate::entity::tasks::{random_move_task, Behavior, Task, TaskFrame};
    use crate::entity::tasks::AntAction;

    fn world() -> World {
        World::new(ColonyConfig::with_world_size(20, 20))
    }

    fn spawn_ant(world: &mut World, x: i32, y: i32) -> EntityId {
        let config = world.config.clone();
        world
            .add_entity(make_ant(GridPos::new(x, y), AntSubType::Worker, &config))
            .unwrap()
    }

    #[test]
    fn test_assign_task_resets_progress() {
        let mut world = world();
        let ant = spawn_ant(&mut world, 3, 3);
        {
            let state = world.store.get_mut(ant).unwrap().ant_mut().unwrap();
            state.task_index = 4;
            state.task_stack.push(TaskFrame {
                name: "Idle".into(),
                index: 0,
            });
        }
        let outcome = CommandExecutor::execute(
            &mut world,
            Command::AssignTask {
                task: random_move_task(),
                ants: vec![ant],
            },
        )
        .unwrap();
        assert_eq!(outcome, CommandOutcome::Applied);
        let state = world.get(ant).unwrap().ant().unwrap();
        assert_eq!(state.task_name(), Some("Random Move"));
        assert_eq!(state.task_index, 0);
        assert!(state.task_stack.is_empty());
    }

    #[test]
    fn test_assign_task_rejects_non_ants_without_mutating() {
        let mut world = world();
        let ant = spawn_ant(&mut world, 3, 3);
        let dirt = world.add_entity(make_dirt(GridPos::new(5, 0))).unwrap();
        let result = CommandExecutor::execute(
            &mut world,
            Command::AssignTask {
                task: random_move_task(),
                ants: vec![ant, dirt],
            },
        );
        assert!(matches!(result, Err(ColonyError::NotAnAnt(id)) if id == dirt));
        assert_eq!(world.get(ant).unwrap().ant().unwrap().task_name(), Some("Idle"));
    }

    #[test]
    fn test_update_task_renames() {
        let mut world = world();
        let before = world.tasks.len();
        let renamed = Task::new("Wander", true, vec![Behavior::act(AntAction::Idle)]);
        CommandExecutor::execute(
            &mut world,
            Command::UpdateTask {
                task: renamed,
                original_name: Some("Random Move".into()),
            },
        )
        .unwrap();
        assert!(world.task("Random Move").is_none());
        assert!(world.task("Wander").is_some());
        assert_eq!(world.tasks.len(), before);
    }

    #[test]
    fn test_selection_is_capped() {
        let mut world = world();
        world.config.max_selectable_ants = 2;
        let ids: Vec<EntityId> = (0..4).map(|x| spawn_ant(&mut world, x, 5)).collect();
        CommandExecutor::execute(&mut world, Command::SetSelectedEntities { ids: ids.clone() }).unwrap();
        assert_eq!(world.editor.selected, ids[..2].to_vec());
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let mut world = world();
        let missing = EntityId(99);
        assert!(matches!(
            CommandExecutor::execute(&mut world, Command::DestroyEntity { id: missing }),
            Err(ColonyError::EntityNotFound(_))
        ));
        assert!(matches!(
            CommandExecutor::execute(&mut world, Command::SetCurEdge { edge: Some(crate::core::types::EdgeId(7)) }),
            Err(ColonyError::EdgeNotFound(_))
        ));
        assert!(world.editor.cur_edge.is_none());
    }

    #[test]
    fn test_edge_commands_and_location_rename() {
        let mut world = world();
        let nest = world.add_entity(make_location("Nest", 2, 2, GridPos::new(1, 1))).unwrap();
        let outcome = CommandExecutor::execute(&mut world, Command::CreateEdge { start: nest }).unwrap();
        let CommandOutcome::EdgeCreated { id: edge } = outcome else {
            panic!("expected an edge, got {:?}", outcome);
        };
        let marked = CommandExecutor::execute(
            &mut world,
            Command::MarkTrail {
                edge,
                from: GridPos::new(1, 1),
                to: GridPos::new(1, 3),
            },
        )
        .unwrap();
        assert!(matches!(marked, CommandOutcome::TrailMarked { ref pheromones } if pheromones.len() == 3));

        CommandExecutor::execute(
            &mut world,
            Command::UpdateLocationName {
                id: nest,
                name: "Home".into(),
            },
        )
        .unwrap();
        assert_eq!(world.get(nest).unwrap().name(), Some("Home"));
    }

    #[test]
    fn test_tick_commands() {
        let mut world = world();
        CommandExecutor::execute(&mut world, Command::StartTick).unwrap();
        assert!(world.ticking);
        let outcome = CommandExecutor::execute(&mut world, Command::Tick).unwrap();
        assert_eq!(outcome, CommandOutcome::Ticked { events: vec![] });
        assert_eq!(world.time, 1);
        CommandExecutor::execute(&mut world, Command::StopTick).unwrap();
        assert!(!world.ticking);
    }

    #[test]
    fn test_create_entity_over_a_holder_releases_what_it_held() {
        let mut world = world();
        let ant = spawn_ant(&mut world, 3, 3);
        let food = world.add_entity(make_food(GridPos::new(4, 3), 20, "Crumb")).unwrap();
        pick_up_entity(&mut world.store, ant, food).unwrap();

        let mut replacement = make_food(GridPos::new(3, 3), 5, "Seed");
        replacement.id = ant;
        let outcome = CommandExecutor::execute(&mut world, Command::CreateEntity { entity: replacement }).unwrap();
        assert_eq!(outcome, CommandOutcome::EntityCreated { id: ant });

        assert_eq!(world.get(ant).unwrap().kind, EntityKind::Food);
        assert!(world.ant_ids().is_empty());
        let released = world.get(food).unwrap();
        assert!(released.held_by.is_empty());
        assert_eq!(released.position, Some(GridPos::new(3, 3)));
        assert!(world.store.check_consistency().is_ok());
    }

    #[test]
    fn test_create_entity_rejects_holding_relations() {
        let mut world = world();
        let ant = spawn_ant(&mut world, 3, 3);
        let food = world.add_entity(make_food(GridPos::new(4, 3), 20, "Crumb")).unwrap();

        let mut held = make_food(GridPos::new(5, 5), 10, "Seed");
        held.held_by = vec![ant];
        assert!(matches!(
            CommandExecutor::execute(&mut world, Command::CreateEntity { entity: held }),
            Err(ColonyError::UnresolvedHolding(_))
        ));

        let config = world.config.clone();
        let mut holder = make_ant(GridPos::new(6, 6), AntSubType::Worker, &config);
        if let Some(state) = holder.ant_mut() {
            state.holding = Some(food);
        }
        assert!(matches!(
            CommandExecutor::execute(&mut world, Command::CreateEntity { entity: holder }),
            Err(ColonyError::UnresolvedHolding(_))
        ));

        assert_eq!(world.store.len(), 2);
        assert!(world.get(food).unwrap().held_by.is_empty());
    }

    #[test]
    fn test_create_entity_clamps_pheromone_quantity() {
        let mut world = world();
        let max = world.config.pheromone_max_quantity;
        let outcome = CommandExecutor::execute(
            &mut world,
            Command::CreateEntity {
                entity: make_pheromone(GridPos::new(2, 2), 0.0, max + 400, None),
            },
        )
        .unwrap();
        let id = match outcome {
            CommandOutcome::EntityCreated { id } => id,
            other => panic!("expected a created entity, got {:?}", other),
        };
        assert_eq!(world.get(id).unwrap().pheromone().unwrap().quantity, max);

        CommandExecutor::execute(&mut world, Command::Tick).unwrap();
        assert_eq!(world.get(id).unwrap().pheromone().unwrap().quantity, max - 1);
    }

    #[test]
    fn test_commands_parse_from_json() {
        let json = r#"{"type":"SET_SELECTED_ENTITIES","ids":[1,2]}"#;
        let command: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            command,
            Command::SetSelectedEntities {
                ids: vec![EntityId(1), EntityId(2)]
            }
        );
        let tick: Command = serde_json::from_str(r#"{"type":"TICK"}"#).unwrap();
        assert_eq!(tick, Command::Tick);
    }
}
