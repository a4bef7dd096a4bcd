//! Tasks, behaviors and the shared task registry
//!
//! A task is a named behavior queue that any number of ants can run at once.
//! Ants hold their own copy of the task together with an index into its queue
//! and a stack of parent tasks, so progress is never shared between ants.

use crate::core::types::{EntityId, Rect};
use crate::entity::kind::EntityKind;
use serde::{Deserialize, Serialize};

pub const IDLE_TASK: &str = "Idle";
pub const HOLDING_AND_IDLE_TASK: &str = "Holding and Idle";
pub const PICKING_UP_PREFIX: &str = "Picking up ";
pub const COLONY_ENTRANCE: &str = "Colony Entrance";

/// A place an ant can go to or be tested against: a named location entity or
/// a literal area of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Place {
    Named(String),
    Area(Rect),
}

impl Place {
    pub fn named(name: impl Into<String>) -> Self {
        Place::Named(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveTarget {
    /// A free neighbouring cell, chosen at random
    Random,
    /// One step along the heading of the pheromone under the ant
    Trail,
    Place(Place),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickupTarget {
    /// Whatever stopped the ant's last move
    Blocker,
    /// Dirt sharing a cell with a pheromone marker
    MarkedDirt,
    Kind(EntityKind),
    Entity(EntityId),
}

/// One concrete thing an ant does in a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AntAction {
    Idle,
    Move { target: MoveTarget },
    Pickup { target: PickupTarget },
    Putdown {
        #[serde(default)]
        at: Option<Place>,
    },
    Eat {
        #[serde(default)]
        food: Option<EntityId>,
    },
    Feed,
    Lay,
    Mark,
    Communicate,
}

impl AntAction {
    pub fn move_to(target: MoveTarget) -> Self {
        AntAction::Move { target }
    }

    pub fn pickup(target: PickupTarget) -> Self {
        AntAction::Pickup { target }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AntAction::Idle => "IDLE",
            AntAction::Move { .. } => "MOVE",
            AntAction::Pickup { .. } => "PICKUP",
            AntAction::Putdown { .. } => "PUTDOWN",
            AntAction::Eat { .. } => "EAT",
            AntAction::Feed => "FEED",
            AntAction::Lay => "LAY",
            AntAction::Mark => "MARK",
            AntAction::Communicate => "COMMUNICATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparator {
    #[default]
    Equals,
    LessThan,
    GreaterThan,
}

impl Comparator {
    pub fn compare(&self, value: f64, literal: f64) -> bool {
        match self {
            Comparator::Equals => value == literal,
            Comparator::LessThan => value < literal,
            Comparator::GreaterThan => value > literal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeldQuery {
    Anything,
    Nothing,
    Kind(EntityKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NeighborQuery {
    Anything,
    Nothing,
    Kind(EntityKind),
    MarkedDirt,
    /// Alias for a pheromone neighbour
    Trail,
    Entity(EntityId),
    /// A neighbouring location with this name
    Named(String),
}

/// The predicate part of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "object", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionTest {
    Location(Place),
    Holding(HeldQuery),
    Neighboring(NeighborQuery),
    Blocked,
    Random(f64),
    Calories(f64),
    Age(f64),
}

/// Guard of an IF or WHILE behavior.
///
/// `comparator` only applies to RANDOM, CALORIES and AGE tests; the others
/// are plain equality checks and ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub test: ConditionTest,
    #[serde(default)]
    pub comparator: Comparator,
    #[serde(default)]
    pub not: bool,
}

impl Condition {
    pub fn new(test: ConditionTest) -> Self {
        Self {
            test,
            comparator: Comparator::Equals,
            not: false,
        }
    }

    pub fn compared(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn negated(mut self) -> Self {
        self.not = !self.not;
        self
    }
}

/// One node of a behavior queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Behavior {
    DoAction {
        action: AntAction,
    },
    /// Coarse action whose MOVE form wanders at random inside a location
    HighLevelDoAction {
        action: AntAction,
    },
    If {
        condition: Condition,
        behavior: Box<Behavior>,
        #[serde(default)]
        else_behavior: Option<Box<Behavior>>,
    },
    While {
        condition: Condition,
        behavior: Box<Behavior>,
    },
    SwitchTask {
        task: String,
    },
}

impl Behavior {
    pub fn act(action: AntAction) -> Self {
        Behavior::DoAction { action }
    }

    pub fn if_then(condition: Condition, behavior: Behavior) -> Self {
        Behavior::If {
            condition,
            behavior: Box::new(behavior),
            else_behavior: None,
        }
    }

    pub fn if_else(condition: Condition, behavior: Behavior, else_behavior: Behavior) -> Self {
        Behavior::If {
            condition,
            behavior: Box::new(behavior),
            else_behavior: Some(Box::new(else_behavior)),
        }
    }

    pub fn while_do(condition: Condition, behavior: Behavior) -> Self {
        Behavior::While {
            condition,
            behavior: Box::new(behavior),
        }
    }

    pub fn switch_to(task: impl Into<String>) -> Self {
        Behavior::SwitchTask { task: task.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub repeating: bool,
    pub behavior_queue: Vec<Behavior>,
}

impl Task {
    pub fn new(name: impl Into<String>, repeating: bool, behavior_queue: Vec<Behavior>) -> Self {
        Self {
            name: name.into(),
            repeating,
            behavior_queue,
        }
    }

    pub fn len(&self) -> usize {
        self.behavior_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behavior_queue.is_empty()
    }
}

/// Saved parent task on an ant's task stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFrame {
    pub name: String,
    /// Index of the SWITCH_TASK node in the parent. Recorded but not used on
    /// resume: parents always restart from their first behavior.
    pub index: usize,
}

/// Shared, name-keyed collection of task templates in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Registry holding the built-in task library
    pub fn with_defaults(colony_entrance: &str) -> Self {
        let mut registry = Self::new();
        for task in [
            idle_task(),
            holding_and_idle_task(),
            random_move_task(),
            follow_trail_task(),
            find_food_task(),
            lay_eggs_task(),
            move_blocker_task(),
            dig_blueprint_task(colony_entrance),
            go_to_location_task("Go To Colony Entrance", Place::named(colony_entrance)),
        ] {
            registry.upsert(task);
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Insert or overwrite by name. Returns true if a task was replaced.
    pub fn upsert(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.name == task.name) {
            Some(existing) => {
                *existing = task;
                true
            }
            None => {
                self.tasks.push(task);
                false
            }
        }
    }

    /// Upsert that also handles renames coming from the task editor
    pub fn update(&mut self, task: Task, original_name: Option<&str>) -> bool {
        if let Some(original) = original_name {
            if original != task.name {
                self.remove(original);
            }
        }
        self.upsert(task)
    }

    pub fn remove(&mut self, name: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.name == name)?;
        Some(self.tasks.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// === BUILT-IN TASKS ===

pub fn idle_task() -> Task {
    Task::new(IDLE_TASK, true, vec![Behavior::act(AntAction::Idle)])
}

pub fn holding_and_idle_task() -> Task {
    Task::new(HOLDING_AND_IDLE_TASK, true, vec![Behavior::act(AntAction::Idle)])
}

/// Keep stepping toward `place` until the ant overlaps it
pub fn go_to_location_behavior(place: Place) -> Behavior {
    Behavior::while_do(
        Condition::new(ConditionTest::Location(place.clone())).negated(),
        Behavior::act(AntAction::move_to(MoveTarget::Place(place))),
    )
}

pub fn go_to_location_task(name: impl Into<String>, place: Place) -> Task {
    Task::new(name, false, vec![go_to_location_behavior(place)])
}

/// Gather tasks are built per lift and never registered
pub fn is_picking_up_task(name: &str) -> bool {
    name.starts_with(PICKING_UP_PREFIX)
}

/// Synthetic task given to every holder of a big entity: gather at `target`,
/// then hold still
pub fn picking_up_task(kind: EntityKind, target: Rect) -> Task {
    Task::new(
        format!("{}{}", PICKING_UP_PREFIX, kind),
        false,
        vec![
            go_to_location_behavior(Place::Area(target)),
            Behavior::switch_to(HOLDING_AND_IDLE_TASK),
        ],
    )
}

pub fn random_move_task() -> Task {
    Task::new(
        "Random Move",
        true,
        vec![Behavior::act(AntAction::move_to(MoveTarget::Random))],
    )
}

pub fn follow_trail_task() -> Task {
    Task::new(
        "Follow Trail",
        true,
        vec![Behavior::act(AntAction::move_to(MoveTarget::Trail))],
    )
}

pub fn find_food_task() -> Task {
    Task::new(
        "Find Food",
        false,
        vec![
            Behavior::while_do(
                Condition::new(ConditionTest::Neighboring(NeighborQuery::Kind(EntityKind::Food)))
                    .negated(),
                Behavior::act(AntAction::move_to(MoveTarget::Random)),
            ),
            Behavior::act(AntAction::pickup(PickupTarget::Kind(EntityKind::Food))),
        ],
    )
}

pub fn lay_eggs_task() -> Task {
    Task::new(
        "Lay Eggs",
        true,
        vec![
            Behavior::act(AntAction::Lay),
            Behavior::act(AntAction::move_to(MoveTarget::Random)),
        ],
    )
}

pub fn move_blocker_task() -> Task {
    Task::new(
        "Move Blocker",
        false,
        vec![
            Behavior::if_then(
                Condition::new(ConditionTest::Blocked),
                Behavior::act(AntAction::pickup(PickupTarget::Blocker)),
            ),
            Behavior::act(AntAction::move_to(MoveTarget::Random)),
            Behavior::act(AntAction::Putdown { at: None }),
        ],
    )
}

/// Dig out trail-marked dirt and haul it to the colony entrance
pub fn dig_blueprint_task(colony_entrance: &str) -> Task {
    Task::new(
        "Dig Blueprint",
        true,
        vec![
            Behavior::while_do(
                Condition::new(ConditionTest::Neighboring(NeighborQuery::MarkedDirt)).negated(),
                Behavior::act(AntAction::move_to(MoveTarget::Random)),
            ),
            Behavior::act(AntAction::pickup(PickupTarget::MarkedDirt)),
            go_to_location_behavior(Place::named(colony_entrance)),
            Behavior::act(AntAction::Putdown { at: None }),
        ],
    )
}
