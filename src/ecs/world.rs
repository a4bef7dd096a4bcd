//! ECS World - the single owned state value every core call threads through

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::ColonyConfig;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{EdgeId, EntityId, Tick};
use crate::entity::kind::EntityKind;
use crate::entity::lifecycle::put_down_entity;
use crate::entity::record::Entity;
use crate::entity::tasks::{Task, TaskRegistry, COLONY_ENTRANCE};
use crate::spatial::store::{SpatialStore, StoreSnapshot};

/// A pheromone trail from one location to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub start: EntityId,
    pub end: Option<EntityId>,
    /// Pheromone markers in the order they were laid
    pub pheromones: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserMode {
    MarkTrail,
    CreateLocation,
    #[default]
    Select,
    Pan,
}

/// What selected ants do with a clicked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AntMode {
    #[default]
    Pickup,
    Feed,
    Eat,
}

/// Editor bookkeeping. Stored for the UI; the tick engine never reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorState {
    pub selected: Vec<EntityId>,
    pub user_mode: UserMode,
    pub ant_mode: AntMode,
    pub cur_edge: Option<EdgeId>,
    pub prev_pheromone: Option<EntityId>,
    pub next_location_name: String,
}

/// The colony world
pub struct World {
    pub config: ColonyConfig,
    pub store: SpatialStore,
    pub tasks: TaskRegistry,
    pub edges: BTreeMap<EdgeId, Edge>,
    next_edge_id: u64,
    pub editor: EditorState,
    pub time: Tick,
    /// Whether the host should drive ticks on its interval
    pub ticking: bool,
    pub(crate) rng: ChaCha8Rng,
}

impl World {
    pub fn new(config: ColonyConfig) -> Self {
        let entrance = config
            .colony_entrance
            .clone()
            .unwrap_or_else(|| COLONY_ENTRANCE.to_string());
        tracing::info!(
            "Creating {}x{} world (seed {})",
            config.world_width,
            config.world_height,
            config.seed
        );
        Self {
            store: SpatialStore::new(config.world_width, config.world_height),
            tasks: TaskRegistry::with_defaults(&entrance),
            edges: BTreeMap::new(),
            next_edge_id: 1,
            editor: EditorState {
                next_location_name: "Location".to_string(),
                ..EditorState::default()
            },
            time: 0,
            ticking: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    /// Ids of every ant, dead or alive, in insertion order
    pub fn ant_ids(&self) -> Vec<EntityId> {
        self.store.ids_of(EntityKind::Ant).to_vec()
    }

    pub fn living_ant_count(&self) -> usize {
        self.store
            .ids_of(EntityKind::Ant)
            .iter()
            .filter(|id| self.store.get(**id).map_or(false, |a| a.alive))
            .count()
    }

    /// Add an entity; pheromones are clamped to the quantity cap and appended
    /// to their edge.
    ///
    /// New entities must arrive free of holding relations. An entity added
    /// under an existing id replaces that record after it has been removed
    /// the usual way, so anything it held is put down and its holders let go.
    pub fn add_entity(&mut self, mut entity: Entity) -> Result<EntityId> {
        if !entity.held_by.is_empty() || entity.holding().is_some() {
            return Err(ColonyError::UnresolvedHolding(entity.id));
        }
        if let Some(pos) = entity.position {
            if !self.store.inside_world(pos) {
                return Err(ColonyError::OutOfWorld(pos));
            }
        }
        let max = self.config.pheromone_max_quantity;
        if let Some(pheromone) = entity.pheromone_mut() {
            pheromone.quantity = pheromone.quantity.clamp(0, max);
        }
        if entity.id.is_assigned() && self.store.contains(entity.id) {
            tracing::debug!("Replacing {} with a new {}", entity.id, entity.kind);
            self.remove_entity(entity.id);
        }

        let edge = entity.pheromone().and_then(|p| p.edge);
        let id = self.store.add_entity(entity)?;
        if let Some(edge_id) = edge {
            match self.edges.get_mut(&edge_id) {
                Some(edge) if !edge.pheromones.contains(&id) => edge.pheromones.push(id),
                Some(_) => {}
                None => tracing::warn!("Pheromone {} references unknown {}", id, edge_id),
            }
        }
        Ok(id)
    }

    /// Remove an entity and every relation pointing at it: holders let go,
    /// anything it held is put down, its edge and the selection forget it.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.store.get(id)?;
        let holders = entity.held_by.clone();
        let holding = entity.holding();
        let edge = entity.pheromone().and_then(|p| p.edge);

        if holding.is_some() {
            if let Err(e) = put_down_entity(&mut self.store, id) {
                tracing::warn!("Could not release item held by {}: {}", id, e);
            }
        }
        for holder in holders {
            if let Some(ant) = self.store.get_mut(holder).and_then(|e| e.ant_mut()) {
                if ant.holding == Some(id) {
                    ant.holding = None;
                    ant.lead_holder = false;
                }
            }
        }
        if let Some(edge) = edge.and_then(|e| self.edges.get_mut(&e)) {
            edge.pheromones.retain(|&p| p != id);
        }
        self.editor.selected.retain(|&s| s != id);
        if self.editor.prev_pheromone == Some(id) {
            self.editor.prev_pheromone = None;
        }
        self.store.remove_entity(id)
    }

    /// Start a trail at a location
    pub fn create_edge(&mut self, start: EntityId) -> Result<EdgeId> {
        let location = self
            .store
            .get_mut(start)
            .and_then(|e| e.location_mut())
            .ok_or(ColonyError::EntityNotFound(start))?;
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        location.outgoing_edges.push(id);
        self.edges.insert(
            id,
            Edge {
                id,
                start,
                end: None,
                pheromones: Vec::new(),
            },
        );
        self.editor.cur_edge = Some(id);
        Ok(id)
    }

    /// Replace an edge. Setting its end registers it as incoming there.
    pub fn update_edge(&mut self, id: EdgeId, mut edge: Edge) -> Result<()> {
        if !self.edges.contains_key(&id) {
            return Err(ColonyError::EdgeNotFound(id));
        }
        edge.id = id;
        if let Some(end) = edge.end {
            let location = self
                .store
                .get_mut(end)
                .and_then(|e| e.location_mut())
                .ok_or(ColonyError::EntityNotFound(end))?;
            if !location.incoming_edges.contains(&id) {
                location.incoming_edges.push(id);
            }
        }
        self.edges.insert(id, edge);
        Ok(())
    }

    /// Look up a task template by name
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn snapshot(&self) -> WorldSnapshot<'_> {
        WorldSnapshot {
            time: self.time,
            ticking: self.ticking,
            store: self.store.snapshot(),
            edges: self.edges.values().collect(),
            tasks: self.tasks.iter().collect(),
            editor: &self.editor,
        }
    }

    /// Read-only state tree for renderers
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(ColonyConfig::default())
    }
}

#[derive(Debug, Serialize)]
pub struct WorldSnapshot<'a> {
    pub time: Tick,
    pub ticking: bool,
    pub store: StoreSnapshot<'a>,
    pub edges: Vec<&'a Edge>,
    pub tasks: Vec<&'a Task>,
    pub editor: &'a EditorState,
}
