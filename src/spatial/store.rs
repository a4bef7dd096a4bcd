//! Spatial entity store
//!
//! Owns every entity and indexes it three ways: by id, by type bucket and by
//! grid cell. An entity with a position sits in exactly one grid bucket (its
//! anchor cell) and exactly one type bucket. Held entities have no position
//! and live only in the id table and their type bucket.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::error::{ColonyError, Result};
use crate::core::types::{EntityId, GridPos, Rect};
use crate::entity::kind::EntityKind;
use crate::entity::record::Entity;
use crate::spatial::grid::Grid;

pub struct SpatialStore {
    width: i32,
    height: i32,
    entities: AHashMap<EntityId, Entity>,
    buckets: AHashMap<EntityKind, Vec<EntityId>>,
    grid: Grid<Vec<EntityId>>,
    next_id: u64,
    /// Largest width/height ever stored, used to widen fast collision scans
    max_extent: (i32, i32),
}

impl SpatialStore {
    pub fn new(width: i32, height: i32) -> Self {
        let mut buckets = AHashMap::new();
        for kind in EntityKind::ALL {
            buckets.insert(kind, Vec::new());
        }
        Self {
            width,
            height,
            entities: AHashMap::new(),
            buckets,
            grid: Grid::new(width, height),
            next_id: 1,
            max_extent: (1, 1),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn inside_world(&self, pos: GridPos) -> bool {
        self.grid.contains(pos)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access for in-place field updates (calories, task state, ...).
    /// Position, kind and id must only change through the store's own methods.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Ids of one type in insertion order
    pub fn ids_of(&self, kind: EntityKind) -> &[EntityId] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.ids_of(kind).len()
    }

    /// Ids anchored at a cell; empty outside the world
    pub fn lookup_in_grid(&self, pos: GridPos) -> &[EntityId] {
        self.grid.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entities_at(&self, pos: GridPos) -> impl Iterator<Item = &Entity> + '_ {
        self.lookup_in_grid(pos)
            .iter()
            .filter_map(move |id| self.entities.get(id))
    }

    /// Insert an entity, assigning a fresh id if it has none. Ids already in
    /// the store are rejected; replacing a record goes through `World`, which
    /// releases its relations first.
    pub fn add_entity(&mut self, mut entity: Entity) -> Result<EntityId> {
        if let Some(pos) = entity.position {
            if !self.inside_world(pos) {
                return Err(ColonyError::OutOfWorld(pos));
            }
        }

        if entity.id.is_assigned() {
            if self.entities.contains_key(&entity.id) {
                return Err(ColonyError::DuplicateEntity(entity.id));
            }
            self.next_id = self.next_id.max(entity.id.0 + 1);
        } else {
            entity.id = EntityId(self.next_id);
            self.next_id += 1;
        }

        let id = entity.id;
        self.max_extent = (
            self.max_extent.0.max(entity.width),
            self.max_extent.1.max(entity.height),
        );
        self.buckets.entry(entity.kind).or_default().push(id);
        if let Some(pos) = entity.position {
            self.insert_in_grid(pos, id);
        }
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Delete from the id table, type bucket and grid together
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        if let Some(bucket) = self.buckets.get_mut(&entity.kind) {
            bucket.retain(|&e| e != id);
        }
        if let Some(pos) = entity.position {
            self.delete_from_grid(pos, id);
        }
        Some(entity)
    }

    /// Move an entity to `pos`. The caller has already checked the move is
    /// legal; moving outside the world is an invariant violation.
    pub fn move_entity(&mut self, id: EntityId, pos: GridPos) {
        debug_assert!(self.inside_world(pos), "move of {} outside world to {}", id, pos);
        if !self.inside_world(pos) {
            tracing::error!("Refusing to move {} outside the world to {}", id, pos);
            return;
        }
        let Some(old) = self.entities.get(&id).map(|e| e.position) else {
            return;
        };
        if let Some(old_pos) = old {
            self.delete_from_grid(old_pos, id);
        }
        self.insert_in_grid(pos, id);
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.prev_position = old;
            entity.position = Some(pos);
        }
    }

    /// Take an entity off the grid while keeping it in the store (held items)
    pub fn unplace_entity(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if let Some(pos) = entity.position.take() {
            entity.prev_position = Some(pos);
            self.delete_from_grid(pos, id);
        }
    }

    /// Move an entity between type buckets, keeping its id and grid cell
    pub fn retype_entity(&mut self, id: EntityId, new_kind: EntityKind) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        let old_kind = entity.kind;
        if old_kind == new_kind {
            return;
        }
        entity.kind = new_kind;
        if let Some(bucket) = self.buckets.get_mut(&old_kind) {
            bucket.retain(|&e| e != id);
        }
        self.buckets.entry(new_kind).or_default().push(id);
    }

    /// Swap in a new record under an existing id (life-stage transitions).
    /// Grid placement follows the new record's position.
    pub fn replace_entity(&mut self, id: EntityId, mut entity: Entity) -> Result<()> {
        let old = self.entities.get(&id).ok_or(ColonyError::EntityNotFound(id))?;
        if let Some(pos) = entity.position {
            if !self.inside_world(pos) {
                return Err(ColonyError::OutOfWorld(pos));
            }
        }
        let old_kind = old.kind;
        let old_pos = old.position;
        let new_kind = entity.kind;
        let new_pos = entity.position;

        entity.id = id;
        entity.kind = old_kind;
        self.max_extent = (
            self.max_extent.0.max(entity.width),
            self.max_extent.1.max(entity.height),
        );
        self.entities.insert(id, entity);

        if old_pos != new_pos {
            if let Some(pos) = old_pos {
                self.delete_from_grid(pos, id);
            }
            if let Some(pos) = new_pos {
                self.insert_in_grid(pos, id);
            }
        }
        self.retype_entity(id, new_kind);
        Ok(())
    }

    fn insert_in_grid(&mut self, pos: GridPos, id: EntityId) {
        if let Some(cell) = self.grid.get_mut(pos) {
            cell.push(id);
        }
    }

    fn delete_from_grid(&mut self, pos: GridPos, id: EntityId) {
        if let Some(cell) = self.grid.get_mut(pos) {
            cell.retain(|&e| e != id);
        }
    }

    // === QUERIES ===

    /// Entities whose bounding box overlaps `rect`, by full scan
    pub fn collides_with(&self, rect: &Rect) -> Vec<EntityId> {
        let mut hits: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.rect().map_or(false, |r| r.overlaps(rect)))
            .map(|e| e.id)
            .collect();
        hits.sort();
        hits
    }

    /// Entities whose bounding box overlaps `rect`, scanning only the grid
    /// cells that could anchor an overlapping entity
    pub fn fast_collides_with(&self, rect: &Rect) -> Vec<EntityId> {
        let min_x = (rect.position.x - self.max_extent.0 + 1).max(0);
        let min_y = (rect.position.y - self.max_extent.1 + 1).max(0);
        let max_x = rect.max_x().min(self.width - 1);
        let max_y = rect.max_y().min(self.height - 1);

        let mut hits = Vec::new();
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                for id in self.lookup_in_grid(GridPos::new(x, y)) {
                    let overlaps = self
                        .entities
                        .get(id)
                        .and_then(|e| e.rect())
                        .map_or(false, |r| r.overlaps(rect));
                    if overlaps {
                        hits.push(*id);
                    }
                }
            }
        }
        hits
    }

    /// Entities other than `id` overlapping `id`'s own bounding box
    pub fn stacked_with(&self, id: EntityId) -> Vec<EntityId> {
        match self.get(id).and_then(|e| e.rect()) {
            Some(rect) => self
                .fast_collides_with(&rect)
                .into_iter()
                .filter(|&other| other != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Cells bordering an entity's bounding box. Orthogonal ring, plus the
    /// four corners when `diagonal` is set.
    pub fn neighbor_positions(&self, id: EntityId, diagonal: bool) -> Vec<GridPos> {
        let Some(rect) = self.get(id).and_then(|e| e.rect()) else {
            return Vec::new();
        };
        let mut cells = Vec::new();
        for x in rect.position.x..=rect.max_x() {
            cells.push(GridPos::new(x, rect.max_y() + 1));
            cells.push(GridPos::new(x, rect.position.y - 1));
        }
        for y in rect.position.y..=rect.max_y() {
            cells.push(GridPos::new(rect.max_x() + 1, y));
            cells.push(GridPos::new(rect.position.x - 1, y));
        }
        if diagonal {
            cells.push(GridPos::new(rect.position.x - 1, rect.position.y - 1));
            cells.push(GridPos::new(rect.max_x() + 1, rect.position.y - 1));
            cells.push(GridPos::new(rect.position.x - 1, rect.max_y() + 1));
            cells.push(GridPos::new(rect.max_x() + 1, rect.max_y() + 1));
        }
        cells
    }

    /// Entities touching the cells around `id` (never `id` itself)
    pub fn neighbors(&self, id: EntityId, diagonal: bool) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = Vec::new();
        for cell in self.neighbor_positions(id, diagonal) {
            for other in self.fast_collides_with(&Rect::cell(cell)) {
                if other != id && !found.contains(&other) {
                    found.push(other);
                }
            }
        }
        found
    }

    /// In-world orthogonal neighbour cells of `id` free of `blocking` types
    pub fn empty_neighbor_positions(&self, id: EntityId, blocking: &[EntityKind]) -> Vec<GridPos> {
        self.neighbor_positions(id, false)
            .into_iter()
            .filter(|&pos| self.inside_world(pos))
            .filter(|&pos| self.blocker_in(&Rect::cell(pos), blocking, Some(id)).is_none())
            .collect()
    }

    /// First entity of a `blocking` type overlapping `rect`, ignoring `exclude`
    pub fn blocker_in(
        &self,
        rect: &Rect,
        blocking: &[EntityKind],
        exclude: Option<EntityId>,
    ) -> Option<EntityId> {
        self.fast_collides_with(rect).into_iter().find(|&other| {
            Some(other) != exclude
                && self
                    .get(other)
                    .map_or(false, |e| blocking.contains(&e.kind))
        })
    }

    /// Placed entities whose anchor lies within `radius` of `center`
    pub fn entities_in_radius(&self, center: GridPos, radius: f64) -> Vec<EntityId> {
        let reach = radius.ceil() as i32;
        let mut found = Vec::new();
        for x in (center.x - reach).max(0)..=(center.x + reach).min(self.width - 1) {
            for y in (center.y - reach).max(0)..=(center.y + reach).min(self.height - 1) {
                let pos = GridPos::new(x, y);
                if center.distance(&pos) <= radius {
                    found.extend_from_slice(self.lookup_in_grid(pos));
                }
            }
        }
        found
    }

    /// First location with this name, in creation order
    pub fn find_location(&self, name: &str) -> Option<&Entity> {
        self.ids_of(EntityKind::Location)
            .iter()
            .filter_map(|id| self.get(*id))
            .find(|e| e.location().map_or(false, |l| l.name == name))
    }

    /// Check that every index agrees with the entity table
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let mut cells_of: AHashMap<EntityId, Vec<GridPos>> = AHashMap::new();
        for (pos, ids) in self.grid.iter() {
            for id in ids {
                cells_of.entry(*id).or_default().push(pos);
            }
        }

        for entity in self.entities.values() {
            for (kind, ids) in &self.buckets {
                let n = ids.iter().filter(|&&i| i == entity.id).count();
                let expected = usize::from(*kind == entity.kind);
                if n != expected {
                    return Err(format!(
                        "{} ({}) appears {} times in the {} bucket",
                        entity.id, entity.kind, n, kind
                    ));
                }
            }

            let cells = cells_of.remove(&entity.id).unwrap_or_default();
            match entity.position {
                Some(pos) if cells != vec![pos] => {
                    return Err(format!("{} at {} indexed in cells {:?}", entity.id, pos, cells));
                }
                None if !cells.is_empty() => {
                    return Err(format!("unplaced {} still indexed in {:?}", entity.id, cells));
                }
                _ => {}
            }
        }

        if let Some((id, cells)) = cells_of.into_iter().next() {
            return Err(format!("grid cells {:?} reference missing {}", cells, id));
        }

        let bucket_total: usize = self.buckets.values().map(Vec::len).sum();
        if bucket_total != self.entities.len() {
            return Err(format!(
                "buckets hold {} ids but {} entities exist",
                bucket_total,
                self.entities.len()
            ));
        }
        Ok(())
    }

    /// Read-only view for renderers and snapshots
    pub fn snapshot(&self) -> StoreSnapshot<'_> {
        let mut entities: Vec<&Entity> = self.entities.values().collect();
        entities.sort_by_key(|e| e.id);
        StoreSnapshot {
            width: self.width,
            height: self.height,
            entities,
            buckets: EntityKind::ALL
                .iter()
                .map(|k| (k.tag(), self.ids_of(*k)))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreSnapshot<'a> {
    pub width: i32,
    pub height: i32,
    pub entities: Vec<&'a Entity>,
    pub buckets: Vec<(&'static str, &'a [EntityId])>,
}
