//! Entity lifecycle helpers
//!
//! Every mutation that touches position, type or holding relations goes
//! through here so the store's grid and type buckets stay in step with the
//! entity table.

use crate::core::error::{ColonyError, Result};
use crate::core::types::{EntityId, GridPos};
use crate::entity::kind::EntityKind;
use crate::spatial::store::SpatialStore;

/// Move an entity between type buckets when it morphs (egg to larva, ...).
/// Id and grid placement are untouched.
pub fn change_entity_type(
    store: &mut SpatialStore,
    id: EntityId,
    old_kind: EntityKind,
    new_kind: EntityKind,
) -> Result<()> {
    let current = store.get(id).ok_or(ColonyError::EntityNotFound(id))?.kind;
    debug_assert_eq!(current, old_kind, "{} is {} not {}", id, current, old_kind);
    store.retype_entity(id, new_kind);
    tracing::debug!("{} changed type {} -> {}", id, old_kind, new_kind);
    Ok(())
}

/// Attach `target` to `ant`. Small entities leave the grid while carried;
/// big entities stay placed until enough holders lift them.
pub fn pick_up_entity(store: &mut SpatialStore, ant_id: EntityId, target_id: EntityId) -> Result<()> {
    let ant = store.get(ant_id).ok_or(ColonyError::EntityNotFound(ant_id))?;
    let ant_state = ant.ant().ok_or(ColonyError::NotAnAnt(ant_id))?;
    if ant_state.holding.is_some() {
        return Err(ColonyError::AlreadyHolding(ant_id));
    }
    let target = store.get(target_id).ok_or(ColonyError::EntityNotFound(target_id))?;
    if target.held_by.len() >= target.to_lift {
        return Err(ColonyError::LiftFull(target_id));
    }
    let big = target.is_big();

    if let Some(ant) = store.get_mut(ant_id).and_then(|e| e.ant_mut()) {
        ant.holding = Some(target_id);
    }
    if let Some(target) = store.get_mut(target_id) {
        target.held_by.push(ant_id);
    }
    if !big {
        store.unplace_entity(target_id);
    }
    Ok(())
}

/// Detach whatever `ant` holds, placing it at the ant's cell if it had been
/// taken off the grid. Returns the released entity.
pub fn put_down_entity(store: &mut SpatialStore, ant_id: EntityId) -> Result<EntityId> {
    let ant = store.get(ant_id).ok_or(ColonyError::EntityNotFound(ant_id))?;
    let ant_pos = ant.position;
    let target_id = ant
        .ant()
        .ok_or(ColonyError::NotAnAnt(ant_id))?
        .holding
        .ok_or(ColonyError::NotHolding(ant_id))?;

    if let Some(ant) = store.get_mut(ant_id).and_then(|e| e.ant_mut()) {
        ant.holding = None;
        ant.lead_holder = false;
    }

    let needs_placing = match store.get_mut(target_id) {
        Some(target) => {
            target.held_by.retain(|&h| h != ant_id);
            target.lifted = false;
            target.position.is_none()
        }
        None => false,
    };
    if needs_placing {
        if let Some(pos) = ant_pos {
            store.move_entity(target_id, pos);
        }
    }
    Ok(target_id)
}

/// Move `id` to `pos` if the whole footprint stays in the world and, unless
/// `force` is set, no `blocking` entity is in the way. Returns whether the
/// move happened.
pub fn maybe_move_entity(
    store: &mut SpatialStore,
    id: EntityId,
    pos: GridPos,
    force: bool,
    blocking: &[EntityKind],
) -> bool {
    let Some(entity) = store.get(id) else {
        return false;
    };
    if entity.position.is_none() {
        return false;
    }
    let rect = entity.rect_at(pos);
    if !store.inside_world(rect.position)
        || !store.inside_world(GridPos::new(rect.max_x(), rect.max_y()))
    {
        return false;
    }
    if !force && store.blocker_in(&rect, blocking, Some(id)).is_some() {
        return false;
    }
    store.move_entity(id, pos);
    true
}
