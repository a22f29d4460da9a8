//! Bidirectional ghost reference to entity mapping.

use std::collections::HashMap;

use crate::{Entity, GhostRef};

/// Resolves ghost references to local entities and back.
///
/// A lookup miss is a normal outcome (despawn races) and returns `None`.
#[derive(Debug, Default, Clone)]
pub struct GhostMap {
    by_ghost: HashMap<GhostRef, Entity>,
    by_entity: HashMap<Entity, GhostRef>,
}

impl GhostMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `ghost` with `entity`, replacing any previous mapping of either.
    pub fn insert(&mut self, ghost: GhostRef, entity: Entity) {
        if let Some(old_entity) = self.by_ghost.insert(ghost, entity) {
            self.by_entity.remove(&old_entity);
        }
        if let Some(old_ghost) = self.by_entity.insert(entity, ghost) {
            if old_ghost != ghost {
                self.by_ghost.remove(&old_ghost);
            }
        }
    }

    /// Removes a ghost and returns the entity it mapped to.
    pub fn remove_ghost(&mut self, ghost: &GhostRef) -> Option<Entity> {
        let entity = self.by_ghost.remove(ghost)?;
        self.by_entity.remove(&entity);
        Some(entity)
    }

    /// Removes an entity and returns the ghost it mapped to.
    pub fn remove_entity(&mut self, entity: &Entity) -> Option<GhostRef> {
        let ghost = self.by_entity.remove(entity)?;
        self.by_ghost.remove(&ghost);
        Some(ghost)
    }

    /// Looks up the local entity for a ghost reference.
    #[must_use]
    pub fn entity_for_ghost(&self, ghost: &GhostRef) -> Option<Entity> {
        if ghost.is_null() {
            return None;
        }
        self.by_ghost.get(ghost).copied()
    }

    /// Looks up the ghost reference for a local entity.
    #[must_use]
    pub fn ghost_for_entity(&self, entity: &Entity) -> Option<GhostRef> {
        self.by_entity.get(entity).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ghost.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ghost.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_ghost.clear();
        self.by_entity.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkTick;

    fn ghost(id: i32, spawn: u32) -> GhostRef {
        GhostRef::new(id, NetworkTick::new(spawn))
    }

    #[test]
    fn insert_and_lookup_both_ways() {
        let mut map = GhostMap::new();
        map.insert(ghost(5, 100), Entity::new(1, 0));

        assert_eq!(map.entity_for_ghost(&ghost(5, 100)), Some(Entity::new(1, 0)));
        assert_eq!(map.ghost_for_entity(&Entity::new(1, 0)), Some(ghost(5, 100)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn recycled_ghost_id_misses() {
        let mut map = GhostMap::new();
        map.insert(ghost(5, 100), Entity::new(1, 0));
        assert_eq!(map.entity_for_ghost(&ghost(5, 200)), None);
    }

    #[test]
    fn null_never_resolves() {
        let mut map = GhostMap::new();
        map.insert(GhostRef::NULL, Entity::new(9, 9));
        assert_eq!(map.entity_for_ghost(&GhostRef::NULL), None);
    }

    #[test]
    fn reinsert_replaces_stale_entries() {
        let mut map = GhostMap::new();
        map.insert(ghost(5, 100), Entity::new(1, 0));
        map.insert(ghost(5, 100), Entity::new(2, 0));

        assert_eq!(map.ghost_for_entity(&Entity::new(1, 0)), None);
        assert_eq!(map.entity_for_ghost(&ghost(5, 100)), Some(Entity::new(2, 0)));

        map.insert(ghost(6, 100), Entity::new(2, 0));
        assert_eq!(map.entity_for_ghost(&ghost(5, 100)), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_both_ways() {
        let mut map = GhostMap::new();
        map.insert(ghost(5, 100), Entity::new(1, 0));
        map.insert(ghost(6, 100), Entity::new(2, 0));

        assert_eq!(map.remove_ghost(&ghost(5, 100)), Some(Entity::new(1, 0)));
        assert_eq!(map.ghost_for_entity(&Entity::new(1, 0)), None);

        assert_eq!(map.remove_entity(&Entity::new(2, 0)), Some(ghost(6, 100)));
        assert!(map.is_empty());

        map.insert(ghost(7, 1), Entity::new(3, 0));
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.ghost_for_entity(&Entity::new(3, 0)), None);
    }
}
