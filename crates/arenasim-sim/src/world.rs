//! Entity ID <-> hecs handle registry. The world itself is the single
//! source of truth for entity state; every other subsystem
//! holds only the string ID and looks up through this registry or a
//! frozen per-tick snapshot, never a direct `hecs::Entity` stashed
//! elsewhere.

use std::collections::HashMap;

use arenasim_core::EntityId;

#[derive(Default)]
pub struct EntityRegistry {
    by_id: HashMap<EntityId, hecs::Entity>,
}

impl EntityRegistry {
    pub fn insert(&mut self, id: EntityId, entity: hecs::Entity) {
        self.by_id.insert(id, entity);
    }

    pub fn remove(&mut self, id: &str) -> Option<hecs::Entity> {
        self.by_id.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<hecs::Entity> {
        self.by_id.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.by_id.keys()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
