//! Sparse per-kind component storage

use ahash::AHashMap;

use crate::core::types::EntityId;

/// Sparse map from entity to one component value
///
/// Each component kind gets its own storage, so attach/lookup/detach are
/// O(1) and no runtime type tags are involved.
#[derive(Debug, Clone)]
pub struct ComponentStorage<T> {
    items: AHashMap<EntityId, T>,
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self {
            items: AHashMap::new(),
        }
    }
}

impl<T> ComponentStorage<T> {
    /// Attach a value, returning the one it replaced
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        self.items.insert(entity, value)
    }

    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.items.get(&entity)
    }

    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.items.get_mut(&entity)
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        self.items.remove(&entity)
    }

    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.items.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.items.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.items.iter().map(|(id, value)| (*id, value))
    }
}
