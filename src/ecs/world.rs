//! ECS World - manages all entities and their components

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, SkirmishError};
use crate::core::types::{EntityId, Tick};
use crate::ecs::component::{Component, Signature};
use crate::ecs::registry::{ComponentKind, Components};

/// The simulation world: entity registry, typed component storage, and the
/// handful of resources every system may need (time, RNG)
///
/// The world exclusively owns every component. Systems borrow through
/// `get`/`get_mut` for the duration of a call and never hold references
/// across ticks.
pub struct World {
    next_id: u32,
    /// Alive registry; the value is the entity's current shape
    entities: AHashMap<EntityId, Signature>,
    components: Components,
    elapsed: f64,
    current_tick: Tick,
    rng: ChaCha8Rng,
    spawned: Vec<EntityId>,
    despawned: Vec<EntityId>,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            next_id: 1,
            entities: AHashMap::new(),
            components: Components::default(),
            elapsed: 0.0,
            current_tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            spawned: Vec::new(),
            despawned: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Signature::EMPTY);
        self.spawned.push(id);
        id
    }

    /// Remove an entity together with all of its components
    ///
    /// Returns false if the entity was not alive. The entity is invisible to
    /// every later query, including ones issued in the same tick.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        let Some(signature) = self.entities.remove(&entity) else {
            return false;
        };
        for kind in signature.kinds() {
            self.components.remove_kind(entity, kind);
        }
        self.despawned.push(entity);
        true
    }

    #[inline]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn signature_of(&self, entity: EntityId) -> Option<Signature> {
        self.entities.get(&entity).copied()
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach a component, overwriting any existing one of the same kind
    pub fn insert<T: Component>(&mut self, entity: EntityId, component: T) -> Result<()> {
        let signature = self
            .entities
            .get_mut(&entity)
            .ok_or(SkirmishError::EntityNotFound(entity))?;
        *signature = signature.with_kind(T::KIND);
        T::storage_mut(&mut self.components).insert(entity, component);
        Ok(())
    }

    #[inline]
    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        T::storage(&self.components).get(entity)
    }

    #[inline]
    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        T::storage_mut(&mut self.components).get_mut(entity)
    }

    #[inline]
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        T::storage(&self.components).contains(entity)
    }

    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        let removed = T::storage_mut(&mut self.components).remove(entity)?;
        if let Some(signature) = self.entities.get_mut(&entity) {
            *signature = signature.without_kind(T::KIND);
        }
        Some(removed)
    }

    /// Detach a component by kind; returns whether anything was removed
    pub fn remove_kind(&mut self, entity: EntityId, kind: ComponentKind) -> bool {
        let removed = self.components.remove_kind(entity, kind);
        if removed {
            if let Some(signature) = self.entities.get_mut(&entity) {
                *signature = signature.without_kind(kind);
            }
        }
        removed
    }

    /// All entities holding every kind in `signature`, sorted by id
    ///
    /// The result is a snapshot: structural changes made while iterating it
    /// are visible to later queries but not to the returned vector.
    pub fn query(&self, signature: Signature) -> Vec<EntityId> {
        let smallest = signature
            .kinds()
            .min_by_key(|kind| self.components.len_of(*kind));

        let mut result = Vec::new();
        match smallest {
            Some(kind) => self.components.for_each_holder(kind, |entity| {
                if self
                    .entities
                    .get(&entity)
                    .is_some_and(|shape| shape.contains_all(signature))
                {
                    result.push(entity);
                }
            }),
            None => result.extend(self.entities.keys().copied()),
        }
        result.sort_unstable();
        result
    }

    /// Iterate one component kind directly
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        T::storage(&self.components).iter()
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Seconds of simulated time since the world was created
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.current_tick += 1;
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Entities created since the last drain
    pub fn drain_spawned(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.spawned)
    }

    /// Entities destroyed since the last drain
    pub fn drain_despawned(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.despawned)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(0)
    }
}
