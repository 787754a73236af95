//! Buildings that periodically produce mobs

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, GroupId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    /// Mob archetype produced
    pub archetype: String,
    pub interval: f32,
    pub max_alive: usize,
    /// Seconds since the last spawn
    pub elapsed: f32,
    pub group: GroupId,
    pub allies: Vec<GroupId>,
    /// Mobs produced so far; dead ones are pruned on every spawner pass
    pub spawned: Vec<EntityId>,
}

impl Spawner {
    pub fn new(archetype: impl Into<String>, interval: f32, max_alive: usize, group: GroupId, allies: Vec<GroupId>) -> Self {
        Self {
            archetype: archetype.into(),
            interval,
            max_alive,
            elapsed: 0.0,
            group,
            allies,
            spawned: Vec::new(),
        }
    }

    /// Advance the timer; true when a spawn is due and capacity allows it
    pub fn tick(&mut self, dt: f32, alive: usize) -> bool {
        if alive >= self.max_alive {
            self.elapsed = 0.0;
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}
