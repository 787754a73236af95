//! Sensing, targeting and per-agent activity state
//!
//! Anything an activity needs to remember between ticks ("currently looting
//! X", "walking to patrol point P") lives here rather than on the shared
//! action/behavior templates.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Vec2};

/// What the agent currently perceives, rebuilt by the sensing system
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Senses {
    pub radius: f32,
    /// Hostile targetables within `radius`, nearest first
    pub targetables_in_range: Vec<EntityId>,
    /// Lootables within `radius`, nearest first
    pub lootables_in_range: Vec<EntityId>,
}

impl Senses {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Targeting {
    pub target: Option<EntityId>,
    /// Last known position of `target`, refreshed every tick
    pub target_position: Option<Vec2>,
}

impl Targeting {
    pub fn set(&mut self, target: EntityId, position: Vec2) {
        self.target = Some(target);
        self.target_position = Some(position);
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.target_position = None;
    }
}

/// Entities that have this one as their target this tick
///
/// Derived data: cleared at the start of every tick and repopulated by
/// target tracking, so it can never hold a destroyed attacker for longer
/// than the tick it died in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetedBy {
    pub attackers: Vec<EntityId>,
}

impl TargetedBy {
    pub fn count(&self) -> usize {
        self.attackers.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LootTarget {
    pub target: Option<EntityId>,
    pub position: Option<Vec2>,
    /// Seconds spent looting the current target
    pub progress: f32,
    /// Distance at which looting can start
    pub pickup_range: f32,
}

impl LootTarget {
    pub fn new(pickup_range: f32) -> Self {
        Self {
            pickup_range,
            ..Default::default()
        }
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.position = None;
        self.progress = 0.0;
    }

    pub fn is_looting(&self) -> bool {
        self.target.is_some() && self.progress > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Patrol {
    /// Patrol points are sampled within this distance of home
    pub radius: f32,
    /// Patrol points per second; its inverse is the linger time
    pub frequency: f32,
    pub move_target: Option<Vec2>,
    /// Seconds spent at the reached move target
    pub lingered: f32,
}

impl Patrol {
    pub fn new(radius: f32, frequency: f32) -> Self {
        Self {
            radius,
            frequency,
            ..Default::default()
        }
    }

    pub fn linger_time(&self) -> f32 {
        if self.frequency > 0.0 {
            1.0 / self.frequency
        } else {
            f32::INFINITY
        }
    }

    pub fn clear(&mut self) {
        self.move_target = None;
        self.lingered = 0.0;
    }
}

/// Thresholds that decide when an agent feels overwhelmed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperament {
    pub overwhelm_attackers: usize,
    pub flee_health_fraction: f32,
}
