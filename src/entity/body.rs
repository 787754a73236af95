//! Physical and identity components shared by every kind of entity

use serde::{Deserialize, Serialize};

use crate::core::types::{GroupId, Vec2};

/// World position, written once per tick from the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// Physical body; the radius is handed to the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// World units per second
    pub speed: f32,
    /// Distance at which a move target counts as reached
    pub arrival_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// 0.0 = dead, 1.0 = unhurt
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            (self.current / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtract damage, never below zero
    pub fn apply_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }
}

/// Faction membership
///
/// `friendly` always includes `primary`; anything whose primary group is
/// outside that set is a valid target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub primary: GroupId,
    pub friendly: Vec<GroupId>,
}

impl Group {
    pub fn new(primary: GroupId, allies: impl IntoIterator<Item = GroupId>) -> Self {
        let mut friendly = vec![primary];
        for ally in allies {
            if !friendly.contains(&ally) {
                friendly.push(ally);
            }
        }
        Self { primary, friendly }
    }

    pub fn is_hostile_to(&self, other: &Group) -> bool {
        !self.friendly.contains(&other.primary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Mob,
    Building,
    Loot,
    Corpse,
    Tile,
}

/// Configuration name the entity was created from ("orc", "barracks", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Home {
    pub position: Vec2,
    /// Distance from `position` that still counts as home
    pub radius: f32,
}

impl Home {
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance(&point) <= self.radius
    }
}

/// Animation-relevant flags exposed to the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags {
    pub moving: bool,
    pub attacking: bool,
    /// Set the tick damage lands, cleared at the start of the next tick
    pub damage_taken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub column: u32,
    pub row: u32,
}
