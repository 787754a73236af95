//! Weapons, attack intents, loot and corpses

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::WeaponConfig;
use crate::core::types::{EntityId, Vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub damage_min: f32,
    pub damage_max: f32,
    /// Reach beyond both body radii
    pub range: f32,
    /// Seconds after an attack finishes before the next may start
    pub cooldown: f32,
    /// Seconds an attack lasts
    pub attack_duration: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    /// World time (seconds) the most recent attack started
    pub last_attack_time: Option<f64>,
}

/// Outcome of a damage roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub amount: f32,
    pub critical: bool,
}

impl Weapon {
    pub fn from_config(config: &WeaponConfig) -> Self {
        Self {
            damage_min: config.damage_min,
            damage_max: config.damage_max,
            range: config.range,
            cooldown: config.cooldown,
            attack_duration: config.attack_duration,
            crit_chance: config.crit_chance,
            crit_multiplier: config.crit_multiplier,
            last_attack_time: None,
        }
    }

    /// True from the start of an attack until `attack_duration + cooldown`
    /// has fully elapsed
    pub fn is_cooling_down(&self, now: f64) -> bool {
        match self.last_attack_time {
            Some(started) => now <= started + self.attack_duration as f64 + self.cooldown as f64,
            None => false,
        }
    }

    /// True while the attack itself is still playing out
    pub fn is_attacking(&self, now: f64) -> bool {
        self.last_attack_time
            .is_some_and(|started| now < started + self.attack_duration as f64)
    }

    pub fn start_attack(&mut self, now: f64) {
        self.last_attack_time = Some(now);
    }

    /// Whether a body at `to` is within reach of a body at `from`
    pub fn reaches(&self, from: Vec2, from_radius: f32, to: Vec2, to_radius: f32) -> bool {
        from.distance(&to) <= self.range + from_radius + to_radius
    }

    pub fn roll_damage<R: Rng>(&self, rng: &mut R) -> Hit {
        let base = if self.damage_max > self.damage_min {
            rng.gen_range(self.damage_min..=self.damage_max)
        } else {
            self.damage_min
        };
        let critical = self.crit_chance > 0.0 && rng.gen::<f32>() < self.crit_chance;
        let amount = if critical { base * self.crit_multiplier } else { base };
        Hit { amount, critical }
    }
}

/// What the agent wants its weapon to hit; consumed by the weapon system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackIntent {
    pub target: Option<EntityId>,
}

/// Marker: can be selected as an attack target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Targetable;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lootable {
    pub value: u32,
    /// Seconds of looting needed to collect it
    pub loot_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub gold: u32,
}

/// Value left behind as loot when the owner dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDrop {
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corpse {
    /// Seconds until removal
    pub remaining: f32,
}
