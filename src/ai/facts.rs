//! World-state facts: the boolean substrate both decision layers read
//!
//! `Facts` is the per-agent record (a bitset keyed by [`Fact`]);
//! `Conditions` is a partial assignment used for preconditions, effects and
//! goals. [`observe`] derives any fact from the live components, so the
//! planner's fact-update pass and the utility behaviors' state-updaters
//! agree on what each fact means.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::ecs::world::World;
use crate::entity::body::{Body, Health, Home, Movement, Position};
use crate::entity::combat::{AttackIntent, Weapon};
use crate::entity::sensing::{LootTarget, Patrol, Senses, TargetedBy, Targeting, Temperament};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fact {
    HasTarget,
    /// Target is still within sensing radius
    InRangeOfTarget,
    /// Target is within weapon reach
    InRangeToAttack,
    AttackingEnemy,
    Overwhelmed,
    CloseToHome,
    SeeingEnemies,
    SeeingLoot,
    HasLootTarget,
    AtLootTarget,
    Looting,
    HasMoveTarget,
    AtMoveTarget,
    /// En route to a patrol point
    Patrolling,
}

impl Fact {
    pub const ALL: [Fact; 14] = [
        Fact::HasTarget,
        Fact::InRangeOfTarget,
        Fact::InRangeToAttack,
        Fact::AttackingEnemy,
        Fact::Overwhelmed,
        Fact::CloseToHome,
        Fact::SeeingEnemies,
        Fact::SeeingLoot,
        Fact::HasLootTarget,
        Fact::AtLootTarget,
        Fact::Looting,
        Fact::HasMoveTarget,
        Fact::AtMoveTarget,
        Fact::Patrolling,
    ];

    #[inline]
    pub const fn bit(self) -> u32 {
        1u32 << (self as u32)
    }
}

/// Per-agent fact record
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Facts {
    bits: u32,
}

impl Facts {
    pub fn from_pairs(pairs: &[(Fact, bool)]) -> Self {
        let mut facts = Self::default();
        for (fact, value) in pairs {
            facts.set(*fact, *value);
        }
        facts
    }

    #[inline]
    pub fn get(&self, fact: Fact) -> bool {
        self.bits & fact.bit() != 0
    }

    #[inline]
    pub fn set(&mut self, fact: Fact, value: bool) {
        if value {
            self.bits |= fact.bit();
        } else {
            self.bits &= !fact.bit();
        }
    }

    pub fn with(mut self, fact: Fact, value: bool) -> Self {
        self.set(fact, value);
        self
    }
}

impl fmt::Debug for Facts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Fact::ALL.iter().filter(|fact| self.get(**fact)))
            .finish()
    }
}

/// Partial fact assignment: only facts in `mask` are constrained
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Conditions {
    mask: u32,
    values: u32,
}

impl Conditions {
    pub const NONE: Conditions = Conditions { mask: 0, values: 0 };

    pub const fn with(self, fact: Fact, value: bool) -> Self {
        let bit = fact.bit();
        Self {
            mask: self.mask | bit,
            values: if value { self.values | bit } else { self.values & !bit },
        }
    }

    pub fn of(pairs: &[(Fact, bool)]) -> Self {
        pairs
            .iter()
            .fold(Self::NONE, |conditions, (fact, value)| conditions.with(*fact, *value))
    }

    /// Every constrained fact has the required value
    #[inline]
    pub fn satisfied_by(&self, facts: &Facts) -> bool {
        (facts.bits ^ self.values) & self.mask == 0
    }

    /// Overwrite the constrained facts with their required values
    #[inline]
    pub fn apply_to(&self, facts: &Facts) -> Facts {
        Facts {
            bits: (facts.bits & !self.mask) | (self.values & self.mask),
        }
    }

    pub fn get(&self, fact: Fact) -> Option<bool> {
        (self.mask & fact.bit() != 0).then_some(self.values & fact.bit() != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Fact, bool)> + '_ {
        Fact::ALL
            .iter()
            .filter_map(move |fact| self.get(*fact).map(|value| (*fact, value)))
    }
}

impl fmt::Debug for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// ============================================================================
// Observation
// ============================================================================

/// Derive one fact from the entity's live components
///
/// Returns `None` when the entity lacks a component the fact depends on;
/// callers leave such facts untouched.
pub fn observe(world: &World, entity: EntityId, fact: Fact) -> Option<bool> {
    let position = world.get::<Position>(entity)?.0;

    let value = match fact {
        Fact::HasTarget => live_target(world, entity)?.is_some(),
        Fact::InRangeOfTarget => match live_target(world, entity)? {
            Some(target) => {
                let radius = world.get::<Senses>(entity)?.radius;
                world
                    .get::<Position>(target)
                    .is_some_and(|p| p.0.distance(&position) <= radius)
            }
            None => false,
        },
        Fact::InRangeToAttack => match live_target(world, entity)? {
            Some(target) => {
                let weapon = world.get::<Weapon>(entity)?;
                let own_radius = world.get::<Body>(entity).map_or(0.0, |b| b.radius);
                let target_radius = world.get::<Body>(target).map_or(0.0, |b| b.radius);
                world
                    .get::<Position>(target)
                    .is_some_and(|p| weapon.reaches(position, own_radius, p.0, target_radius))
            }
            None => false,
        },
        Fact::AttackingEnemy => world
            .get::<AttackIntent>(entity)?
            .target
            .is_some_and(|target| world.is_alive(target)),
        Fact::Overwhelmed => {
            let temperament = world.get::<Temperament>(entity)?;
            let attackers = world.get::<TargetedBy>(entity).map_or(0, |t| t.count());
            let health = world.get::<Health>(entity).map_or(1.0, |h| h.fraction());
            (temperament.overwhelm_attackers > 0 && attackers >= temperament.overwhelm_attackers)
                || health < temperament.flee_health_fraction
        }
        Fact::CloseToHome => world.get::<Home>(entity)?.contains(position),
        Fact::SeeingEnemies => !world.get::<Senses>(entity)?.targetables_in_range.is_empty(),
        Fact::SeeingLoot => !world.get::<Senses>(entity)?.lootables_in_range.is_empty(),
        Fact::HasLootTarget => world
            .get::<LootTarget>(entity)?
            .target
            .is_some_and(|loot| world.is_alive(loot)),
        Fact::AtLootTarget => {
            let loot = world.get::<LootTarget>(entity)?;
            let reach = loot.pickup_range + world.get::<Body>(entity).map_or(0.0, |b| b.radius);
            match loot.target.filter(|l| world.is_alive(*l)) {
                Some(target) => world
                    .get::<Position>(target)
                    .is_some_and(|p| p.0.distance(&position) <= reach),
                None => false,
            }
        }
        Fact::Looting => {
            let loot = world.get::<LootTarget>(entity)?;
            loot.is_looting() && loot.target.is_some_and(|l| world.is_alive(l))
        }
        Fact::HasMoveTarget => world.get::<Patrol>(entity)?.move_target.is_some(),
        Fact::AtMoveTarget => at_move_target(world, entity, position)?,
        Fact::Patrolling => {
            world.get::<Patrol>(entity)?.move_target.is_some() && !at_move_target(world, entity, position)?
        }
    };

    Some(value)
}

/// Refresh every fact the entity has components for
pub fn observe_all(world: &World, entity: EntityId, facts: &mut Facts) {
    observe_into(world, entity, &Fact::ALL, facts);
}

/// Refresh only the listed facts
pub fn observe_into(world: &World, entity: EntityId, which: &[Fact], facts: &mut Facts) {
    for fact in which {
        if let Some(value) = observe(world, entity, *fact) {
            facts.set(*fact, value);
        }
    }
}

/// `Some(None)` = has Targeting but no live target; `None` = no Targeting
fn live_target(world: &World, entity: EntityId) -> Option<Option<EntityId>> {
    let targeting = world.get::<Targeting>(entity)?;
    Some(targeting.target.filter(|t| world.is_alive(*t)))
}

fn at_move_target(world: &World, entity: EntityId, position: crate::core::types::Vec2) -> Option<bool> {
    let patrol = world.get::<Patrol>(entity)?;
    let arrival = world.get::<Movement>(entity).map_or(1.0, |m| m.arrival_distance);
    Some(
        patrol
            .move_target
            .is_some_and(|target| target.distance(&position) <= arrival),
    )
}
