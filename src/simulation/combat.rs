//! Weapons, death, corpse decay and building spawners

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::ai::activities::is_hostile;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Vec2};
use crate::ecs::component::Signature;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::entity::archetype::{spawn_corpse, spawn_loot, spawn_mob};
use crate::entity::body::{Archetype, Body, Group, Health, Position, StatusFlags};
use crate::entity::building::Spawner;
use crate::entity::combat::{AttackIntent, Corpse, LootDrop, Weapon};

/// Seconds needed to loot a dropped corpse bag
const DROPPED_LOOT_TIME: f32 = 1.0;

/// Starts attacks for agents whose intent target is in reach
///
/// Damage lands the tick the attack starts.
pub struct WeaponSystem;

impl System for WeaponSystem {
    fn name(&self) -> &'static str {
        "weapons"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY
            .with::<Weapon>()
            .with::<AttackIntent>()
            .with::<Position>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        let now = world.elapsed();

        for entity in entities {
            let Some(weapon) = world.get::<Weapon>(*entity) else {
                continue;
            };
            let swinging = weapon.is_attacking(now);
            if swinging {
                if let Some(flags) = world.get_mut::<StatusFlags>(*entity) {
                    flags.attacking = true;
                }
            }

            let Some(target) = world.get::<AttackIntent>(*entity).and_then(|a| a.target) else {
                continue;
            };
            if !world.is_alive(target) || !is_hostile(world, *entity, target) {
                continue;
            }
            let (Some(origin), Some(destination), Some(weapon)) = (
                world.get::<Position>(*entity).map(|p| p.0),
                world.get::<Position>(target).map(|p| p.0),
                world.get::<Weapon>(*entity),
            ) else {
                continue;
            };
            let own_radius = world.get::<Body>(*entity).map_or(0.0, |b| b.radius);
            let target_radius = world.get::<Body>(target).map_or(0.0, |b| b.radius);
            if weapon.is_cooling_down(now) || !weapon.reaches(origin, own_radius, destination, target_radius) {
                continue;
            }

            let mut weapon = weapon.clone();
            let hit = weapon.roll_damage(world.rng());
            weapon.start_attack(now);
            if let Some(stored) = world.get_mut::<Weapon>(*entity) {
                *stored = weapon;
            }

            if let Some(flags) = world.get_mut::<StatusFlags>(*entity) {
                flags.attacking = true;
            }
            if let Some(health) = world.get_mut::<Health>(target) {
                health.apply_damage(hit.amount);
            }
            if let Some(flags) = world.get_mut::<StatusFlags>(target) {
                flags.damage_taken = true;
            }
            debug!(attacker = %entity, %target, damage = hit.amount, critical = hit.critical, "attack landed");
        }
    }
}

/// Removes entities whose health ran out, leaving a corpse and any loot
pub struct DeathSystem {
    corpse_lifetime: f32,
}

impl DeathSystem {
    pub fn new(corpse_lifetime: f32) -> Self {
        Self { corpse_lifetime }
    }
}

impl System for DeathSystem {
    fn name(&self) -> &'static str {
        "death"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Health>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            if !world.get::<Health>(*entity).is_some_and(|h| h.is_dead()) {
                continue;
            }
            let position = world.get::<Position>(*entity).map(|p| p.0);
            let archetype = world.get::<Archetype>(*entity).cloned();
            let drop = world.get::<LootDrop>(*entity).copied();

            world.destroy_entity(*entity);
            info!(
                %entity,
                archetype = archetype.as_ref().map(|a| a.0.as_str()),
                "entity died"
            );

            let Some(position) = position else {
                continue;
            };
            if let Err(err) = spawn_corpse(world, position, archetype, self.corpse_lifetime) {
                warn!(%entity, "failed to leave a corpse: {}", err);
            }
            if let Some(drop) = drop {
                if let Err(err) = spawn_loot(world, position, drop.value, DROPPED_LOOT_TIME) {
                    warn!(%entity, "failed to drop loot: {}", err);
                }
            }
        }
    }
}

/// Counts corpses down and removes them when they expire
pub struct CorpseDecay;

impl System for CorpseDecay {
    fn name(&self) -> &'static str {
        "corpse_decay"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Corpse>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32) {
        for entity in entities {
            let expired = match world.get_mut::<Corpse>(*entity) {
                Some(corpse) => {
                    corpse.remaining -= dt;
                    corpse.remaining <= 0.0
                }
                None => false,
            };
            if expired {
                world.destroy_entity(*entity);
            }
        }
    }
}

/// Lets buildings produce mobs on their configured cadence
pub struct SpawnerSystem {
    config: Arc<SimulationConfig>,
}

impl SpawnerSystem {
    pub fn new(config: Arc<SimulationConfig>) -> Self {
        Self { config }
    }
}

impl System for SpawnerSystem {
    fn name(&self) -> &'static str {
        "spawners"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Spawner>().with::<Position>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32) {
        for entity in entities {
            let Some(mut spawner) = world.get::<Spawner>(*entity).cloned() else {
                continue;
            };
            spawner.spawned.retain(|mob| world.is_alive(*mob));

            if spawner.tick(dt, spawner.spawned.len()) {
                match self.spawn_from(world, *entity, &spawner) {
                    Ok(mob) => {
                        debug!(building = %entity, %mob, archetype = %spawner.archetype, "spawned mob");
                        spawner.spawned.push(mob);
                    }
                    Err(err) => warn!(building = %entity, "spawner failed: {}", err),
                }
            }

            if let Some(stored) = world.get_mut::<Spawner>(*entity) {
                *stored = spawner;
            }
        }
    }
}

impl SpawnerSystem {
    fn spawn_from(&self, world: &mut World, building: EntityId, spawner: &Spawner) -> Result<EntityId> {
        let mob = self.config.mob(&spawner.archetype)?;
        let center = world.get::<Position>(building).map_or(Vec2::ZERO, |p| p.0);
        let clearance = world.get::<Body>(building).map_or(0.0, |b| b.radius) + mob.radius;

        let angle = world.rng().gen_range(0.0..std::f32::consts::TAU);
        let position = center + Vec2::new(angle.cos(), angle.sin()) * clearance;
        let group = Group::new(spawner.group, spawner.allies.iter().copied());

        spawn_mob(world, &spawner.archetype, mob, position, group)
    }
}
