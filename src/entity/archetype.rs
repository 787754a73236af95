//! Spawn loadouts: which components each kind of entity starts with
//!
//! Numbers come from the immutable per-archetype config tables; nothing here
//! is re-read after the entity exists.

use crate::ai::facts::Facts;
use crate::ai::goap::agent::GoapAgent;
use crate::ai::utility::arbitrator::UtilityAgent;
use crate::core::config::{BuildingConfig, DecisionConfig, MobConfig};
use crate::core::error::Result;
use crate::core::types::{EntityId, Vec2};
use crate::ecs::world::World;
use crate::entity::body::{
    Archetype, Body, EntityKind, Group, Health, Home, Movement, Position, StatusFlags, Tile,
};
use crate::entity::building::Spawner;
use crate::entity::combat::{AttackIntent, Corpse, Inventory, LootDrop, Lootable, Targetable, Weapon};
use crate::entity::sensing::{LootTarget, Patrol, Senses, TargetedBy, Targeting, Temperament};
use crate::entity::steering::{DesiredMovement, SteeringImpulses};

/// Create a mob with its full decision-making loadout
///
/// The spawn point becomes the mob's home.
pub fn spawn_mob(
    world: &mut World,
    archetype: &str,
    config: &MobConfig,
    position: Vec2,
    group: Group,
) -> Result<EntityId> {
    let entity = world.create_entity();

    world.insert(entity, Position(position))?;
    world.insert(entity, Body { radius: config.radius })?;
    world.insert(
        entity,
        Movement {
            speed: config.speed,
            arrival_distance: config.arrival_distance,
        },
    )?;
    world.insert(entity, Health::new(config.health))?;
    world.insert(entity, group)?;
    world.insert(entity, EntityKind::Mob)?;
    world.insert(entity, Archetype(archetype.to_string()))?;
    world.insert(
        entity,
        Home {
            position,
            radius: config.home_radius,
        },
    )?;
    world.insert(entity, StatusFlags::default())?;

    world.insert(entity, Targetable)?;
    world.insert(entity, TargetedBy::default())?;
    world.insert(entity, Senses::new(config.sensory_radius))?;
    world.insert(entity, Targeting::default())?;
    world.insert(entity, AttackIntent::default())?;
    world.insert(entity, Weapon::from_config(&config.weapon))?;
    world.insert(entity, LootTarget::new(config.pickup_range))?;
    world.insert(entity, Inventory::default())?;
    if config.loot_value > 0 {
        world.insert(entity, LootDrop { value: config.loot_value })?;
    }

    world.insert(entity, Patrol::new(config.patrol_radius, config.patrol_frequency))?;
    world.insert(
        entity,
        Temperament {
            overwhelm_attackers: config.overwhelm_attackers,
            flee_health_fraction: config.flee_health_fraction,
        },
    )?;
    world.insert(entity, SteeringImpulses::default())?;
    world.insert(entity, DesiredMovement::default())?;

    world.insert(entity, Facts::default())?;
    match &config.decision {
        DecisionConfig::Goap { actions, goals } => {
            world.insert(entity, GoapAgent::new(actions.clone(), goals.clone()))?;
        }
        DecisionConfig::Utility { behaviors } => {
            world.insert(entity, UtilityAgent::new(behaviors.clone()))?;
        }
    }

    Ok(entity)
}

/// Create a building; it gets a spawner when its config names a mob
pub fn spawn_building(
    world: &mut World,
    archetype: &str,
    config: &BuildingConfig,
    position: Vec2,
    group: Group,
) -> Result<EntityId> {
    let entity = world.create_entity();

    world.insert(entity, Position(position))?;
    world.insert(entity, Body { radius: config.radius })?;
    world.insert(entity, Health::new(config.health))?;
    world.insert(entity, EntityKind::Building)?;
    world.insert(entity, Archetype(archetype.to_string()))?;
    world.insert(entity, StatusFlags::default())?;
    world.insert(entity, Targetable)?;
    world.insert(entity, TargetedBy::default())?;

    if let Some(mob) = &config.spawns {
        let allies = group
            .friendly
            .iter()
            .copied()
            .filter(|g| *g != group.primary)
            .collect();
        world.insert(
            entity,
            Spawner::new(mob.clone(), config.spawn_interval, config.max_alive, group.primary, allies),
        )?;
    }
    world.insert(entity, group)?;

    Ok(entity)
}

pub fn spawn_loot(world: &mut World, position: Vec2, value: u32, loot_time: f32) -> Result<EntityId> {
    let entity = world.create_entity();
    world.insert(entity, Position(position))?;
    world.insert(entity, EntityKind::Loot)?;
    world.insert(entity, Lootable { value, loot_time })?;
    Ok(entity)
}

pub fn spawn_corpse(world: &mut World, position: Vec2, archetype: Option<Archetype>, lifetime: f32) -> Result<EntityId> {
    let entity = world.create_entity();
    world.insert(entity, Position(position))?;
    world.insert(entity, EntityKind::Corpse)?;
    world.insert(entity, Corpse { remaining: lifetime })?;
    if let Some(archetype) = archetype {
        world.insert(entity, archetype)?;
    }
    Ok(entity)
}

/// Static ground tile, positioned at its center
pub fn spawn_tile(world: &mut World, column: u32, row: u32, tile_size: f32) -> Result<EntityId> {
    let entity = world.create_entity();
    let center = Vec2::new((column as f32 + 0.5) * tile_size, (row as f32 + 0.5) * tile_size);
    world.insert(entity, Position(center))?;
    world.insert(entity, Tile { column, row })?;
    world.insert(entity, EntityKind::Tile)?;
    Ok(entity)
}
