//! World mutations shared by planner actions and utility behaviors
//!
//! Both decision strategies end up doing the same handful of things: pick a
//! target, walk somewhere, set an attack intent, collect loot. Each of those
//! lives here once. Every function tolerates missing components and dead
//! references by doing nothing.

use ordered_float::OrderedFloat;
use rand::Rng;
use tracing::debug;

use crate::core::types::{EntityId, Vec2};
use crate::ecs::world::World;
use crate::entity::body::{Body, Group, Home, Position};
use crate::entity::combat::{AttackIntent, Inventory, Lootable, Weapon};
use crate::entity::sensing::{LootTarget, Patrol, Senses, Targeting};
use crate::entity::steering::SteeringImpulses;

// ============================================================================
// Helpers
// ============================================================================

pub fn position_of(world: &World, entity: EntityId) -> Option<Vec2> {
    world.get::<Position>(entity).map(|p| p.0)
}

/// Whether `a` may attack `b`
///
/// Entities without a faction are hostile to everyone but themselves.
pub fn is_hostile(world: &World, a: EntityId, b: EntityId) -> bool {
    match (world.get::<Group>(a), world.get::<Group>(b)) {
        (Some(ga), Some(gb)) => ga.is_hostile_to(gb),
        _ => a != b,
    }
}

/// Nearest live candidate accepted by `accept`, measured from `entity`
pub fn nearest(
    world: &World,
    entity: EntityId,
    candidates: &[EntityId],
    accept: impl Fn(EntityId) -> bool,
) -> Option<(EntityId, Vec2)> {
    let origin = position_of(world, entity)?;
    candidates
        .iter()
        .filter(|c| **c != entity && world.is_alive(**c) && accept(**c))
        .filter_map(|c| position_of(world, *c).map(|p| (*c, p)))
        .min_by_key(|(c, p)| (OrderedFloat(p.distance_squared(&origin)), *c))
}

/// Add a unit impulse from the entity towards `point`
pub fn steer_towards(world: &mut World, entity: EntityId, point: Vec2) {
    let Some(origin) = position_of(world, entity) else {
        return;
    };
    let direction = origin.direction_to(&point);
    if let Some(steering) = world.get_mut::<SteeringImpulses>(entity) {
        steering.push(direction);
    }
}

fn steer_away(world: &mut World, entity: EntityId, point: Vec2) {
    let Some(origin) = position_of(world, entity) else {
        return;
    };
    let direction = point.direction_to(&origin);
    if let Some(steering) = world.get_mut::<SteeringImpulses>(entity) {
        steering.push(direction);
    }
}

fn live_target(world: &World, entity: EntityId) -> Option<EntityId> {
    world
        .get::<Targeting>(entity)?
        .target
        .filter(|t| world.is_alive(*t))
}

// ============================================================================
// Targets
// ============================================================================

/// Pick the nearest hostile the entity currently senses
pub fn acquire_target(world: &mut World, entity: EntityId) -> bool {
    let Some(senses) = world.get::<Senses>(entity) else {
        return false;
    };
    let found = nearest(world, entity, &senses.targetables_in_range, |c| is_hostile(world, entity, c));
    match (found, world.get_mut::<Targeting>(entity)) {
        (Some((target, position)), Some(targeting)) => {
            targeting.set(target, position);
            true
        }
        _ => false,
    }
}

pub fn chase_target(world: &mut World, entity: EntityId) {
    let Some(target) = live_target(world, entity) else {
        return;
    };
    if let Some(position) = position_of(world, target) {
        steer_towards(world, entity, position);
    }
}

/// Aim the weapon at the current target, closing in while out of reach
pub fn engage_target(world: &mut World, entity: EntityId) -> bool {
    let Some(target) = live_target(world, entity) else {
        return false;
    };
    let (Some(origin), Some(destination)) = (position_of(world, entity), position_of(world, target)) else {
        return false;
    };

    let in_reach = world.get::<Weapon>(entity).is_some_and(|weapon| {
        let own = world.get::<Body>(entity).map_or(0.0, |b| b.radius);
        let theirs = world.get::<Body>(target).map_or(0.0, |b| b.radius);
        weapon.reaches(origin, own, destination, theirs)
    });
    if !in_reach {
        steer_towards(world, entity, destination);
    }

    match world.get_mut::<AttackIntent>(entity) {
        Some(intent) => {
            intent.target = Some(target);
            true
        }
        None => false,
    }
}

pub fn cancel_attack(world: &mut World, entity: EntityId) {
    if let Some(intent) = world.get_mut::<AttackIntent>(entity) {
        intent.target = None;
    }
}

// ============================================================================
// Home
// ============================================================================

/// Drop the fight and run home, away from whoever is chasing
pub fn flee_home(world: &mut World, entity: EntityId) {
    cancel_attack(world, entity);
    if let Some(home) = world.get::<Home>(entity).copied() {
        steer_towards(world, entity, home.position);
    }
    if let Some(threat) = live_target(world, entity).and_then(|t| position_of(world, t)) {
        steer_away(world, entity, threat);
    }
}

pub fn return_home(world: &mut World, entity: EntityId) {
    if let Some(home) = world.get::<Home>(entity).copied() {
        steer_towards(world, entity, home.position);
    }
}

// ============================================================================
// Patrol
// ============================================================================

/// Choose a random point within the patrol radius of home
pub fn pick_patrol_point(world: &mut World, entity: EntityId) -> Option<Vec2> {
    let radius = world.get::<Patrol>(entity)?.radius;
    let center = match world.get::<Home>(entity) {
        Some(home) => home.position,
        None => position_of(world, entity)?,
    };

    let rng = world.rng();
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius * rng.gen::<f32>().sqrt();
    let point = center + Vec2::new(angle.cos(), angle.sin()) * distance;

    let patrol = world.get_mut::<Patrol>(entity)?;
    patrol.move_target = Some(point);
    patrol.lingered = 0.0;
    Some(point)
}

pub fn move_to_patrol_point(world: &mut World, entity: EntityId) {
    let Some(point) = world.get::<Patrol>(entity).and_then(|p| p.move_target) else {
        return;
    };
    steer_towards(world, entity, point);
}

pub fn cancel_patrol(world: &mut World, entity: EntityId) {
    if let Some(patrol) = world.get_mut::<Patrol>(entity) {
        patrol.clear();
    }
}

// ============================================================================
// Loot
// ============================================================================

/// Pick the nearest sensed loot as the loot target
pub fn select_loot(world: &mut World, entity: EntityId) -> bool {
    let Some(senses) = world.get::<Senses>(entity) else {
        return false;
    };
    let found = nearest(world, entity, &senses.lootables_in_range, |c| world.has::<Lootable>(c));
    match (found, world.get_mut::<LootTarget>(entity)) {
        (Some((loot, position)), Some(loot_target)) => {
            loot_target.clear();
            loot_target.target = Some(loot);
            loot_target.position = Some(position);
            true
        }
        _ => false,
    }
}

pub fn move_to_loot(world: &mut World, entity: EntityId) {
    let Some(position) = world.get::<LootTarget>(entity).and_then(|l| l.position) else {
        return;
    };
    steer_towards(world, entity, position);
}

/// Spend `dt` looting; returns the gold collected once the loot is done
pub fn progress_loot(world: &mut World, entity: EntityId, dt: f32) -> Option<u32> {
    let target = world.get::<LootTarget>(entity)?.target?;
    let Some(lootable) = world.get::<Lootable>(target).copied() else {
        cancel_loot(world, entity);
        return None;
    };

    let loot_target = world.get_mut::<LootTarget>(entity)?;
    loot_target.progress += dt.max(f32::EPSILON);
    if loot_target.progress < lootable.loot_time {
        return None;
    }

    loot_target.clear();
    world.destroy_entity(target);
    if let Some(inventory) = world.get_mut::<Inventory>(entity) {
        inventory.gold += lootable.value;
    }
    debug!(%entity, loot = %target, value = lootable.value, "loot collected");
    Some(lootable.value)
}

pub fn cancel_loot(world: &mut World, entity: EntityId) {
    if let Some(loot_target) = world.get_mut::<LootTarget>(entity) {
        loot_target.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GroupId;

    fn agent(world: &mut World, at: Vec2, group: u16) -> EntityId {
        let e = world.create_entity();
        world.insert(e, Position(at)).unwrap();
        world.insert(e, Group::new(GroupId(group), [])).unwrap();
        world.insert(e, SteeringImpulses::default()).unwrap();
        world.insert(e, Targeting::default()).unwrap();
        world.insert(e, AttackIntent::default()).unwrap();
        e
    }

    #[test]
    fn test_acquire_nearest_hostile() {
        let mut world = World::new(1);
        let me = agent(&mut world, Vec2::ZERO, 1);
        let friend = agent(&mut world, Vec2::new(1.0, 0.0), 1);
        let far = agent(&mut world, Vec2::new(50.0, 0.0), 2);
        let near = agent(&mut world, Vec2::new(10.0, 0.0), 2);
        world
            .insert(
                me,
                Senses {
                    radius: 100.0,
                    targetables_in_range: vec![friend, far, near],
                    lootables_in_range: vec![],
                },
            )
            .unwrap();

        assert!(acquire_target(&mut world, me));
        assert_eq!(world.get::<Targeting>(me).unwrap().target, Some(near));
    }

    #[test]
    fn test_engage_sets_intent_and_closes_in() {
        let mut world = World::new(1);
        let me = agent(&mut world, Vec2::ZERO, 1);
        let enemy = agent(&mut world, Vec2::new(100.0, 0.0), 2);
        world.get_mut::<Targeting>(me).unwrap().set(enemy, Vec2::new(100.0, 0.0));
        world
            .insert(
                me,
                Weapon::from_config(&crate::core::config::WeaponConfig::default()),
            )
            .unwrap();

        assert!(engage_target(&mut world, me));
        assert_eq!(world.get::<AttackIntent>(me).unwrap().target, Some(enemy));
        let steering = world.get::<SteeringImpulses>(me).unwrap();
        assert_eq!(steering.resolve(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_engage_dead_target_does_nothing() {
        let mut world = World::new(1);
        let me = agent(&mut world, Vec2::ZERO, 1);
        let enemy = agent(&mut world, Vec2::new(10.0, 0.0), 2);
        world.get_mut::<Targeting>(me).unwrap().set(enemy, Vec2::new(10.0, 0.0));
        world.destroy_entity(enemy);
        assert!(!engage_target(&mut world, me));
        assert_eq!(world.get::<AttackIntent>(me).unwrap().target, None);
    }

    #[test]
    fn test_patrol_point_within_radius_of_home() {
        let mut world = World::new(9);
        let me = agent(&mut world, Vec2::new(500.0, 500.0), 1);
        world
            .insert(
                me,
                Home {
                    position: Vec2::new(100.0, 100.0),
                    radius: 10.0,
                },
            )
            .unwrap();
        world.insert(me, Patrol::new(50.0, 1.0)).unwrap();

        for _ in 0..20 {
            let point = pick_patrol_point(&mut world, me).unwrap();
            assert!(point.distance(&Vec2::new(100.0, 100.0)) <= 50.0 + 1e-3);
        }
    }

    #[test]
    fn test_loot_collected_after_loot_time() {
        let mut world = World::new(1);
        let me = agent(&mut world, Vec2::ZERO, 1);
        world.insert(me, Inventory::default()).unwrap();
        world.insert(me, LootTarget::new(20.0)).unwrap();

        let loot = world.create_entity();
        world.insert(loot, Position(Vec2::new(5.0, 0.0))).unwrap();
        world
            .insert(
                loot,
                Lootable {
                    value: 7,
                    loot_time: 1.0,
                },
            )
            .unwrap();
        world
            .insert(
                me,
                Senses {
                    radius: 100.0,
                    targetables_in_range: vec![],
                    lootables_in_range: vec![loot],
                },
            )
            .unwrap();

        assert!(select_loot(&mut world, me));
        assert_eq!(progress_loot(&mut world, me, 0.6), None);
        assert!(world.get::<LootTarget>(me).unwrap().is_looting());
        assert_eq!(progress_loot(&mut world, me, 0.6), Some(7));

        assert!(!world.is_alive(loot));
        assert_eq!(world.get::<Inventory>(me).unwrap().gold, 7);
        assert_eq!(world.get::<LootTarget>(me).unwrap().target, None);
    }

    #[test]
    fn test_loot_vanishing_clears_target() {
        let mut world = World::new(1);
        let me = agent(&mut world, Vec2::ZERO, 1);
        world.insert(me, LootTarget::new(20.0)).unwrap();
        let loot = world.create_entity();
        {
            let loot_target = world.get_mut::<LootTarget>(me).unwrap();
            loot_target.target = Some(loot);
            loot_target.progress = 0.5;
        }
        world.destroy_entity(loot);
        assert_eq!(progress_loot(&mut world, me, 0.1), None);
        assert!(!world.get::<LootTarget>(me).unwrap().is_looting());
    }
}
