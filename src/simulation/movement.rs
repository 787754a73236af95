//! Patrol linger timers and locomotion

use crate::core::types::EntityId;
use crate::ecs::component::Signature;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::entity::body::{Movement, Position, StatusFlags};
use crate::entity::sensing::Patrol;
use crate::entity::steering::{DesiredMovement, SteeringImpulses};

/// Lingers at a reached patrol point, then frees it so a new one is picked
pub struct PatrolSystem;

impl System for PatrolSystem {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Patrol>().with::<Position>().with::<Movement>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32) {
        for entity in entities {
            let (Some(position), Some(arrival)) = (
                world.get::<Position>(*entity).map(|p| p.0),
                world.get::<Movement>(*entity).map(|m| m.arrival_distance),
            ) else {
                continue;
            };
            let Some(patrol) = world.get_mut::<Patrol>(*entity) else {
                continue;
            };
            let Some(target) = patrol.move_target else {
                continue;
            };
            if target.distance(&position) > arrival {
                continue;
            }
            patrol.lingered += dt;
            if patrol.lingered >= patrol.linger_time() {
                patrol.clear();
            }
        }
    }
}

/// Sums the tick's impulses into the movement request for physics
pub struct Locomotion;

impl System for Locomotion {
    fn name(&self) -> &'static str {
        "locomotion"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY
            .with::<SteeringImpulses>()
            .with::<DesiredMovement>()
            .with::<Movement>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let (Some(direction), Some(speed)) = (
                world.get::<SteeringImpulses>(*entity).map(|s| s.resolve()),
                world.get::<Movement>(*entity).map(|m| m.speed),
            ) else {
                continue;
            };
            if let Some(desired) = world.get_mut::<DesiredMovement>(*entity) {
                desired.direction = direction;
                desired.speed = if direction.is_zero() { 0.0 } else { speed };
            }
            if let Some(flags) = world.get_mut::<StatusFlags>(*entity) {
                flags.moving = !direction.is_zero();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;

    #[test]
    fn test_patrol_point_freed_after_linger() {
        let mut world = World::new(1);
        let e = world.create_entity();
        world.insert(e, Position(Vec2::new(100.0, 0.0))).unwrap();
        world
            .insert(
                e,
                Movement {
                    speed: 10.0,
                    arrival_distance: 5.0,
                },
            )
            .unwrap();
        let mut patrol = Patrol::new(50.0, 2.0);
        patrol.move_target = Some(Vec2::new(102.0, 0.0));
        world.insert(e, patrol).unwrap();

        let entities = [e];
        PatrolSystem.run(&mut world, &entities, 0.3);
        assert!(world.get::<Patrol>(e).unwrap().move_target.is_some());
        PatrolSystem.run(&mut world, &entities, 0.3);
        assert!(world.get::<Patrol>(e).unwrap().move_target.is_none());
    }

    #[test]
    fn test_locomotion_resolves_impulses() {
        let mut world = World::new(1);
        let e = world.create_entity();
        let mut steering = SteeringImpulses::default();
        steering.push(Vec2::new(3.0, 0.0));
        world.insert(e, steering).unwrap();
        world.insert(e, DesiredMovement::default()).unwrap();
        world
            .insert(
                e,
                Movement {
                    speed: 80.0,
                    arrival_distance: 5.0,
                },
            )
            .unwrap();
        world.insert(e, StatusFlags::default()).unwrap();

        Locomotion.run(&mut world, &[e], 0.1);
        let desired = world.get::<DesiredMovement>(e).unwrap();
        assert_eq!(desired.direction, Vec2::new(1.0, 0.0));
        assert_eq!(desired.speed, 80.0);
        assert!(world.get::<StatusFlags>(e).unwrap().moving);

        world.get_mut::<SteeringImpulses>(e).unwrap().clear();
        Locomotion.run(&mut world, &[e], 0.1);
        assert_eq!(world.get::<DesiredMovement>(e).unwrap().speed, 0.0);
        assert!(!world.get::<StatusFlags>(e).unwrap().moving);
    }
}
