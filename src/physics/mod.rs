//! Boundary to the physics collaborator
//!
//! The simulation never moves bodies itself. It asks the collaborator to
//! create and destroy bodies as entities come and go, hands it one desired
//! movement per moving entity each tick, and reads positions back.

use ahash::AHashMap;

use crate::core::types::{EntityId, Vec2};
use crate::entity::steering::DesiredMovement;

pub trait PhysicsBridge {
    fn create_body(&mut self, entity: EntityId, position: Vec2, radius: f32);

    fn destroy_body(&mut self, entity: EntityId);

    /// Advance bodies by `dt`; returns the new position of every body
    fn step(&mut self, movements: &[(EntityId, DesiredMovement)], dt: f32) -> Vec<(EntityId, Vec2)>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct KinematicBody {
    position: Vec2,
    radius: f32,
}

/// Collision-free integrator: position += direction * speed * dt
#[derive(Debug, Default)]
pub struct KinematicPhysics {
    bodies: AHashMap<EntityId, KinematicBody>,
}

impl KinematicPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn position(&self, entity: EntityId) -> Option<Vec2> {
        self.bodies.get(&entity).map(|b| b.position)
    }

    pub fn radius(&self, entity: EntityId) -> Option<f32> {
        self.bodies.get(&entity).map(|b| b.radius)
    }

    /// Teleport a body, for scripted scenarios
    pub fn set_position(&mut self, entity: EntityId, position: Vec2) -> bool {
        match self.bodies.get_mut(&entity) {
            Some(body) => {
                body.position = position;
                true
            }
            None => false,
        }
    }
}

impl PhysicsBridge for KinematicPhysics {
    fn create_body(&mut self, entity: EntityId, position: Vec2, radius: f32) {
        self.bodies.insert(entity, KinematicBody { position, radius });
    }

    fn destroy_body(&mut self, entity: EntityId) {
        self.bodies.remove(&entity);
    }

    fn step(&mut self, movements: &[(EntityId, DesiredMovement)], dt: f32) -> Vec<(EntityId, Vec2)> {
        for (entity, movement) in movements {
            if let Some(body) = self.bodies.get_mut(entity) {
                body.position += movement.direction.normalize() * (movement.speed * dt);
            }
        }
        let mut positions: Vec<(EntityId, Vec2)> =
            self.bodies.iter().map(|(entity, body)| (*entity, body.position)).collect();
        positions.sort_unstable_by_key(|(entity, _)| *entity);
        positions
    }
}
