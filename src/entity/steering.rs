//! Steering impulse accumulation

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Directional "desires" contributed during one tick
///
/// Cleared at the start of every tick; whichever action or behavior is
/// active appends to it; locomotion sums it into a single direction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SteeringImpulses {
    pub impulses: Vec<Vec2>,
}

impl SteeringImpulses {
    pub fn push(&mut self, impulse: Vec2) {
        if !impulse.is_zero() {
            self.impulses.push(impulse);
        }
    }

    pub fn clear(&mut self) {
        self.impulses.clear();
    }

    /// Normalized sum of all impulses, zero if they cancel out or are absent
    pub fn resolve(&self) -> Vec2 {
        self.impulses
            .iter()
            .fold(Vec2::ZERO, |acc, impulse| acc + *impulse)
            .normalize()
    }
}

/// Movement request handed to the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DesiredMovement {
    /// Normalized direction, zero when standing still
    pub direction: Vec2,
    pub speed: f32,
}
