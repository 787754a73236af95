//! Start-of-tick resets for per-tick scratch state

use crate::core::types::EntityId;
use crate::ecs::component::Signature;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::entity::body::StatusFlags;
use crate::entity::sensing::TargetedBy;
use crate::entity::steering::SteeringImpulses;

/// Empties every impulse accumulator before anything can push to it
pub struct ImpulseReset;

impl System for ImpulseReset {
    fn name(&self) -> &'static str {
        "impulse_reset"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<SteeringImpulses>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            if let Some(steering) = world.get_mut::<SteeringImpulses>(*entity) {
                steering.clear();
            }
        }
    }
}

/// Clears one-tick flags; `moving` and `attacking` are recomputed later
pub struct StatusFlagReset;

impl System for StatusFlagReset {
    fn name(&self) -> &'static str {
        "status_flag_reset"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<StatusFlags>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            if let Some(flags) = world.get_mut::<StatusFlags>(*entity) {
                flags.damage_taken = false;
                flags.attacking = false;
            }
        }
    }
}

/// Drops last tick's back-references; target tracking rebuilds them
pub struct TargetedByReset;

impl System for TargetedByReset {
    fn name(&self) -> &'static str {
        "targeted_by_reset"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<TargetedBy>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            if let Some(targeted_by) = world.get_mut::<TargetedBy>(*entity) {
                targeted_by.attackers.clear();
            }
        }
    }
}
