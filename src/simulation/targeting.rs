//! Target validity, periodic reselection and targeted-by bookkeeping

use tracing::trace;

use crate::ai::activities::{is_hostile, nearest, position_of};
use crate::core::types::EntityId;
use crate::ecs::component::Signature;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::entity::body::Position;
use crate::entity::combat::{AttackIntent, Lootable};
use crate::entity::sensing::{LootTarget, Senses, TargetedBy, Targeting};

/// Clears targets that point at entities which no longer exist
///
/// Runs before any decision layer, followed by the attack intent and loot
/// target checks, so every dependent flag is consistent in the tick the
/// dangling reference is detected.
pub struct TargetValidation;

impl System for TargetValidation {
    fn name(&self) -> &'static str {
        "target_validation"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Targeting>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(target) = world.get::<Targeting>(*entity).and_then(|t| t.target) else {
                continue;
            };
            if world.is_alive(target) && world.has::<Position>(target) {
                continue;
            }
            trace!(%entity, %target, "clearing dangling target");
            if let Some(targeting) = world.get_mut::<Targeting>(*entity) {
                targeting.clear();
            }
        }
    }
}

/// Drops attack intents on dead entities or on anything other than the
/// current target
pub struct AttackIntentValidation;

impl System for AttackIntentValidation {
    fn name(&self) -> &'static str {
        "attack_intent_validation"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<AttackIntent>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(target) = world.get::<AttackIntent>(*entity).and_then(|a| a.target) else {
                continue;
            };
            let still_targeted = world.get::<Targeting>(*entity).map_or(true, |t| t.target == Some(target));
            if world.is_alive(target) && still_targeted {
                continue;
            }
            trace!(%entity, %target, "clearing stale attack intent");
            if let Some(intent) = world.get_mut::<AttackIntent>(*entity) {
                intent.target = None;
            }
        }
    }
}

/// Drops loot targets that were picked up or destroyed
pub struct LootTargetValidation;

impl System for LootTargetValidation {
    fn name(&self) -> &'static str {
        "loot_target_validation"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<LootTarget>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(loot) = world.get::<LootTarget>(*entity).and_then(|l| l.target) else {
                continue;
            };
            if world.is_alive(loot) && world.has::<Lootable>(loot) {
                continue;
            }
            trace!(%entity, %loot, "clearing vanished loot target");
            if let Some(loot_target) = world.get_mut::<LootTarget>(*entity) {
                loot_target.clear();
            }
        }
    }
}

/// Switches agents that already have a target to the nearest sensed hostile
///
/// Meant to run on a timer. Agents whose target left sensing range drop it
/// when nothing else is in sight; agents without a target are left alone,
/// acquiring one is a decision.
pub struct TargetReselection;

impl System for TargetReselection {
    fn name(&self) -> &'static str {
        "target_reselection"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Targeting>().with::<Senses>().with::<Position>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(current) = world.get::<Targeting>(*entity).and_then(|t| t.target) else {
                continue;
            };
            let Some(senses) = world.get::<Senses>(*entity) else {
                continue;
            };
            let still_sensed = senses.targetables_in_range.contains(&current);
            let best = nearest(world, *entity, &senses.targetables_in_range, |c| is_hostile(world, *entity, c));

            match best {
                Some((target, position)) if target != current => {
                    trace!(%entity, from = %current, to = %target, "reselecting target");
                    if let Some(targeting) = world.get_mut::<Targeting>(*entity) {
                        targeting.set(target, position);
                    }
                    if let Some(intent) = world.get_mut::<AttackIntent>(*entity) {
                        if intent.target == Some(current) {
                            intent.target = Some(target);
                        }
                    }
                }
                None if !still_sensed => {
                    trace!(%entity, target = %current, "target out of sight");
                    if let Some(targeting) = world.get_mut::<Targeting>(*entity) {
                        targeting.clear();
                    }
                    if let Some(intent) = world.get_mut::<AttackIntent>(*entity) {
                        intent.target = None;
                    }
                }
                _ => {}
            }
        }
    }
}

/// Refreshes each target's last known position and records the attacker in
/// the target's targeted-by list
pub struct TargetTracking;

impl System for TargetTracking {
    fn name(&self) -> &'static str {
        "target_tracking"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Targeting>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(target) = world.get::<Targeting>(*entity).and_then(|t| t.target) else {
                continue;
            };
            let position = position_of(world, target);
            if let Some(targeting) = world.get_mut::<Targeting>(*entity) {
                targeting.target_position = position;
            }
            if let Some(targeted_by) = world.get_mut::<TargetedBy>(target) {
                targeted_by.attackers.push(*entity);
            }
        }
    }
}
