//! Execution and abort handlers, one arm per action

use crate::ai::activities;
use crate::ai::facts::{observe, Fact};
use crate::ai::goap::action::GoapActionId;
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Run one tick of `action` for `entity`
pub fn execute(action: GoapActionId, world: &mut World, entity: EntityId, dt: f32) {
    match action {
        GoapActionId::GetTarget => {
            activities::acquire_target(world, entity);
        }
        GoapActionId::ChaseTarget => activities::chase_target(world, entity),
        GoapActionId::AttackTarget => {
            activities::engage_target(world, entity);
        }
        GoapActionId::Flee => activities::flee_home(world, entity),
        GoapActionId::ReturnHome => activities::return_home(world, entity),
        GoapActionId::PickPatrolPoint => {
            activities::pick_patrol_point(world, entity);
        }
        GoapActionId::MoveToPatrolPoint => activities::move_to_patrol_point(world, entity),
        GoapActionId::SelectLoot => {
            activities::select_loot(world, entity);
        }
        GoapActionId::MoveToLoot => activities::move_to_loot(world, entity),
        GoapActionId::LootTarget => {
            if observe(world, entity, Fact::AtLootTarget) == Some(true) {
                activities::progress_loot(world, entity, dt);
            } else {
                activities::move_to_loot(world, entity);
            }
        }
    }
}

/// Undo the intents `action` left behind when it is abandoned mid-run
pub fn abort(action: GoapActionId, world: &mut World, entity: EntityId) {
    match action {
        GoapActionId::AttackTarget => activities::cancel_attack(world, entity),
        GoapActionId::MoveToLoot | GoapActionId::LootTarget => activities::cancel_loot(world, entity),
        GoapActionId::MoveToPatrolPoint => activities::cancel_patrol(world, entity),
        GoapActionId::GetTarget
        | GoapActionId::ChaseTarget
        | GoapActionId::Flee
        | GoapActionId::ReturnHome
        | GoapActionId::PickPatrolPoint
        | GoapActionId::SelectLoot => {}
    }
}
