//! The closed action vocabulary available to planner-driven mobs
//!
//! Actions are shared, stateless templates. Anything an action needs to
//! remember while it runs lives in the agent's components.

use serde::{Deserialize, Serialize};

use crate::ai::facts::{Conditions, Fact, Facts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoapActionId {
    GetTarget,
    ChaseTarget,
    AttackTarget,
    Flee,
    ReturnHome,
    PickPatrolPoint,
    MoveToPatrolPoint,
    SelectLoot,
    MoveToLoot,
    LootTarget,
}

/// Precondition/effect/cost template handed to the planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDescriptor {
    pub id: GoapActionId,
    pub preconditions: Conditions,
    pub effects: Conditions,
    pub cost: f32,
}

const fn conditions() -> Conditions {
    Conditions::NONE
}

impl GoapActionId {
    pub const ALL: [GoapActionId; 10] = [
        GoapActionId::GetTarget,
        GoapActionId::ChaseTarget,
        GoapActionId::AttackTarget,
        GoapActionId::Flee,
        GoapActionId::ReturnHome,
        GoapActionId::PickPatrolPoint,
        GoapActionId::MoveToPatrolPoint,
        GoapActionId::SelectLoot,
        GoapActionId::MoveToLoot,
        GoapActionId::LootTarget,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GoapActionId::GetTarget => "get_target",
            GoapActionId::ChaseTarget => "chase_target",
            GoapActionId::AttackTarget => "attack_target",
            GoapActionId::Flee => "flee",
            GoapActionId::ReturnHome => "return_home",
            GoapActionId::PickPatrolPoint => "pick_patrol_point",
            GoapActionId::MoveToPatrolPoint => "move_to_patrol_point",
            GoapActionId::SelectLoot => "select_loot",
            GoapActionId::MoveToLoot => "move_to_loot",
            GoapActionId::LootTarget => "loot_target",
        }
    }

    pub fn descriptor(self) -> ActionDescriptor {
        let (preconditions, effects, cost) = match self {
            GoapActionId::GetTarget => (
                conditions().with(Fact::SeeingEnemies, true).with(Fact::HasTarget, false),
                conditions().with(Fact::HasTarget, true),
                1.0,
            ),
            GoapActionId::ChaseTarget => (
                conditions().with(Fact::HasTarget, true).with(Fact::InRangeToAttack, false),
                conditions().with(Fact::InRangeToAttack, true),
                2.0,
            ),
            GoapActionId::AttackTarget => (
                conditions().with(Fact::HasTarget, true).with(Fact::InRangeToAttack, true),
                conditions().with(Fact::AttackingEnemy, true),
                1.0,
            ),
            GoapActionId::Flee => (
                conditions().with(Fact::Overwhelmed, true).with(Fact::CloseToHome, false),
                conditions().with(Fact::CloseToHome, true),
                1.0,
            ),
            GoapActionId::ReturnHome => (
                conditions().with(Fact::CloseToHome, false),
                conditions().with(Fact::CloseToHome, true),
                3.0,
            ),
            GoapActionId::PickPatrolPoint => (
                conditions().with(Fact::HasMoveTarget, false),
                conditions().with(Fact::HasMoveTarget, true),
                1.0,
            ),
            GoapActionId::MoveToPatrolPoint => (
                conditions().with(Fact::HasMoveTarget, true).with(Fact::AtMoveTarget, false),
                conditions().with(Fact::AtMoveTarget, true),
                1.0,
            ),
            GoapActionId::SelectLoot => (
                conditions().with(Fact::SeeingLoot, true).with(Fact::HasLootTarget, false),
                conditions().with(Fact::HasLootTarget, true),
                1.0,
            ),
            GoapActionId::MoveToLoot => (
                conditions().with(Fact::HasLootTarget, true).with(Fact::AtLootTarget, false),
                conditions().with(Fact::AtLootTarget, true),
                1.0,
            ),
            GoapActionId::LootTarget => (
                conditions().with(Fact::HasLootTarget, true).with(Fact::AtLootTarget, true),
                conditions().with(Fact::Looting, true),
                1.0,
            ),
        };
        ActionDescriptor {
            id: self,
            preconditions,
            effects,
            cost,
        }
    }

    /// Whether the running action is done, judged against live facts
    ///
    /// Completion is logical, not an echo of the effects: an attack is done
    /// once there is nothing left to attack, a move is done once it arrives
    /// or loses its destination.
    pub fn is_complete(self, facts: &Facts) -> bool {
        match self {
            GoapActionId::GetTarget => facts.get(Fact::HasTarget),
            GoapActionId::ChaseTarget => facts.get(Fact::InRangeToAttack) || !facts.get(Fact::HasTarget),
            GoapActionId::AttackTarget => !facts.get(Fact::HasTarget),
            GoapActionId::Flee | GoapActionId::ReturnHome => facts.get(Fact::CloseToHome),
            GoapActionId::PickPatrolPoint => facts.get(Fact::HasMoveTarget),
            GoapActionId::MoveToPatrolPoint => facts.get(Fact::AtMoveTarget) || !facts.get(Fact::HasMoveTarget),
            GoapActionId::SelectLoot => facts.get(Fact::HasLootTarget),
            GoapActionId::MoveToLoot => facts.get(Fact::AtLootTarget) || !facts.get(Fact::HasLootTarget),
            GoapActionId::LootTarget => !facts.get(Fact::HasLootTarget),
        }
    }
}

/// Descriptors for a configured action list, in list order
pub fn descriptors(actions: &[GoapActionId]) -> Vec<ActionDescriptor> {
    actions.iter().map(|id| id.descriptor()).collect()
}
