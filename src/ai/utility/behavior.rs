//! Behaviors competing for control of utility-driven mobs

use serde::{Deserialize, Serialize};

use crate::ai::activities;
use crate::ai::facts::{observe_into, Fact, Facts};
use crate::core::types::EntityId;
use crate::ecs::world::World;

/// Utility of a behavior that cannot run in the current situation
pub const NOT_APPLICABLE: f32 = -1.0e9;

/// A scored, executable unit of conduct
///
/// Implementations are stateless templates: anything they need to remember
/// between ticks lives in the context they are handed.
pub trait Behavior<C: ?Sized> {
    fn name(&self) -> &'static str;

    /// Refresh the facts this behavior scores on
    fn update_state(&self, ctx: &mut C);

    fn utility(&self, ctx: &C) -> f32;

    /// Called every tick while the behavior holds control
    fn execute(&self, ctx: &mut C);

    /// Called once when the behavior loses control
    fn stop(&self, _ctx: &mut C) {}
}

/// What a world behavior operates on for one agent and one tick
pub struct AgentContext<'w> {
    pub world: &'w mut World,
    pub entity: EntityId,
    /// Working copy of the agent's facts, written back after arbitration
    pub facts: Facts,
    pub dt: f32,
}

impl<'w> AgentContext<'w> {
    pub fn new(world: &'w mut World, entity: EntityId, facts: Facts, dt: f32) -> Self {
        Self {
            world,
            entity,
            facts,
            dt,
        }
    }

    fn observe(&mut self, which: &[Fact]) {
        observe_into(self.world, self.entity, which, &mut self.facts);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Idle,
    Patrol,
    Attack,
    Escape,
    Loot,
    ReturnHome,
}

impl BehaviorKind {
    pub const ALL: [BehaviorKind; 6] = [
        BehaviorKind::Idle,
        BehaviorKind::Patrol,
        BehaviorKind::Attack,
        BehaviorKind::Escape,
        BehaviorKind::Loot,
        BehaviorKind::ReturnHome,
    ];

    /// Facts the behavior reads
    fn watched(self) -> &'static [Fact] {
        match self {
            BehaviorKind::Idle => &[],
            BehaviorKind::Patrol => &[Fact::HasMoveTarget, Fact::AtMoveTarget, Fact::Patrolling],
            BehaviorKind::Attack => &[Fact::HasTarget, Fact::SeeingEnemies, Fact::InRangeToAttack, Fact::AttackingEnemy],
            BehaviorKind::Escape => &[Fact::Overwhelmed, Fact::CloseToHome],
            BehaviorKind::Loot => &[Fact::SeeingLoot, Fact::HasLootTarget, Fact::AtLootTarget, Fact::Looting],
            BehaviorKind::ReturnHome => &[Fact::CloseToHome, Fact::HasMoveTarget],
        }
    }

    /// Score from facts alone
    pub fn score(self, facts: &Facts) -> f32 {
        let applicable = match self {
            BehaviorKind::Idle | BehaviorKind::Patrol => true,
            BehaviorKind::Attack => facts.get(Fact::HasTarget) || facts.get(Fact::SeeingEnemies),
            BehaviorKind::Escape => facts.get(Fact::Overwhelmed) && !facts.get(Fact::CloseToHome),
            BehaviorKind::Loot => facts.get(Fact::SeeingLoot) || facts.get(Fact::HasLootTarget),
            BehaviorKind::ReturnHome => !facts.get(Fact::CloseToHome) && !facts.get(Fact::HasMoveTarget),
        };
        if !applicable {
            return NOT_APPLICABLE;
        }
        match self {
            BehaviorKind::Idle => 0.0,
            BehaviorKind::Patrol => 1.0,
            BehaviorKind::Attack => 50.0,
            BehaviorKind::Escape => 100.0,
            BehaviorKind::Loot => 20.0,
            BehaviorKind::ReturnHome => 5.0,
        }
    }
}

impl<'w> Behavior<AgentContext<'w>> for BehaviorKind {
    fn name(&self) -> &'static str {
        match self {
            BehaviorKind::Idle => "idle",
            BehaviorKind::Patrol => "patrol",
            BehaviorKind::Attack => "attack",
            BehaviorKind::Escape => "escape",
            BehaviorKind::Loot => "loot",
            BehaviorKind::ReturnHome => "return_home",
        }
    }

    fn update_state(&self, ctx: &mut AgentContext<'w>) {
        ctx.observe(self.watched());
    }

    fn utility(&self, ctx: &AgentContext<'w>) -> f32 {
        self.score(&ctx.facts)
    }

    fn execute(&self, ctx: &mut AgentContext<'w>) {
        let (world, entity) = (&mut *ctx.world, ctx.entity);
        match self {
            BehaviorKind::Idle => {}
            BehaviorKind::Patrol => {
                if !ctx.facts.get(Fact::HasMoveTarget) {
                    activities::pick_patrol_point(world, entity);
                } else if !ctx.facts.get(Fact::AtMoveTarget) {
                    activities::move_to_patrol_point(world, entity);
                }
            }
            BehaviorKind::Attack => {
                if !ctx.facts.get(Fact::HasTarget) && !activities::acquire_target(world, entity) {
                    return;
                }
                activities::engage_target(world, entity);
            }
            BehaviorKind::Escape => activities::flee_home(world, entity),
            BehaviorKind::Loot => {
                if !ctx.facts.get(Fact::HasLootTarget) {
                    if !activities::select_loot(world, entity) {
                        return;
                    }
                    // Freshly selected; reach is judged on the next tick
                    activities::move_to_loot(world, entity);
                } else if ctx.facts.get(Fact::AtLootTarget) {
                    activities::progress_loot(world, entity, ctx.dt);
                } else {
                    activities::move_to_loot(world, entity);
                }
            }
            BehaviorKind::ReturnHome => activities::return_home(world, entity),
        }
    }

    fn stop(&self, ctx: &mut AgentContext<'w>) {
        match self {
            BehaviorKind::Attack => activities::cancel_attack(ctx.world, ctx.entity),
            BehaviorKind::Loot => activities::cancel_loot(ctx.world, ctx.entity),
            BehaviorKind::Patrol => activities::cancel_patrol(ctx.world, ctx.entity),
            BehaviorKind::Idle | BehaviorKind::Escape | BehaviorKind::ReturnHome => {}
        }
    }
}
