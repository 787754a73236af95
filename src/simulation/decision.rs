//! Decision systems: fact refresh, planning, action execution and utility
//! arbitration

use crate::ai::facts::{observe_all, Facts};
use crate::ai::goap::agent::GoapAgent;
use crate::ai::goap::handlers;
use crate::ai::utility::arbitrator::{arbitrate, UtilityAgent};
use crate::ai::utility::behavior::AgentContext;
use crate::core::types::EntityId;
use crate::ecs::component::Signature;
use crate::ecs::system::System;
use crate::ecs::world::World;

/// Derives every fact of planner-driven agents from live components
pub struct GoapFactUpdate;

impl System for GoapFactUpdate {
    fn name(&self) -> &'static str {
        "goap_fact_update"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Facts>().with::<GoapAgent>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(mut facts) = world.get::<Facts>(*entity).copied() else {
                continue;
            };
            observe_all(world, *entity, &mut facts);
            if let Some(stored) = world.get_mut::<Facts>(*entity) {
                *stored = facts;
            }
        }
    }
}

/// Goal selection, replanning and plan cursor advancement
pub struct GoapPlanning {
    max_iterations: usize,
}

impl GoapPlanning {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl System for GoapPlanning {
    fn name(&self) -> &'static str {
        "goap_planning"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Facts>().with::<GoapAgent>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        for entity in entities {
            let Some(facts) = world.get::<Facts>(*entity).copied() else {
                continue;
            };
            let Some(agent) = world.get_mut::<GoapAgent>(*entity) else {
                continue;
            };
            let step = agent.update(&facts, self.max_iterations);
            if let Some(aborted) = step.aborted {
                handlers::abort(aborted, world, *entity);
            }
        }
    }
}

/// Runs the current action of every planner-driven agent
pub struct GoapActionExecution;

impl System for GoapActionExecution {
    fn name(&self) -> &'static str {
        "goap_action_execution"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<GoapAgent>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32) {
        for entity in entities {
            let Some(action) = world.get::<GoapAgent>(*entity).and_then(|a| a.current) else {
                continue;
            };
            handlers::execute(action, world, *entity, dt);
        }
    }
}

/// Scores every utility agent's behaviors and runs the winner
pub struct UtilityArbitration;

impl System for UtilityArbitration {
    fn name(&self) -> &'static str {
        "utility_arbitration"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Facts>().with::<UtilityAgent>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32) {
        for entity in entities {
            let Some(facts) = world.get::<Facts>(*entity).copied() else {
                continue;
            };
            let Some(agent) = world.get_mut::<UtilityAgent>(*entity) else {
                continue;
            };
            // Behaviors need the whole world, so the list is lent out for the pass
            let behaviors = std::mem::take(&mut agent.behaviors);
            let active = agent.active;

            let mut ctx = AgentContext::new(world, *entity, facts, dt);
            let result = arbitrate(&behaviors, active, &mut ctx);
            let facts = ctx.facts;

            if let Some(agent) = world.get_mut::<UtilityAgent>(*entity) {
                agent.behaviors = behaviors;
                agent.active = result.winner;
            }
            if let Some(stored) = world.get_mut::<Facts>(*entity) {
                *stored = facts;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::facts::Fact;
    use crate::ai::goap::action::GoapActionId;
    use crate::ai::goap::goal::GoalKind;
    use crate::ai::utility::behavior::BehaviorKind;
    use crate::core::types::{GroupId, Vec2};
    use crate::entity::body::{Group, Home, Position};
    use crate::entity::combat::Targetable;
    use crate::entity::sensing::{Patrol, Senses, Targeting};
    use crate::entity::steering::SteeringImpulses;

    fn run<S: System>(system: &mut S, world: &mut World) {
        let entities = world.query(system.signature());
        system.run(world, &entities, 0.1);
    }

    fn agent_base(world: &mut World) -> (EntityId, EntityId) {
        let me = world.create_entity();
        world.insert(me, Position(Vec2::ZERO)).unwrap();
        world.insert(me, Group::new(GroupId(1), [])).unwrap();
        world
            .insert(
                me,
                Home {
                    position: Vec2::ZERO,
                    radius: 50.0,
                },
            )
            .unwrap();
        world.insert(me, Targeting::default()).unwrap();
        world.insert(me, SteeringImpulses::default()).unwrap();
        world.insert(me, Facts::default()).unwrap();

        let enemy = world.create_entity();
        world.insert(enemy, Position(Vec2::new(100.0, 0.0))).unwrap();
        world.insert(enemy, Group::new(GroupId(2), [])).unwrap();
        world.insert(enemy, Targetable).unwrap();

        world
            .insert(
                me,
                Senses {
                    radius: 500.0,
                    targetables_in_range: vec![enemy],
                    lootables_in_range: vec![],
                },
            )
            .unwrap();
        (me, enemy)
    }

    #[test]
    fn test_goap_pipeline_acquires_target() {
        let mut world = World::new(1);
        let (me, enemy) = agent_base(&mut world);
        world
            .insert(
                me,
                GoapAgent::new(
                    vec![GoapActionId::GetTarget, GoapActionId::ChaseTarget, GoapActionId::AttackTarget],
                    vec![GoalKind::KillEnemies],
                ),
            )
            .unwrap();

        run(&mut GoapFactUpdate, &mut world);
        assert!(world.get::<Facts>(me).unwrap().get(Fact::SeeingEnemies));
        run(&mut GoapPlanning::new(8), &mut world);
        assert_eq!(world.get::<GoapAgent>(me).unwrap().current, Some(GoapActionId::GetTarget));
        run(&mut GoapActionExecution, &mut world);
        assert_eq!(world.get::<Targeting>(me).unwrap().target, Some(enemy));
    }

    #[test]
    fn test_utility_arbitration_restores_agent() {
        let mut world = World::new(1);
        let (me, _) = agent_base(&mut world);
        world.insert(me, Patrol::new(40.0, 1.0)).unwrap();
        world
            .insert(me, UtilityAgent::new(vec![BehaviorKind::Idle, BehaviorKind::Patrol]))
            .unwrap();

        run(&mut UtilityArbitration, &mut world);
        let agent = world.get::<UtilityAgent>(me).unwrap();
        assert_eq!(agent.behaviors.len(), 2);
        assert_eq!(agent.active_behavior(), Some(BehaviorKind::Patrol));
        assert!(world.get::<Patrol>(me).unwrap().move_target.is_some());
    }
}
