//! Greedy forward-chaining planner
//!
//! From the start state, repeatedly take the cheapest applicable action,
//! apply its effects to the hypothetical state, and stop once the goal is
//! satisfied. There is no look-ahead beyond one step, so plans are not
//! guaranteed optimal; the iteration cap guarantees termination.
//!
//! Only actions that can contribute to the goal take part. An action is
//! relevant when one of its effects is a fact the goal wants, or a
//! precondition of another relevant action. Without that filter a cheap
//! patrol step would be chosen in the middle of an attack plan.

use ordered_float::OrderedFloat;
use tracing::{debug, error};

use crate::ai::facts::{Conditions, Fact, Facts};
use crate::ai::goap::action::{ActionDescriptor, GoapActionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Applying every step in order satisfies the goal
    Complete,
    /// Search got stuck before reaching the goal
    NoApplicableAction,
    /// The iteration cap was hit; the steps are a partial plan
    IterationCapExceeded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub steps: Vec<GoapActionId>,
    pub outcome: PlanOutcome,
}

impl Plan {
    pub fn is_complete(&self) -> bool {
        self.outcome == PlanOutcome::Complete
    }
}

/// Build a plan reaching `goal` from `start`
///
/// Candidates are relevant actions whose preconditions hold in the
/// hypothetical state and whose effects would change it. Ties on cost go to
/// the action listed first.
pub fn plan(actions: &[ActionDescriptor], start: Facts, goal: &Conditions, max_iterations: usize) -> Plan {
    let relevant = relevant_actions(actions, goal);
    let mut state = start;
    let mut steps = Vec::new();

    for _ in 0..max_iterations {
        if goal.satisfied_by(&state) {
            return Plan {
                steps,
                outcome: PlanOutcome::Complete,
            };
        }

        let best = relevant
            .iter()
            .filter(|a| a.preconditions.satisfied_by(&state) && !a.effects.satisfied_by(&state))
            .min_by_key(|a| OrderedFloat(a.cost));

        let Some(action) = best else {
            debug!(?state, ?goal, steps = steps.len(), "no applicable action");
            return Plan {
                steps,
                outcome: PlanOutcome::NoApplicableAction,
            };
        };

        state = action.effects.apply_to(&state);
        steps.push(action.id);
    }

    if goal.satisfied_by(&state) {
        return Plan {
            steps,
            outcome: PlanOutcome::Complete,
        };
    }

    error!(
        max_iterations,
        ?goal,
        steps = ?steps,
        "planner exceeded its iteration cap, keeping partial plan"
    );
    Plan {
        steps,
        outcome: PlanOutcome::IterationCapExceeded,
    }
}

/// Actions that backward-chain to the goal, in their original order
pub fn relevant_actions<'a>(actions: &'a [ActionDescriptor], goal: &Conditions) -> Vec<&'a ActionDescriptor> {
    let mut needed: Vec<(Fact, bool)> = goal.iter().collect();
    let mut relevant = vec![false; actions.len()];

    loop {
        let mut changed = false;
        for (index, action) in actions.iter().enumerate() {
            if relevant[index] || !action.effects.iter().any(|effect| needed.contains(&effect)) {
                continue;
            }
            relevant[index] = true;
            changed = true;
            for precondition in action.preconditions.iter() {
                if !needed.contains(&precondition) {
                    needed.push(precondition);
                }
            }
        }
        if !changed {
            break;
        }
    }

    actions
        .iter()
        .zip(relevant)
        .filter_map(|(action, keep)| keep.then_some(action))
        .collect()
}

/// Apply each step's effects in order
pub fn simulate(actions: &[ActionDescriptor], start: Facts, steps: &[GoapActionId]) -> Facts {
    steps.iter().fold(start, |state, step| {
        actions
            .iter()
            .find(|a| a.id == *step)
            .map_or(state, |a| a.effects.apply_to(&state))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::goap::action::descriptors;

    fn combat_actions() -> Vec<ActionDescriptor> {
        descriptors(&[
            GoapActionId::GetTarget,
            GoapActionId::ChaseTarget,
            GoapActionId::AttackTarget,
        ])
    }

    #[test]
    fn test_single_step_plan() {
        let get_target = ActionDescriptor {
            id: GoapActionId::GetTarget,
            preconditions: Conditions::NONE.with(Fact::HasTarget, false),
            effects: Conditions::NONE.with(Fact::HasTarget, true),
            cost: 1.0,
        };
        let goal = Conditions::NONE.with(Fact::HasTarget, true);
        let result = plan(&[get_target], Facts::default(), &goal, 10);
        assert_eq!(result.steps, vec![GoapActionId::GetTarget]);
        assert!(result.is_complete());
    }

    #[test]
    fn test_kill_chain() {
        let start = Facts::from_pairs(&[(Fact::SeeingEnemies, true)]);
        let goal = Conditions::NONE.with(Fact::AttackingEnemy, true);
        let result = plan(&combat_actions(), start, &goal, 10);
        assert_eq!(
            result.steps,
            vec![GoapActionId::GetTarget, GoapActionId::ChaseTarget, GoapActionId::AttackTarget]
        );
        assert!(goal.satisfied_by(&simulate(&combat_actions(), start, &result.steps)));
    }

    #[test]
    fn test_satisfied_goal_gives_empty_plan() {
        let start = Facts::from_pairs(&[(Fact::AttackingEnemy, true)]);
        let goal = Conditions::NONE.with(Fact::AttackingEnemy, true);
        let result = plan(&combat_actions(), start, &goal, 10);
        assert!(result.steps.is_empty());
        assert!(result.is_complete());
    }

    #[test]
    fn test_stuck_without_applicable_action() {
        // No enemies in sight, nothing to pick as target
        let goal = Conditions::NONE.with(Fact::AttackingEnemy, true);
        let result = plan(&combat_actions(), Facts::default(), &goal, 10);
        assert!(result.steps.is_empty());
        assert_eq!(result.outcome, PlanOutcome::NoApplicableAction);
    }

    #[test]
    fn test_cheapest_applicable_action_wins() {
        let actions = descriptors(&[GoapActionId::ReturnHome, GoapActionId::Flee]);
        let start = Facts::from_pairs(&[(Fact::Overwhelmed, true)]);
        let goal = Conditions::NONE.with(Fact::CloseToHome, true);
        let result = plan(&actions, start, &goal, 10);
        assert_eq!(result.steps, vec![GoapActionId::Flee]);
    }

    #[test]
    fn test_cost_ties_go_to_list_order() {
        let a = ActionDescriptor {
            id: GoapActionId::GetTarget,
            preconditions: Conditions::NONE,
            effects: Conditions::NONE.with(Fact::HasTarget, true),
            cost: 1.0,
        };
        let b = ActionDescriptor {
            id: GoapActionId::SelectLoot,
            ..a
        };
        let goal = Conditions::NONE.with(Fact::HasTarget, true);
        assert_eq!(plan(&[b, a], Facts::default(), &goal, 4).steps, vec![GoapActionId::SelectLoot]);
        assert_eq!(plan(&[a, b], Facts::default(), &goal, 4).steps, vec![GoapActionId::GetTarget]);
    }

    #[test]
    fn test_iteration_cap_returns_partial_plan() {
        let start = Facts::from_pairs(&[(Fact::SeeingEnemies, true)]);
        let goal = Conditions::NONE.with(Fact::AttackingEnemy, true);
        let result = plan(&combat_actions(), start, &goal, 2);
        assert_eq!(result.outcome, PlanOutcome::IterationCapExceeded);
        assert_eq!(result.steps, vec![GoapActionId::GetTarget, GoapActionId::ChaseTarget]);
    }

    #[test]
    fn test_irrelevant_cheap_actions_ignored() {
        let mut actions = descriptors(&[GoapActionId::PickPatrolPoint, GoapActionId::MoveToPatrolPoint]);
        actions.extend(combat_actions());
        let start = Facts::from_pairs(&[(Fact::SeeingEnemies, true)]);
        let goal = Conditions::NONE.with(Fact::AttackingEnemy, true);
        let result = plan(&actions, start, &goal, 10);
        assert_eq!(
            result.steps,
            vec![GoapActionId::GetTarget, GoapActionId::ChaseTarget, GoapActionId::AttackTarget]
        );
    }

    #[test]
    fn test_flip_flopping_actions_terminate() {
        let on = ActionDescriptor {
            id: GoapActionId::PickPatrolPoint,
            preconditions: Conditions::NONE,
            effects: Conditions::NONE.with(Fact::HasMoveTarget, true).with(Fact::HasTarget, false),
            cost: 1.0,
        };
        let off = ActionDescriptor {
            id: GoapActionId::GetTarget,
            preconditions: Conditions::NONE,
            effects: Conditions::NONE.with(Fact::HasTarget, true).with(Fact::HasMoveTarget, false),
            cost: 1.0,
        };
        let goal = Conditions::NONE.with(Fact::HasMoveTarget, true).with(Fact::HasTarget, true);
        let result = plan(&[on, off], Facts::default(), &goal, 6);
        assert_eq!(result.outcome, PlanOutcome::IterationCapExceeded);
        assert_eq!(result.steps.len(), 6);
    }
}
