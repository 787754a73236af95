//! Per-agent plan cursor

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::facts::Facts;
use crate::ai::goap::action::{descriptors, GoapActionId};
use crate::ai::goap::goal::{top_goal, GoalKind};
use crate::ai::goap::planner::{plan, PlanOutcome};

/// Planner-driven decision state
///
/// The plan is only valid for `goal`; whenever the top goal changes the plan
/// is thrown away and rebuilt before anything else runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoapAgent {
    pub actions: Vec<GoapActionId>,
    pub goals: Vec<GoalKind>,
    pub goal: Option<GoalKind>,
    pub plan: VecDeque<GoapActionId>,
    pub current: Option<GoapActionId>,
}

/// What a planning pass did, for the caller to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanningStep {
    /// Running action dropped because the goal changed; its intents need
    /// clearing
    pub aborted: Option<GoapActionId>,
    pub replanned: bool,
    /// Popped action whose preconditions no longer held
    pub failed: Option<GoapActionId>,
}

impl GoapAgent {
    pub fn new(actions: Vec<GoapActionId>, goals: Vec<GoalKind>) -> Self {
        Self {
            actions,
            goals,
            goal: None,
            plan: VecDeque::new(),
            current: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.plan.is_empty()
    }

    /// Recompute goal priorities, replan if needed and advance the cursor
    pub fn update(&mut self, facts: &Facts, max_iterations: usize) -> PlanningStep {
        let mut step = PlanningStep::default();
        let top = top_goal(&self.goals, facts);

        if top != self.goal {
            debug!(from = ?self.goal, to = ?top, "goal changed");
            step.aborted = self.current.take();
            self.plan.clear();
            self.goal = top;
            step.replanned = self.replan(facts, max_iterations);
        } else if self.is_idle() {
            step.replanned = self.replan(facts, max_iterations);
        }

        if self.current.is_some_and(|current| current.is_complete(facts)) {
            self.current = None;
        }
        if self.current.is_none() {
            if let Some(next) = self.plan.pop_front() {
                if next.descriptor().preconditions.satisfied_by(facts) {
                    self.current = Some(next);
                } else {
                    debug!(action = next.name(), "preconditions no longer hold, dropping plan");
                    self.plan.clear();
                    step.failed = Some(next);
                }
            }
        }

        step
    }

    fn replan(&mut self, facts: &Facts, max_iterations: usize) -> bool {
        let Some(goal) = self.goal else {
            return false;
        };
        let result = plan(&descriptors(&self.actions), *facts, &goal.desired(), max_iterations);
        if !result.steps.is_empty() || result.outcome != PlanOutcome::Complete {
            debug!(
                goal = goal.name(),
                steps = ?result.steps,
                outcome = ?result.outcome,
                "replanned"
            );
        }
        self.plan = result.steps.into();
        true
    }
}
