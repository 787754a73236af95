//! Goals with priorities recomputed from the current facts every tick

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::ai::facts::{Conditions, Fact, Facts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Escape,
    KillEnemies,
    CollectLoot,
    ReturnHome,
    Patrol,
}

impl GoalKind {
    pub const ALL: [GoalKind; 5] = [
        GoalKind::Escape,
        GoalKind::KillEnemies,
        GoalKind::CollectLoot,
        GoalKind::ReturnHome,
        GoalKind::Patrol,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GoalKind::Escape => "escape",
            GoalKind::KillEnemies => "kill_enemies",
            GoalKind::CollectLoot => "collect_loot",
            GoalKind::ReturnHome => "return_home",
            GoalKind::Patrol => "patrol",
        }
    }

    pub fn desired(self) -> Conditions {
        let fact = match self {
            GoalKind::Escape | GoalKind::ReturnHome => Fact::CloseToHome,
            GoalKind::KillEnemies => Fact::AttackingEnemy,
            GoalKind::CollectLoot => Fact::Looting,
            GoalKind::Patrol => Fact::AtMoveTarget,
        };
        Conditions::NONE.with(fact, true)
    }

    /// Current priority; zero means the goal is not worth pursuing
    pub fn priority(self, facts: &Facts) -> f32 {
        let active = match self {
            GoalKind::Escape => facts.get(Fact::Overwhelmed) && !facts.get(Fact::CloseToHome),
            GoalKind::KillEnemies => facts.get(Fact::SeeingEnemies) || facts.get(Fact::HasTarget),
            GoalKind::CollectLoot => facts.get(Fact::SeeingLoot) || facts.get(Fact::HasLootTarget),
            // A patrol point outside home is finished before heading back
            GoalKind::ReturnHome => !facts.get(Fact::CloseToHome) && !facts.get(Fact::HasMoveTarget),
            GoalKind::Patrol => true,
        };
        if !active {
            return 0.0;
        }
        match self {
            GoalKind::Escape => 100.0,
            GoalKind::KillEnemies => 50.0,
            GoalKind::CollectLoot => 20.0,
            GoalKind::ReturnHome => 5.0,
            GoalKind::Patrol => 1.0,
        }
    }
}

/// Goals ordered by descending priority; equal priorities keep list order
pub fn prioritized(goals: &[GoalKind], facts: &Facts) -> Vec<(GoalKind, f32)> {
    let mut ranked: Vec<(GoalKind, f32)> = goals.iter().map(|g| (*g, g.priority(facts))).collect();
    ranked.sort_by_key(|(_, priority)| std::cmp::Reverse(OrderedFloat(*priority)));
    ranked
}

/// Highest-priority goal with a positive priority
pub fn top_goal(goals: &[GoalKind], facts: &Facts) -> Option<GoalKind> {
    prioritized(goals, facts)
        .first()
        .filter(|(_, priority)| *priority > 0.0)
        .map(|(goal, _)| *goal)
}
