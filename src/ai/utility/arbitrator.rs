//! Per-tick behavior arbitration with hysteresis

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::utility::behavior::{Behavior, BehaviorKind, NOT_APPLICABLE};

/// Utility-driven decision state: the candidate list and who holds control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityAgent {
    pub behaviors: Vec<BehaviorKind>,
    /// Index into `behaviors`
    pub active: Option<usize>,
}

impl UtilityAgent {
    pub fn new(behaviors: Vec<BehaviorKind>) -> Self {
        Self {
            behaviors,
            active: None,
        }
    }

    pub fn active_behavior(&self) -> Option<BehaviorKind> {
        self.active.and_then(|index| self.behaviors.get(index).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitration {
    pub winner: Option<usize>,
    pub switched: bool,
}

/// Score every behavior and hand control to the best one
///
/// All state-updaters run before any scoring. Candidates are visited in
/// list order starting from the active behavior's score, and only a strictly
/// better score takes over, so ties keep the current behavior. A behavior
/// scoring `NOT_APPLICABLE` never wins. On a switch the previous behavior's
/// stop hook runs before the winner executes; the winner executes every
/// tick.
pub fn arbitrate<C: ?Sized, B: Behavior<C>>(behaviors: &[B], active: Option<usize>, ctx: &mut C) -> Arbitration {
    for behavior in behaviors {
        behavior.update_state(ctx);
    }
    let scores: Vec<f32> = behaviors.iter().map(|b| b.utility(ctx)).collect();

    let active = active.filter(|index| *index < behaviors.len());
    let mut best: Option<(usize, f32)> = active
        .map(|index| (index, scores[index]))
        .filter(|(_, score)| *score > NOT_APPLICABLE);

    for (index, score) in scores.iter().copied().enumerate() {
        if score <= NOT_APPLICABLE {
            continue;
        }
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    let winner = best.map(|(index, _)| index);
    let switched = winner != active;
    if switched {
        debug!(
            from = active.map(|i| behaviors[i].name()),
            to = winner.map(|i| behaviors[i].name()),
            "behavior switch"
        );
        if let Some(previous) = active {
            behaviors[previous].stop(ctx);
        }
    }
    if let Some(index) = winner {
        behaviors[index].execute(ctx);
    }

    Arbitration { winner, switched }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every hook call
    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        scores: Vec<f32>,
    }

    struct Fixed {
        name: &'static str,
        index: usize,
    }

    impl Behavior<Log> for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn update_state(&self, ctx: &mut Log) {
            ctx.calls.push(format!("update:{}", self.name));
        }

        fn utility(&self, ctx: &Log) -> f32 {
            ctx.scores[self.index]
        }

        fn execute(&self, ctx: &mut Log) {
            ctx.calls.push(format!("execute:{}", self.name));
        }

        fn stop(&self, ctx: &mut Log) {
            ctx.calls.push(format!("stop:{}", self.name));
        }
    }

    fn pair() -> [Fixed; 2] {
        [Fixed { name: "a", index: 0 }, Fixed { name: "b", index: 1 }]
    }

    #[test]
    fn test_tie_keeps_active_without_stop() {
        let behaviors = pair();
        let mut log = Log {
            scores: vec![6.0, 6.0],
            ..Default::default()
        };
        let result = arbitrate(&behaviors, Some(0), &mut log);
        assert_eq!(result, Arbitration { winner: Some(0), switched: false });
        assert!(!log.calls.iter().any(|c| c.starts_with("stop")));
    }

    #[test]
    fn test_tie_keeps_later_active_behavior() {
        let behaviors = pair();
        let mut log = Log {
            scores: vec![6.0, 6.0],
            ..Default::default()
        };
        let result = arbitrate(&behaviors, Some(1), &mut log);
        assert_eq!(result.winner, Some(1));
        assert!(!result.switched);
    }

    #[test]
    fn test_updaters_run_before_execution() {
        let behaviors = pair();
        let mut log = Log {
            scores: vec![1.0, 2.0],
            ..Default::default()
        };
        arbitrate(&behaviors, None, &mut log);
        assert_eq!(log.calls, vec!["update:a", "update:b", "execute:b"]);
    }

    #[test]
    fn test_switch_stops_previous_once() {
        let behaviors = pair();
        let mut log = Log {
            scores: vec![1.0, 2.0],
            ..Default::default()
        };
        let result = arbitrate(&behaviors, Some(0), &mut log);
        assert!(result.switched);
        assert_eq!(log.calls, vec!["update:a", "update:b", "stop:a", "execute:b"]);

        log.calls.clear();
        let result = arbitrate(&behaviors, result.winner, &mut log);
        assert!(!result.switched);
        assert_eq!(log.calls, vec!["update:a", "update:b", "execute:b"]);
    }

    #[test]
    fn test_not_applicable_never_wins() {
        let behaviors = pair();
        let mut log = Log {
            scores: vec![NOT_APPLICABLE, NOT_APPLICABLE],
            ..Default::default()
        };
        let result = arbitrate(&behaviors, Some(0), &mut log);
        assert_eq!(result.winner, None);
        assert!(log.calls.contains(&"stop:a".to_string()));
    }

    #[test]
    fn test_active_behavior_lookup() {
        let mut agent = UtilityAgent::new(vec![BehaviorKind::Patrol, BehaviorKind::Idle]);
        assert_eq!(agent.active_behavior(), None);
        agent.active = Some(1);
        assert_eq!(agent.active_behavior(), Some(BehaviorKind::Idle));
    }
}
