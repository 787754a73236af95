//! Goal-oriented action planning
//!
//! Action library, goals, the greedy planner and the per-agent plan cursor.
//!
//! Each planning step takes the cheapest applicable action, but only among
//! actions that backward-chain to the goal: an action is relevant when one
//! of its effects is a goal fact or a precondition of another relevant
//! action. Cheap unrelated actions therefore never appear in a plan.

pub mod action;
pub mod agent;
pub mod goal;
pub mod handlers;
pub mod planner;

pub use action::{ActionDescriptor, GoapActionId};
pub use agent::{GoapAgent, PlanningStep};
pub use goal::GoalKind;
pub use planner::{plan, Plan, PlanOutcome};
