//! Utility-based behavior selection

pub mod arbitrator;
pub mod behavior;

pub use arbitrator::{arbitrate, Arbitration, UtilityAgent};
pub use behavior::{AgentContext, Behavior, BehaviorKind, NOT_APPLICABLE};
