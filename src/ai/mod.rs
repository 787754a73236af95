//! Decision making
//!
//! Two independent strategies over the same fact substrate: a goal-oriented
//! planner and a utility arbitrator. Which one drives a mob is configured per
//! mob type.

pub mod activities;
pub mod facts;
pub mod goap;
pub mod utility;

pub use facts::{Conditions, Fact, Facts};
