//! Per-tick systems and the simulation facade that runs them

pub mod combat;
pub mod decision;
pub mod movement;
pub mod reset;
pub mod sensing;
pub mod snapshot;
pub mod targeting;
pub mod tick;

pub use snapshot::EntitySnapshot;
pub use tick::{build_schedule, Population, Simulation};
