pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{Result, SkirmishError};
pub use types::{EntityId, GroupId, Tick, Vec2};
