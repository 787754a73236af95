//! Entity-component store and system scheduler

pub mod component;
pub mod registry;
pub mod storage;
pub mod system;
pub mod world;

pub use component::{Component, Signature};
pub use registry::ComponentKind;
pub use system::{Scheduler, System, TimedSystem};
pub use world::World;
