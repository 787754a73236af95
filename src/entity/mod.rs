//! Component definitions and spawn loadouts

pub mod archetype;
pub mod body;
pub mod building;
pub mod combat;
pub mod sensing;
pub mod steering;
