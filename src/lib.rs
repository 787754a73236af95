//! Skirmish - Tick-Driven Agent Simulation
//!
//! Mobs, buildings and loot live in an entity-component store. Every tick a
//! fixed pipeline of systems senses the surroundings, validates targets,
//! lets each mob decide through either a GOAP planner or a utility
//! arbitrator, and resolves movement and combat.

pub mod ai;
pub mod core;
pub mod ecs;
pub mod entity;
pub mod physics;
pub mod simulation;
pub mod spatial;
