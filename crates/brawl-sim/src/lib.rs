//! Simulation engine for BRAWL.
//!
//! Owns the hecs ECS world, runs the combat pipeline once per host frame,
//! and produces `FrameSnapshot`s for the host.

pub mod combat;
pub mod effects;
pub mod engine;
pub mod error;
pub mod systems;
pub mod world_setup;

pub use brawl_core as core;
pub use engine::SimulationEngine;
pub use error::SimError;

#[cfg(test)]
mod tests;
