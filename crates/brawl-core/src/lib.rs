//! Core types and definitions for the BRAWL combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! the stat model, definition records, components, commands, intents,
//! events, query views, and constants. It has no dependency on the ECS
//! runtime or on any host framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod definitions;
pub mod enums;
pub mod error;
pub mod events;
pub mod flags;
pub mod state;
pub mod stats;
pub mod types;
