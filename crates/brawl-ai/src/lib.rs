//! Enemy AI for BRAWL.
//!
//! A generic state machine plus the concrete behavior states enemies run
//! (idle, chase, melee and ranged attack, flee) and the profiles that tune
//! them. No ECS dependency: states operate on a borrowed [`agent::AiAgent`].

pub mod agent;
pub mod brain;
pub mod fsm;
pub mod profiles;
pub mod states;

pub use brawl_core as core;
