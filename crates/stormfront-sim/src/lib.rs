//! Storm scheduler and exposure engine for STORMFRONT.
//!
//! Owns the hecs world of subjects, runs the scheduling state machine and
//! the per-storm and exposure systems at a fixed tick rate, and emits
//! storm events for host collaborators.

pub mod burst;
pub mod countdown;
pub mod engine;
pub mod exposure_state;
pub mod hooks;
pub mod persistence;
pub mod systems;
pub mod tasks;
pub mod world_setup;

pub use engine::{Collaborators, SimConfig, StormScheduler};
pub use stormfront_core as core;
