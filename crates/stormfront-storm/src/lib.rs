//! Storm behavior for STORMFRONT.
//!
//! Profile tables and weighted selection, live storm instances, path
//! generation, the forming/peak/dissipating phase model and the per-storm
//! movement engine. No ECS dependency; operates on plain data.

pub mod instance;
pub mod movement;
pub mod path;
pub mod phase;
pub mod profiles;
pub mod weighted;

pub use stormfront_core as core;

pub use instance::{SpeedOverride, StormInstance};
pub use movement::{MovementEngine, MovementUpdate, NearbySubject, StepSettings};
pub use path::StormPath;
pub use phase::PhaseModel;
pub use profiles::{ProfileTable, StormEffects, StormProfile};

#[cfg(test)]
mod tests;
