//! Systems run by the scheduler each tick.
//!
//! Systems are plain functions over the hecs world and the live storm
//! table. They own no state of their own.

pub mod exposure;
pub mod movement;
pub mod snapshot;
