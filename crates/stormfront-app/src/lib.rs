//! STORMFRONT headless host.
//!
//! Drives the storm scheduler on its own thread at the game tick rate and
//! exposes the admin operations through a line-oriented console.

pub mod console;
pub mod game_loop;
pub mod state;

pub use stormfront_core as core;
