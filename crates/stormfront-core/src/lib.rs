//! Core types and definitions for the STORMFRONT weather engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! subject components, admin commands, persisted state, events, config
//! and constants. It has no dependency on any host runtime.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
