//! World geometry for STORMFRONT.
//!
//! Concentric zone rings with their multiplier tables, overhead-cover
//! and sky-exposure checks, and region protection queries.

pub use stormfront_core as core;

pub mod cover;
pub mod protection;
pub mod zones;

// Re-export key types for convenience.
pub use cover::{sky_exposed, BlockGrid, BlockKind, CoverRules, WorldColumns};
pub use protection::{ProtectedRegions, ProtectionOracle, Region, Unprotected};
pub use zones::ZoneModel;
