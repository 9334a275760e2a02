//! ECS components for hecs subject entities.
//!
//! Components are plain data structs. Exposure logic lives in the
//! simulation systems, not here. `Position` and `ActivityMode` are used
//! directly as components.

use serde::{Deserialize, Serialize};

use crate::enums::SubjectKind;
use crate::types::SubjectId;

/// Identity of a player or non-player entity tracked by the storm engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub kind: SubjectKind,
}

/// Hit points. `current` never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Whether the subject is currently loaded/online. Offline subjects are
/// skipped for the tick, never treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub online: bool,
}

/// Remaining duration of status effects applied by storms (seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub blindness_secs: f64,
    pub slowness_secs: f64,
}
