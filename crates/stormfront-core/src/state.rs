//! Scheduler state shapes: the persisted save record and the read-only
//! snapshot handed to display collaborators.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Position, StormId};

/// Everything needed to resume after a restart.
///
/// Fields added after the first release carry serde defaults so older
/// save files still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub phase: SchedulerPhase,
    /// Absolute time of the next legacy storm (scheduler clock seconds).
    #[serde(default)]
    pub next_storm_time: Option<f64>,
    #[serde(default)]
    pub active_storm: Option<PersistedStorm>,
    #[serde(default)]
    pub countdown: Option<PersistedCountdown>,
}

/// A live storm as saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStorm {
    pub class: StormClass,
    pub original_duration_secs: f64,
    pub remaining_secs: f64,
    pub start_time: f64,
    /// Absent in saves written before damage rates were randomized;
    /// the profile's nominal rate is used then.
    #[serde(default)]
    pub actual_damage_rate: Option<f64>,
}

/// An in-flight countdown as saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCountdown {
    pub class: StormClass,
    pub remaining_secs: u32,
}

/// Read-only view of the scheduler for UI/map collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub now: f64,
    pub phase: SchedulerPhase,
    pub burst_mode: bool,
    pub next_storm_time: Option<f64>,
    pub next_burst_time: Option<f64>,
    pub countdown: Option<PersistedCountdown>,
    pub storms: Vec<StormView>,
}

/// One live storm for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormView {
    pub id: StormId,
    pub class: StormClass,
    pub position: Position,
    pub radius: f64,
    pub phase: Option<StormPhase>,
    pub remaining_secs: f64,
    pub duration_secs: f64,
    pub damage_rate: f64,
    pub cadence: Cadence,
    pub zone: ZoneRing,
}
