//! Notifications emitted by the storm engine.
//!
//! Events are immutable values handed to listeners (map overlays, UI,
//! economy, persistence). The engine never waits on their handling.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Position, StormId, SubjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StormEvent {
    /// Countdown to landfall began.
    CountdownStarted { class: StormClass, seconds: u32 },
    /// Countdown reached an announce checkpoint.
    CountdownAnnouncement {
        class: StormClass,
        remaining_secs: u32,
    },
    /// Countdown was cancelled before landfall.
    CountdownCancelled { class: StormClass },
    /// Countdown finished; the storm is live.
    Landfall { storm: StormId, class: StormClass },
    /// A storm instance was created.
    StormCreated {
        storm: StormId,
        class: StormClass,
        position: Position,
        radius: f64,
        duration_secs: f64,
        damage_rate: f64,
    },
    /// Exposure tick result for one storm.
    StormTick {
        storm: StormId,
        position: Position,
        phase: Option<StormPhase>,
        damage_rate: f64,
        exposed: Vec<SubjectId>,
    },
    /// A storm entered a new lifecycle phase.
    PhaseChanged {
        storm: StormId,
        from: Option<StormPhase>,
        to: StormPhase,
    },
    /// One-shot warning that the next phase is close.
    PhaseWarning {
        storm: StormId,
        upcoming: StormPhase,
        secs_until: f64,
        subjects: Vec<SubjectId>,
    },
    /// A storm's update cadence changed.
    CadenceChanged { storm: StormId, cadence: Cadence },
    /// A subject came within announce range of a storm.
    StormApproaching {
        storm: StormId,
        subject: SubjectId,
        distance: f64,
    },
    /// A storm ended and was torn down.
    StormEnded { storm: StormId, reason: EndReason },
    /// Legacy mode returned to idle. Carries the wait until the next storm.
    AllClear { next_storm_in_secs: f64 },
    /// A burst of storms spawned.
    BurstSpawned { storms: Vec<StormId> },
    /// A due burst was skipped because the concurrency cap is reached.
    BurstSkipped { live: u32, max_concurrent: u32 },
    /// A subject took storm damage.
    SubjectDamaged {
        subject: SubjectId,
        storm: StormId,
        amount: f64,
        health_after: f64,
        /// Zone essence multiplier at the subject's position (economy sinks).
        essence_multiplier: f64,
    },
    /// A status effect was applied to a player.
    StatusEffectApplied {
        subject: SubjectId,
        effect: StatusEffectKind,
        duration_secs: f64,
    },
    /// Lightning struck a player.
    LightningStrike {
        subject: SubjectId,
        storm: StormId,
        position: Position,
    },
}

impl StormEvent {
    /// Storm this event concerns, if any.
    pub fn storm(&self) -> Option<StormId> {
        match self {
            Self::Landfall { storm, .. }
            | Self::StormCreated { storm, .. }
            | Self::StormTick { storm, .. }
            | Self::PhaseChanged { storm, .. }
            | Self::PhaseWarning { storm, .. }
            | Self::CadenceChanged { storm, .. }
            | Self::StormApproaching { storm, .. }
            | Self::StormEnded { storm, .. }
            | Self::SubjectDamaged { storm, .. }
            | Self::LightningStrike { storm, .. } => Some(*storm),
            _ => None,
        }
    }
}
