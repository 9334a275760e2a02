//! Snapshot system: builds the read-only scheduler view for display
//! collaborators. Never modifies state.

use std::collections::BTreeMap;

use stormfront_core::enums::SchedulerPhase;
use stormfront_core::state::{PersistedCountdown, SchedulerSnapshot, StormView};
use stormfront_core::types::StormId;
use stormfront_storm::PhaseModel;
use stormfront_terrain::ZoneModel;

use crate::systems::movement::LiveStorm;

/// Scheduler-level fields of a snapshot.
pub struct SchedulerView {
    pub now: f64,
    pub phase: SchedulerPhase,
    pub burst_mode: bool,
    pub next_storm_time: Option<f64>,
    pub next_burst_time: Option<f64>,
    pub countdown: Option<PersistedCountdown>,
}

pub fn build_snapshot(
    view: SchedulerView,
    storms: &BTreeMap<StormId, LiveStorm>,
    phases: Option<&PhaseModel>,
    zones: &ZoneModel,
) -> SchedulerSnapshot {
    SchedulerSnapshot {
        now: view.now,
        phase: view.phase,
        burst_mode: view.burst_mode,
        next_storm_time: view.next_storm_time,
        next_burst_time: view.next_burst_time,
        countdown: view.countdown,
        storms: storms
            .values()
            .map(|live| build_storm(live, phases, zones))
            .collect(),
    }
}

fn build_storm(live: &LiveStorm, phases: Option<&PhaseModel>, zones: &ZoneModel) -> StormView {
    let s = &live.instance;
    StormView {
        id: s.id,
        class: s.class,
        position: s.position,
        radius: s.radius,
        phase: s.phase,
        remaining_secs: s.remaining_secs(),
        duration_secs: s.duration_secs,
        damage_rate: s.current_damage_rate(phases),
        cadence: live.engine.cadence(),
        zone: zones.classify(&s.position),
    }
}
