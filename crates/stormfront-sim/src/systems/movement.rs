//! Per-storm lifecycle and movement system.

use std::collections::BTreeMap;

use hecs::World;

use stormfront_core::components::{Health, Presence, Subject};
use stormfront_core::constants::TICKS_PER_SECOND;
use stormfront_core::enums::SubjectKind;
use stormfront_core::events::StormEvent;
use stormfront_core::types::{Position, StormId};
use stormfront_storm::{MovementEngine, NearbySubject, StepSettings, StormInstance};

use crate::tasks::PeriodicTask;

/// A live storm with its movement engine and 1 Hz lifecycle task.
#[derive(Debug, Clone)]
pub struct LiveStorm {
    pub instance: StormInstance,
    pub engine: MovementEngine,
    pub task: PeriodicTask,
}

impl LiveStorm {
    pub fn new(instance: StormInstance, now: f64, tick: u64) -> Self {
        let engine = MovementEngine::new(&instance, now);
        Self {
            instance,
            engine,
            task: PeriodicTask::new(TICKS_PER_SECOND, tick),
        }
    }
}

/// Online, living players. Only players hold a storm in active cadence.
pub fn nearby_players(world: &World) -> Vec<NearbySubject> {
    world
        .query::<(&Subject, &Position, &Health, &Presence)>()
        .iter()
        .filter(|(_, (subject, _, health, presence))| {
            subject.kind == SubjectKind::Player && presence.online && !health.is_dead()
        })
        .map(|(_, (subject, position, _, _))| NearbySubject {
            id: subject.id,
            position: *position,
        })
        .collect()
}

/// Step every storm whose lifecycle task is due. Returns the emitted
/// events and the storms that have expired, in id order.
pub fn run(
    storms: &mut BTreeMap<StormId, LiveStorm>,
    nearby: &[NearbySubject],
    tick: u64,
    now: f64,
    settings: StepSettings<'_>,
) -> (Vec<StormEvent>, Vec<StormId>) {
    let mut events = Vec::new();
    let mut expired = Vec::new();
    for (&id, live) in storms.iter_mut() {
        if !live.task.poll(tick) {
            continue;
        }
        let dt = live.task.period_secs();
        let update = live.engine.step(&mut live.instance, now, dt, nearby, settings);
        events.extend(update.events);
        if update.completed {
            expired.push(id);
        }
    }
    (events, expired)
}
