//! Per-storm movement engine.
//!
//! Runs once per lifecycle tick (1 Hz). Life and phase bookkeeping happen on
//! every call; position integration only when the cadence interval has
//! elapsed, and then covers the full time since the last move.

use std::collections::{BTreeSet, HashSet};

use glam::DVec2;
use tracing::debug;

use stormfront_core::config::MovementConfig;
use stormfront_core::constants::ARRIVAL_EPSILON;
use stormfront_core::enums::{Cadence, StormPhase};
use stormfront_core::events::StormEvent;
use stormfront_core::types::{Position, StormId, SubjectId};

use crate::instance::StormInstance;
use crate::phase::PhaseModel;

/// Online subject position handed to the engine each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySubject {
    pub id: SubjectId,
    pub position: Position,
}

/// Settings that apply to every storm's step.
#[derive(Debug, Clone, Copy)]
pub struct StepSettings<'a> {
    pub movement: &'a MovementConfig,
    pub phases: Option<&'a PhaseModel>,
    /// Seconds before a phase change at which nearby subjects are warned.
    pub warning_secs: f64,
}

/// Result of one step.
#[derive(Debug, Default)]
pub struct MovementUpdate {
    pub events: Vec<StormEvent>,
    /// Position was integrated this step.
    pub moved: bool,
    /// The storm has expired and should be torn down.
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct MovementEngine {
    storm: StormId,
    cadence: Cadence,
    last_move_at: f64,
    last_phase: Option<StormPhase>,
    warned: BTreeSet<StormPhase>,
    announced: HashSet<SubjectId>,
}

impl MovementEngine {
    /// Engine for a storm created or restored at `now`.
    pub fn new(instance: &StormInstance, now: f64) -> Self {
        Self {
            storm: instance.id,
            cadence: Cadence::default(),
            last_move_at: now,
            last_phase: instance.phase,
            warned: BTreeSet::new(),
            announced: HashSet::new(),
        }
    }

    pub fn storm(&self) -> StormId {
        self.storm
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Advance the storm by one lifecycle tick of `dt` seconds ending at `now`.
    pub fn step(
        &mut self,
        instance: &mut StormInstance,
        now: f64,
        dt: f64,
        nearby: &[NearbySubject],
        settings: StepSettings<'_>,
    ) -> MovementUpdate {
        let mut update = MovementUpdate::default();

        // 1. Lifecycle
        instance.advance(dt, settings.phases);
        self.detect_phase_change(instance, &mut update.events);
        self.check_phase_warning(instance, nearby, settings, &mut update.events);

        // 2. Cadence
        let cadence = self.evaluate_cadence(instance, nearby, settings.movement);
        if cadence != self.cadence {
            debug!(storm = %self.storm, ?cadence, "cadence changed");
            self.cadence = cadence;
            update.events.push(StormEvent::CadenceChanged {
                storm: self.storm,
                cadence,
            });
        }

        // 3. Position
        let interval = match self.cadence {
            Cadence::Active => settings.movement.active_interval_secs,
            Cadence::Dormant => settings.movement.dormant_interval_secs,
        };
        let since_move = now - self.last_move_at;
        if since_move + 1e-9 >= interval {
            let speed = instance.effective_speed(now);
            travel(instance, speed * since_move);
            self.last_move_at = now;
            update.moved = true;
        }

        // 4. Proximity
        for subject in nearby {
            let distance = instance.position.horizontal_range_to(&subject.position);
            if distance <= settings.movement.announce_radius && self.announced.insert(subject.id) {
                update.events.push(StormEvent::StormApproaching {
                    storm: self.storm,
                    subject: subject.id,
                    distance,
                });
            }
        }

        // 5. Expiry
        update.completed = instance.is_expired();
        update
    }

    fn detect_phase_change(&mut self, instance: &StormInstance, events: &mut Vec<StormEvent>) {
        if instance.phase == self.last_phase {
            return;
        }
        if let Some(to) = instance.phase {
            debug!(storm = %self.storm, from = ?self.last_phase, ?to, "phase changed");
            events.push(StormEvent::PhaseChanged {
                storm: self.storm,
                from: self.last_phase,
                to,
            });
        }
        self.last_phase = instance.phase;
    }

    fn check_phase_warning(
        &mut self,
        instance: &StormInstance,
        nearby: &[NearbySubject],
        settings: StepSettings<'_>,
        events: &mut Vec<StormEvent>,
    ) {
        let Some(model) = settings.phases else {
            return;
        };
        if instance.is_expired() {
            return;
        }
        let Some((upcoming, secs_until)) =
            model.secs_until_next(instance.life_fraction(), instance.duration_secs)
        else {
            return;
        };
        if secs_until > settings.warning_secs || !self.warned.insert(upcoming) {
            return;
        }
        let subjects = nearby
            .iter()
            .filter(|s| {
                instance.position.horizontal_range_to(&s.position)
                    <= settings.movement.announce_radius
            })
            .map(|s| s.id)
            .collect();
        events.push(StormEvent::PhaseWarning {
            storm: self.storm,
            upcoming,
            secs_until,
            subjects,
        });
    }

    fn evaluate_cadence(
        &self,
        instance: &StormInstance,
        nearby: &[NearbySubject],
        config: &MovementConfig,
    ) -> Cadence {
        if !config.adaptive_cadence {
            return Cadence::Active;
        }
        let any_close = nearby
            .iter()
            .any(|s| instance.position.horizontal_range_to(&s.position) <= config.active_range);
        if any_close {
            Cadence::Active
        } else {
            Cadence::Dormant
        }
    }
}

/// Move along the path by up to `budget` blocks. Arrival within the epsilon
/// advances the waypoint; a step never overshoots its waypoint, and leftover
/// travel carries on toward the next one.
pub fn travel(instance: &mut StormInstance, budget: f64) {
    let mut budget = budget.max(0.0);
    while let Some(target) = instance.current_waypoint() {
        let here = DVec2::new(instance.position.x, instance.position.y);
        let there = DVec2::new(target.x, target.y);
        let distance = here.distance(there);
        if distance <= ARRIVAL_EPSILON {
            instance.advance_waypoint();
            continue;
        }
        if budget <= 0.0 {
            break;
        }
        if budget >= distance {
            instance.position = target;
            budget -= distance;
            instance.advance_waypoint();
            continue;
        }
        let next = here + (there - here) / distance * budget;
        instance.position.x = next.x;
        instance.position.y = next.y;
        break;
    }
}
