//! One live storm.
//!
//! Actual duration, damage rate, radius and speed are drawn uniformly from
//! the profile ranges at creation. The profile itself is kept for display
//! (nominal values) and for status-effect flags.

use rand::Rng;
use serde::{Deserialize, Serialize};

use stormfront_core::enums::{StormClass, StormPhase};
use stormfront_core::types::{Position, StormId};

use crate::path::StormPath;
use crate::phase::PhaseModel;
use crate::profiles::StormProfile;

/// Temporary speed replacing the drawn speed until `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedOverride {
    pub speed: f64,
    /// Scheduler clock seconds.
    pub expires_at: f64,
}

#[derive(Debug, Clone)]
pub struct StormInstance {
    pub id: StormId,
    pub class: StormClass,
    pub profile: StormProfile,
    pub duration_secs: f64,
    /// Health per second at full intensity.
    pub damage_rate: f64,
    pub radius: f64,
    /// Blocks per second.
    pub speed: f64,
    /// Scheduler clock seconds. Back-dated on restore.
    pub created_at: f64,
    pub position: Position,
    pub waypoints: Vec<Position>,
    pub path_complete: bool,
    /// `None` when the phase system is disabled.
    pub phase: Option<StormPhase>,
    pub speed_override: Option<SpeedOverride>,
    remaining_secs: f64,
    waypoint_index: usize,
}

impl StormInstance {
    /// Create a fresh storm at the start of `path`.
    pub fn spawn(
        id: StormId,
        profile: &StormProfile,
        rng: &mut impl Rng,
        path: StormPath,
        now: f64,
        phases: Option<&PhaseModel>,
    ) -> Self {
        let duration_secs = draw(rng, profile.min_duration_secs, profile.max_duration_secs);
        let damage_rate = draw(rng, profile.min_damage_rate, profile.max_damage_rate);
        let radius = draw(rng, profile.min_radius, profile.max_radius);
        let speed = draw(rng, profile.min_speed, profile.max_speed);
        let mut storm = Self {
            id,
            class: profile.class,
            profile: profile.clone(),
            duration_secs,
            damage_rate,
            radius,
            speed,
            created_at: now,
            position: path.start,
            path_complete: path.waypoints.is_empty(),
            waypoints: path.waypoints,
            phase: None,
            speed_override: None,
            remaining_secs: duration_secs,
            waypoint_index: 0,
        };
        storm.refresh_phase(phases);
        storm
    }

    /// Rebuild a storm from saved fields. Radius and speed use the profile's
    /// nominal values; `created_at` is back-dated so the storm keeps its
    /// apparent age.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: StormId,
        profile: &StormProfile,
        duration_secs: f64,
        remaining_secs: f64,
        damage_rate: f64,
        path: StormPath,
        now: f64,
        phases: Option<&PhaseModel>,
    ) -> Self {
        let duration_secs = duration_secs.max(0.0);
        let remaining_secs = remaining_secs.clamp(0.0, duration_secs);
        let mut storm = Self {
            id,
            class: profile.class,
            profile: profile.clone(),
            duration_secs,
            damage_rate,
            radius: profile.nominal_radius(),
            speed: profile.nominal_speed(),
            created_at: now - (duration_secs - remaining_secs),
            position: path.start,
            path_complete: path.waypoints.is_empty(),
            waypoints: path.waypoints,
            phase: None,
            speed_override: None,
            remaining_secs,
            waypoint_index: 0,
        };
        storm.refresh_phase(phases);
        storm
    }

    /// Burn `dt` seconds of life. Never goes below zero.
    pub fn advance(&mut self, dt: f64, phases: Option<&PhaseModel>) {
        self.remaining_secs = (self.remaining_secs - dt.max(0.0)).max(0.0);
        self.refresh_phase(phases);
    }

    /// Shorten the storm so it has at most `secs` left, back-dating
    /// `created_at` to match.
    pub fn truncate_remaining(&mut self, secs: f64, phases: Option<&PhaseModel>) {
        let cut = self.remaining_secs - self.remaining_secs.min(secs.max(0.0));
        self.remaining_secs -= cut;
        self.created_at -= cut;
        self.refresh_phase(phases);
    }

    fn refresh_phase(&mut self, phases: Option<&PhaseModel>) {
        self.phase = phases.map(|model| model.phase_at(self.life_fraction()));
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs <= 0.0
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.duration_secs - self.remaining_secs
    }

    /// Share of the storm's life already spent. A zero-duration storm is
    /// fully elapsed.
    pub fn life_fraction(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        (self.elapsed_secs() / self.duration_secs).clamp(0.0, 1.0)
    }

    /// Damage rate after the phase ramp.
    pub fn current_damage_rate(&self, phases: Option<&PhaseModel>) -> f64 {
        let multiplier = phases.map_or(1.0, |model| model.damage_multiplier(self.life_fraction()));
        self.damage_rate * multiplier
    }

    /// Speed in effect at `now`. An expired override is dropped.
    pub fn effective_speed(&mut self, now: f64) -> f64 {
        match self.speed_override {
            Some(o) if now < o.expires_at => o.speed,
            Some(_) => {
                self.speed_override = None;
                self.speed
            }
            None => self.speed,
        }
    }

    pub fn set_speed_override(&mut self, speed: f64, until: f64) {
        self.speed_override = Some(SpeedOverride {
            speed: speed.max(0.0),
            expires_at: until,
        });
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Waypoint currently steered toward, if the path is not complete.
    pub fn current_waypoint(&self) -> Option<Position> {
        self.waypoints.get(self.waypoint_index).copied()
    }

    /// Step to the next waypoint. Marks the path complete after the last.
    pub fn advance_waypoint(&mut self) {
        if self.waypoint_index < self.waypoints.len() {
            self.waypoint_index += 1;
        }
        if self.waypoint_index >= self.waypoints.len() {
            self.path_complete = true;
        }
    }

    /// True when `pos` is inside the storm's footprint (horizontal).
    pub fn covers(&self, pos: &Position) -> bool {
        self.position.horizontal_range_to(pos) <= self.radius
    }
}

fn draw(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}
