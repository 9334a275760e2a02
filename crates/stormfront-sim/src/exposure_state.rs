//! Per-subject exposure bookkeeping.
//!
//! Pure state keyed by subject identity; entries are created lazily on first
//! observation. Re-entering a storm during the cooldown that follows leaving
//! it keeps the accumulated exposure, so hopping in and out does not re-grant
//! the grace period. Re-entering after the cooldown starts from zero.

use std::collections::HashMap;

use stormfront_core::config::ExposureConfig;
use stormfront_core::types::{StormId, SubjectId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureState {
    pub first_exposure_at: Option<f64>,
    pub last_exposure_at: Option<f64>,
    pub last_damage_at: Option<f64>,
    /// Capped at the configured maximum.
    pub accumulated_secs: f64,
    pub in_storm: bool,
    /// Set when the subject leaves a storm.
    pub cooldown_until: Option<f64>,
    pub immune_until: Option<f64>,
    pub immunity_source: Option<String>,
    pub last_seen_storm: Option<StormId>,
}

impl ExposureState {
    pub fn in_cooldown(&self, now: f64) -> bool {
        !self.in_storm && self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn is_immune(&self, now: f64) -> bool {
        self.immune_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Clone)]
pub struct ExposureStateTracker {
    states: HashMap<SubjectId, ExposureState>,
    cooldown_secs: f64,
    max_accumulated_secs: f64,
}

impl ExposureStateTracker {
    pub fn new(cooldown_secs: f64, max_accumulated_secs: f64) -> Self {
        Self {
            states: HashMap::new(),
            cooldown_secs,
            max_accumulated_secs,
        }
    }

    pub fn from_config(config: &ExposureConfig) -> Self {
        Self::new(config.cooldown_secs, config.max_accumulated_secs)
    }

    /// Apply new limits; tracked state is kept.
    pub fn reconfigure(&mut self, config: &ExposureConfig) {
        self.cooldown_secs = config.cooldown_secs;
        self.max_accumulated_secs = config.max_accumulated_secs;
        for state in self.states.values_mut() {
            state.accumulated_secs = state.accumulated_secs.min(self.max_accumulated_secs);
        }
    }

    fn entry(&mut self, id: SubjectId) -> &mut ExposureState {
        self.states.entry(id).or_default()
    }

    pub fn enter_storm(&mut self, id: SubjectId, now: f64) {
        let state = self.entry(id);
        if state.in_storm {
            return;
        }
        let cooled_off = state.cooldown_until.is_none_or(|until| now >= until);
        if cooled_off {
            state.accumulated_secs = 0.0;
            state.first_exposure_at = Some(now);
        }
        state.in_storm = true;
        state.cooldown_until = None;
        state.last_exposure_at = Some(now);
    }

    pub fn leave_storm(&mut self, id: SubjectId, now: f64) {
        let cooldown = self.cooldown_secs;
        let state = self.entry(id);
        if !state.in_storm {
            return;
        }
        state.in_storm = false;
        state.cooldown_until = Some(now + cooldown);
    }

    /// Accumulate `dt` seconds of exposure while in a storm and not immune.
    pub fn update_exposure(&mut self, id: SubjectId, dt: f64, now: f64) {
        let cap = self.max_accumulated_secs;
        let state = self.entry(id);
        if !state.in_storm || state.is_immune(now) {
            return;
        }
        state.accumulated_secs = (state.accumulated_secs + dt.max(0.0)).min(cap);
        state.last_exposure_at = Some(now);
    }

    /// Grace-period ramp: 0 with no exposure, linear to 1 at `grace_secs`.
    pub fn damage_multiplier(&self, id: SubjectId, grace_secs: f64) -> f64 {
        if grace_secs <= 0.0 {
            return 1.0;
        }
        let accumulated = self.states.get(&id).map_or(0.0, |s| s.accumulated_secs);
        (accumulated / grace_secs).min(1.0)
    }

    pub fn grant_immunity(&mut self, id: SubjectId, until: f64, source: impl Into<String>) {
        let state = self.entry(id);
        state.immune_until = Some(until);
        state.immunity_source = Some(source.into());
    }

    pub fn is_immune(&self, id: SubjectId, now: f64) -> bool {
        self.states.get(&id).is_some_and(|s| s.is_immune(now))
    }

    pub fn in_cooldown(&self, id: SubjectId, now: f64) -> bool {
        self.states.get(&id).is_some_and(|s| s.in_cooldown(now))
    }

    pub fn in_storm(&self, id: SubjectId) -> bool {
        self.states.get(&id).is_some_and(|s| s.in_storm)
    }

    pub fn mark_damaged(&mut self, id: SubjectId, now: f64) {
        self.entry(id).last_damage_at = Some(now);
    }

    pub fn mark_seen(&mut self, id: SubjectId, storm: StormId) {
        self.entry(id).last_seen_storm = Some(storm);
    }

    pub fn forget(&mut self, id: SubjectId) -> Option<ExposureState> {
        self.states.remove(&id)
    }

    pub fn get(&self, id: SubjectId) -> Option<&ExposureState> {
        self.states.get(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const P: SubjectId = SubjectId(1);

    fn tracker() -> ExposureStateTracker {
        ExposureStateTracker::new(30.0, 600.0)
    }

    fn expose(t: &mut ExposureStateTracker, from: f64, secs: u32) {
        for i in 0..secs {
            t.update_exposure(P, 1.0, from + i as f64);
        }
    }

    #[test]
    fn reentry_during_cooldown_preserves_exposure() {
        let mut t = tracker();
        t.enter_storm(P, 0.0);
        expose(&mut t, 0.0, 8);
        t.leave_storm(P, 8.0);
        assert!(t.in_cooldown(P, 20.0));
        t.enter_storm(P, 20.0);
        let state = t.get(P).unwrap();
        assert_relative_eq!(state.accumulated_secs, 8.0);
        assert_eq!(state.first_exposure_at, Some(0.0));
    }

    #[test]
    fn reentry_after_cooldown_resets_exposure() {
        let mut t = tracker();
        t.enter_storm(P, 0.0);
        expose(&mut t, 0.0, 8);
        t.leave_storm(P, 8.0);
        assert!(!t.in_cooldown(P, 38.0));
        t.enter_storm(P, 38.0);
        let state = t.get(P).unwrap();
        assert_eq!(state.accumulated_secs, 0.0);
        assert_eq!(state.first_exposure_at, Some(38.0));
    }

    #[test]
    fn accumulation_is_capped() {
        let mut t = ExposureStateTracker::new(30.0, 5.0);
        t.enter_storm(P, 0.0);
        expose(&mut t, 0.0, 20);
        assert_relative_eq!(t.get(P).unwrap().accumulated_secs, 5.0);
    }

    #[test]
    fn grace_ramp() {
        let mut t = tracker();
        assert_eq!(t.damage_multiplier(P, 10.0), 0.0);
        assert_eq!(t.damage_multiplier(P, 0.0), 1.0);
        t.enter_storm(P, 0.0);
        expose(&mut t, 0.0, 4);
        assert_relative_eq!(t.damage_multiplier(P, 10.0), 0.4);
        expose(&mut t, 4.0, 20);
        assert_relative_eq!(t.damage_multiplier(P, 10.0), 1.0);
    }

    #[test]
    fn immunity_blocks_accumulation() {
        let mut t = tracker();
        t.grant_immunity(P, 5.0, "respawn");
        t.enter_storm(P, 0.0);
        expose(&mut t, 0.0, 5);
        assert_eq!(t.get(P).unwrap().accumulated_secs, 0.0);
        assert!(!t.is_immune(P, 5.0));
        t.update_exposure(P, 1.0, 5.0);
        assert_relative_eq!(t.get(P).unwrap().accumulated_secs, 1.0);
        assert_eq!(t.get(P).unwrap().immunity_source.as_deref(), Some("respawn"));
    }

    #[test]
    fn outside_storm_does_not_accumulate() {
        let mut t = tracker();
        t.update_exposure(P, 1.0, 0.0);
        assert_eq!(t.get(P).unwrap().accumulated_secs, 0.0);
        assert!(t.forget(P).is_some());
        assert!(t.is_empty());
    }
}
