//! Forming / peak / dissipating phase model.
//!
//! A storm's life fraction `f ∈ [0, 1]` is partitioned into three ordered,
//! non-overlapping phases. A boundary belongs to the later phase. The damage
//! multiplier ramps 0→1 while forming, holds 1 at peak and ramps 1→0 while
//! dissipating, so it is continuous at both boundaries.

use stormfront_core::config::PhaseConfig;
use stormfront_core::enums::StormPhase;
use stormfront_core::error::ConfigDefect;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseModel {
    forming: f64,
    peak: f64,
    dissipating: f64,
}

impl Default for PhaseModel {
    fn default() -> Self {
        let d = PhaseConfig::default();
        Self {
            forming: d.forming,
            peak: d.peak,
            dissipating: d.dissipating,
        }
    }
}

impl PhaseModel {
    /// Fractions must be non-negative and sum to at most 1. Any remainder is
    /// folded into peak.
    pub fn new(forming: f64, peak: f64, dissipating: f64) -> Result<Self, ConfigDefect> {
        let valid = [forming, peak, dissipating]
            .iter()
            .all(|f| f.is_finite() && *f >= 0.0);
        let sum = forming + peak + dissipating;
        if !valid || sum > 1.0 + 1e-9 {
            return Err(ConfigDefect::new(
                "phases",
                format!("fractions {forming}/{peak}/{dissipating} invalid"),
                "0.2/0.6/0.2",
            ));
        }
        Ok(Self {
            forming,
            peak: (1.0 - forming - dissipating).max(0.0),
            dissipating,
        })
    }

    /// `None` when the phase system is disabled.
    pub fn from_config(config: &PhaseConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        match Self::new(config.forming, config.peak, config.dissipating) {
            Ok(model) => Some(model),
            Err(defect) => {
                warn!("{defect}");
                Some(Self::default())
            }
        }
    }

    pub fn fraction(&self, phase: StormPhase) -> f64 {
        match phase {
            StormPhase::Forming => self.forming,
            StormPhase::Peak => self.peak,
            StormPhase::Dissipating => self.dissipating,
        }
    }

    /// Life fraction at which `phase` ends.
    pub fn end_of(&self, phase: StormPhase) -> f64 {
        match phase {
            StormPhase::Forming => self.forming,
            StormPhase::Peak => self.forming + self.peak,
            StormPhase::Dissipating => 1.0,
        }
    }

    pub fn phase_at(&self, fraction: f64) -> StormPhase {
        if fraction < self.forming {
            StormPhase::Forming
        } else if fraction < self.forming + self.peak {
            StormPhase::Peak
        } else {
            StormPhase::Dissipating
        }
    }

    pub fn damage_multiplier(&self, fraction: f64) -> f64 {
        let f = fraction.clamp(0.0, 1.0);
        match self.phase_at(f) {
            StormPhase::Forming => f / self.forming,
            StormPhase::Peak => 1.0,
            StormPhase::Dissipating => {
                if self.dissipating > 0.0 {
                    ((1.0 - f) / self.dissipating).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }

    /// Next non-empty phase after the one at `fraction` and the seconds until
    /// it begins, for a storm lasting `duration_secs`.
    pub fn secs_until_next(&self, fraction: f64, duration_secs: f64) -> Option<(StormPhase, f64)> {
        let current = self.phase_at(fraction);
        let mut next = current.next();
        while let Some(phase) = next {
            if self.fraction(phase) > 0.0 {
                let start = self.end_of(current);
                return Some((phase, ((start - fraction) * duration_secs).max(0.0)));
            }
            next = phase.next();
        }
        None
    }
}
