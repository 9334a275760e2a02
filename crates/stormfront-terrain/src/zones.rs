//! Concentric zone rings around a shared center.
//!
//! Classification is an ordered comparison of horizontal distance against
//! three strictly increasing radii. Intervals are closed: a point exactly on
//! a boundary belongs to the inner ring.

use rand::Rng;
use tracing::warn;

use stormfront_core::config::{ClassWeights, ZoneConfig, ZoneSettings};
use stormfront_core::enums::{StormClass, ZoneRing};
use stormfront_core::error::ConfigDefect;
use stormfront_core::types::Position;

/// Width of the synthetic ring beyond the safe band used when a point
/// "outside" is requested, as a multiple of the safe radius.
const OUTSIDE_SPAWN_FACTOR: f64 = 1.5;

/// Read-only zone lookup service.
#[derive(Debug, Clone)]
pub struct ZoneModel {
    center: Position,
    /// Outer radius of core, band and safe rings.
    radii: [f64; 3],
    core: ZoneSettings,
    band: ZoneSettings,
    safe: ZoneSettings,
    outside: ZoneSettings,
}

impl ZoneModel {
    /// Build a model. Radii must be positive and strictly increasing.
    pub fn new(
        center: Position,
        radii: [f64; 3],
        [core, band, safe]: [ZoneSettings; 3],
    ) -> Result<Self, ConfigDefect> {
        let [r0, r1, r2] = radii;
        if !(r0 > 0.0 && r0 < r1 && r1 < r2) {
            return Err(ConfigDefect::new(
                "zones.radii",
                format!("radii must be strictly increasing, got {r0}/{r1}/{r2}"),
                "built-in layout",
            ));
        }
        Ok(Self::build(center, radii, [core, band, safe]))
    }

    fn build(center: Position, radii: [f64; 3], [core, band, safe]: [ZoneSettings; 3]) -> Self {
        let outside = ZoneSettings {
            frequency_multiplier: 0.0,
            ..safe.clone()
        };
        Self {
            center,
            radii,
            core,
            band,
            safe,
            outside,
        }
    }

    /// Build from config, substituting the default layout on a defect.
    pub fn from_config(config: &ZoneConfig) -> Self {
        let settings = [
            config.core.clone(),
            config.band.clone(),
            config.safe.clone(),
        ];
        let radii = [config.core_radius, config.band_radius, config.safe_radius];
        match Self::new(config.center, radii, settings) {
            Ok(model) => model,
            Err(defect) => {
                warn!("{defect}");
                let d = ZoneConfig::default();
                Self::build(
                    d.center,
                    [d.core_radius, d.band_radius, d.safe_radius],
                    [d.core, d.band, d.safe],
                )
            }
        }
    }

    pub fn center(&self) -> Position {
        self.center
    }

    /// Outer radius of a ring. `Outside` has no bound.
    pub fn outer_radius(&self, ring: ZoneRing) -> f64 {
        match ring {
            ZoneRing::HazardCore => self.radii[0],
            ZoneRing::HazardBand => self.radii[1],
            ZoneRing::SafeBand => self.radii[2],
            ZoneRing::Outside => f64::INFINITY,
        }
    }

    /// Inner radius of a ring.
    pub fn inner_radius(&self, ring: ZoneRing) -> f64 {
        match ring {
            ZoneRing::HazardCore => 0.0,
            ZoneRing::HazardBand => self.radii[0],
            ZoneRing::SafeBand => self.radii[1],
            ZoneRing::Outside => self.radii[2],
        }
    }

    /// Ring containing `pos` (horizontal distance from the center).
    pub fn classify(&self, pos: &Position) -> ZoneRing {
        let distance = self.center.horizontal_range_to(pos);
        if distance <= self.radii[0] {
            ZoneRing::HazardCore
        } else if distance <= self.radii[1] {
            ZoneRing::HazardBand
        } else if distance <= self.radii[2] {
            ZoneRing::SafeBand
        } else {
            ZoneRing::Outside
        }
    }

    pub fn settings(&self, ring: ZoneRing) -> &ZoneSettings {
        match ring {
            ZoneRing::HazardCore => &self.core,
            ZoneRing::HazardBand => &self.band,
            ZoneRing::SafeBand => &self.safe,
            ZoneRing::Outside => &self.outside,
        }
    }

    pub fn settings_at(&self, pos: &Position) -> &ZoneSettings {
        self.settings(self.classify(pos))
    }

    /// Base class weights with the ring's overrides applied.
    pub fn effective_weights(&self, base: &ClassWeights, ring: ZoneRing) -> ClassWeights {
        let mut weights = *base;
        for (&class, &weight) in &self.settings(ring).class_weight_overrides {
            if weight.is_finite() && weight >= 0.0 {
                weights.set(class, weight);
            }
        }
        if weights.total() <= 0.0 {
            return *base;
        }
        weights
    }

    /// Relative weight of a class within a ring, for display.
    pub fn class_weight(&self, base: &ClassWeights, ring: ZoneRing, class: StormClass) -> f64 {
        self.effective_weights(base, ring).get(class)
    }

    /// Uniform-by-area random point inside a ring, at the center's height.
    pub fn random_point_in(&self, ring: ZoneRing, rng: &mut impl Rng) -> Position {
        let inner = self.inner_radius(ring);
        let outer = match ring {
            ZoneRing::Outside => self.radii[2] * OUTSIDE_SPAWN_FACTOR,
            _ => self.outer_radius(ring),
        };
        let u: f64 = rng.gen();
        let r = (u * (outer * outer - inner * inner) + inner * inner).sqrt();
        let theta = rng.gen_range(0.0..std::f64::consts::TAU);
        Position::new(
            self.center.x + r * theta.sin(),
            self.center.y + r * theta.cos(),
            self.center.z,
        )
    }

    /// Point on the circle of radius `distance` at `bearing` (0 = North).
    pub fn point_at(&self, bearing: f64, distance: f64) -> Position {
        Position::new(
            self.center.x + distance * bearing.sin(),
            self.center.y + distance * bearing.cos(),
            self.center.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn model() -> ZoneModel {
        ZoneModel::from_config(&ZoneConfig::default())
    }

    #[test]
    fn classify_boundaries_are_inclusive() {
        let z = model();
        assert_eq!(z.classify(&Position::new(0.0, 0.0, 0.0)), ZoneRing::HazardCore);
        assert_eq!(z.classify(&Position::new(1000.0, 0.0, 0.0)), ZoneRing::HazardCore);
        assert_eq!(z.classify(&Position::new(1000.5, 0.0, 0.0)), ZoneRing::HazardBand);
        assert_eq!(z.classify(&Position::new(0.0, 2500.0, 0.0)), ZoneRing::HazardBand);
        assert_eq!(z.classify(&Position::new(0.0, -5000.0, 0.0)), ZoneRing::SafeBand);
        assert_eq!(z.classify(&Position::new(0.0, 5001.0, 0.0)), ZoneRing::Outside);
    }

    #[test]
    fn classify_ignores_height() {
        let z = model();
        assert_eq!(z.classify(&Position::new(10.0, 10.0, 5000.0)), ZoneRing::HazardCore);
    }

    #[test]
    fn non_increasing_radii_rejected() {
        let d = ZoneConfig::default();
        let result = ZoneModel::new(
            Position::default(),
            [100.0, 100.0, 200.0],
            [d.core, d.band, d.safe],
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_config_falls_back_on_bad_radii() {
        let config = ZoneConfig {
            core_radius: 500.0,
            band_radius: 400.0,
            ..ZoneConfig::default()
        };
        let z = ZoneModel::from_config(&config);
        assert_eq!(z.outer_radius(ZoneRing::HazardCore), 1000.0);
    }

    #[test]
    fn outside_never_raises_frequency() {
        let z = model();
        assert_eq!(z.settings(ZoneRing::Outside).frequency_multiplier, 0.0);
        assert_eq!(
            z.settings(ZoneRing::Outside).damage_chance,
            z.settings(ZoneRing::SafeBand).damage_chance
        );
    }

    #[test]
    fn random_points_land_in_requested_ring() {
        let z = model();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for ring in [ZoneRing::HazardCore, ZoneRing::HazardBand, ZoneRing::SafeBand] {
            for _ in 0..500 {
                let p = z.random_point_in(ring, &mut rng);
                assert_eq!(z.classify(&p), ring);
            }
        }
    }

    #[test]
    fn ring_overrides_replace_base_weight() {
        let mut config = ZoneConfig::default();
        config
            .core
            .class_weight_overrides
            .insert(StormClass::Severe, 0.9);
        let z = ZoneModel::from_config(&config);
        let base = ClassWeights::default();
        let core = z.effective_weights(&base, ZoneRing::HazardCore);
        assert_eq!(core.severe, 0.9);
        assert_eq!(core.brief, base.brief);
        let band = z.effective_weights(&base, ZoneRing::HazardBand);
        assert_eq!(band, base);
    }

    #[test]
    fn point_at_is_on_requested_circle() {
        let z = model();
        let p = z.point_at(1.2, 3000.0);
        assert!((z.center().horizontal_range_to(&p) - 3000.0).abs() < 1e-9);
    }
}
