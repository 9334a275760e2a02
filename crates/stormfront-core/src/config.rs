//! Tunable configuration.
//!
//! Every struct is `#[serde(default)]` so partial and older config files
//! load. `sanitize` replaces out-of-range values with the built-in defaults
//! and reports each substitution as a [`ConfigDefect`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::*;
use crate::enums::{ActivityMode, StormClass};
use crate::error::ConfigDefect;
use crate::types::Position;

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormConfig {
    pub schedule: ScheduleConfig,
    pub burst: BurstConfig,
    /// Per-class overrides of the built-in storm profiles.
    pub profiles: BTreeMap<StormClass, ProfileOverride>,
    pub weights: ClassWeights,
    pub movement: MovementConfig,
    pub phases: PhaseConfig,
    pub exposure: ExposureConfig,
    pub entities: EntityExposureConfig,
    pub zones: ZoneConfig,
}

/// Legacy single-storm scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minimum delay between storms (seconds).
    pub min_interval_secs: f64,
    /// Maximum delay between storms (seconds).
    pub max_interval_secs: f64,
    /// Countdown length before landfall (seconds).
    pub countdown_secs: u32,
    /// Remaining-second checkpoints announced during the countdown.
    pub announce_at: Vec<u32>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: DEFAULT_MIN_INTERVAL_SECS,
            max_interval_secs: DEFAULT_MAX_INTERVAL_SECS,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            announce_at: DEFAULT_ANNOUNCE_AT.to_vec(),
        }
    }
}

/// Erratic multi-storm ("burst") spawning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub enabled: bool,
    pub min_burst: u32,
    pub max_burst: u32,
    /// Burst size -> relative weight. Empty means uniform over
    /// `min_burst..=max_burst`.
    pub size_weights: BTreeMap<u32, f64>,
    pub max_concurrent: u32,
    pub min_interval_secs: f64,
    pub max_interval_secs: f64,
    /// Share of `max_concurrent` seeded on a cold start.
    pub initial_fill_ratio: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_burst: 1,
            max_burst: 6,
            size_weights: BTreeMap::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            min_interval_secs: DEFAULT_BURST_MIN_INTERVAL_SECS,
            max_interval_secs: DEFAULT_BURST_MAX_INTERVAL_SECS,
            initial_fill_ratio: INITIAL_POPULATION_RATIO,
        }
    }
}

/// Optional per-field override of a built-in storm profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    pub display_name: Option<String>,
    pub min_duration_secs: Option<f64>,
    pub max_duration_secs: Option<f64>,
    pub min_damage_rate: Option<f64>,
    pub max_damage_rate: Option<f64>,
    pub min_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub min_radius: Option<f64>,
    pub max_radius: Option<f64>,
    pub blindness: Option<bool>,
    pub slowness: Option<bool>,
    pub lightning_chance: Option<f64>,
}

/// Relative spawn weight of each storm class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassWeights {
    pub brief: f64,
    pub moderate: f64,
    pub severe: f64,
}

impl Default for ClassWeights {
    fn default() -> Self {
        Self {
            brief: DEFAULT_WEIGHT_BRIEF,
            moderate: DEFAULT_WEIGHT_MODERATE,
            severe: DEFAULT_WEIGHT_SEVERE,
        }
    }
}

impl ClassWeights {
    pub fn get(&self, class: StormClass) -> f64 {
        match class {
            StormClass::Brief => self.brief,
            StormClass::Moderate => self.moderate,
            StormClass::Severe => self.severe,
        }
    }

    pub fn set(&mut self, class: StormClass, weight: f64) {
        match class {
            StormClass::Brief => self.brief = weight,
            StormClass::Moderate => self.moderate = weight,
            StormClass::Severe => self.severe = weight,
        }
    }

    pub fn total(&self) -> f64 {
        self.brief + self.moderate + self.severe
    }
}

/// Storm movement and adaptive cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// When false every storm stays in active cadence.
    pub adaptive_cadence: bool,
    /// Range within which a subject keeps a storm active (blocks).
    pub active_range: f64,
    pub active_interval_secs: f64,
    pub dormant_interval_secs: f64,
    /// Range at which an approaching storm is announced (blocks).
    pub announce_radius: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            adaptive_cadence: true,
            active_range: DEFAULT_ACTIVE_RANGE,
            active_interval_secs: DEFAULT_ACTIVE_INTERVAL_SECS,
            dormant_interval_secs: DEFAULT_DORMANT_INTERVAL_SECS,
            announce_radius: DEFAULT_ANNOUNCE_RADIUS,
        }
    }
}

/// Forming / peak / dissipating phase system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    pub enabled: bool,
    pub forming: f64,
    pub peak: f64,
    pub dissipating: f64,
    /// Seconds before a phase change at which nearby subjects are warned.
    pub warning_secs: f64,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            forming: DEFAULT_FORMING_FRACTION,
            peak: DEFAULT_PEAK_FRACTION,
            dissipating: DEFAULT_DISSIPATING_FRACTION,
            warning_secs: DEFAULT_PHASE_WARNING_SECS,
        }
    }
}

/// Player exposure pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Storms affect only subjects inside their radius. When false, any
    /// active storm affects every exposed subject (global weather).
    pub spatial: bool,
    pub check_interval_ticks: u64,
    pub grace_period_secs: f64,
    pub cooldown_secs: f64,
    pub max_accumulated_secs: f64,
    /// Multiply damage by the grace-period ramp on top of the phase ramp.
    pub compose_grace_ramp: bool,
    /// Depth below the top solid surface that counts as underground.
    pub min_depth: f64,
    pub min_cover_blocks: u32,
    pub leaves_are_cover: bool,
    pub glass_is_cover: bool,
    pub ignored_modes: Vec<ActivityMode>,
    pub status_effects: bool,
    /// Damage dealt by a lightning strike.
    pub lightning_damage: f64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            spatial: true,
            check_interval_ticks: DEFAULT_EXPOSURE_INTERVAL_TICKS,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            max_accumulated_secs: DEFAULT_MAX_ACCUMULATED_SECS,
            compose_grace_ramp: true,
            min_depth: DEFAULT_MIN_DEPTH,
            min_cover_blocks: DEFAULT_MIN_COVER_BLOCKS,
            leaves_are_cover: true,
            glass_is_cover: true,
            ignored_modes: vec![ActivityMode::Creative, ActivityMode::Spectator],
            status_effects: true,
            lightning_damage: 4.0,
        }
    }
}

/// Non-player entity exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityExposureConfig {
    pub enabled: bool,
    pub check_interval_ticks: u64,
    /// Scale applied to the storm damage rate for entities.
    pub damage_multiplier: f64,
}

impl Default for EntityExposureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_ticks: DEFAULT_ENTITY_INTERVAL_TICKS,
            damage_multiplier: 1.0,
        }
    }
}

/// Concentric zone layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub center: Position,
    pub core_radius: f64,
    pub band_radius: f64,
    pub safe_radius: f64,
    pub core: ZoneSettings,
    pub band: ZoneSettings,
    pub safe: ZoneSettings,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            center: Position::default(),
            core_radius: DEFAULT_CORE_RADIUS,
            band_radius: DEFAULT_BAND_RADIUS,
            safe_radius: DEFAULT_SAFE_RADIUS,
            core: ZoneSettings {
                frequency_multiplier: 1.5,
                essence_multiplier: 2.0,
                resource_multiplier: 1.5,
                block_damage_chance: 0.2,
                drop_chance: 0.1,
                ..ZoneSettings::default()
            },
            band: ZoneSettings::default(),
            safe: ZoneSettings {
                frequency_multiplier: 0.5,
                damage_chance: 0.5,
                block_damage_enabled: false,
                drops_enabled: false,
                ..ZoneSettings::default()
            },
        }
    }
}

/// Settings attached to one zone ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// Replaces the base class weight for storms spawned in this ring.
    pub class_weight_overrides: BTreeMap<StormClass, f64>,
    pub frequency_multiplier: f64,
    pub essence_multiplier: f64,
    pub resource_multiplier: f64,
    pub block_damage_enabled: bool,
    pub block_damage_chance: f64,
    pub drops_enabled: bool,
    pub drop_chance: f64,
    /// Probability that an exposed subject takes damage on a given check.
    pub damage_chance: f64,
    pub biome_weights: BTreeMap<String, f64>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            class_weight_overrides: BTreeMap::new(),
            frequency_multiplier: 1.0,
            essence_multiplier: 1.0,
            resource_multiplier: 1.0,
            block_damage_enabled: true,
            block_damage_chance: 0.1,
            drops_enabled: true,
            drop_chance: 0.05,
            damage_chance: 1.0,
            biome_weights: BTreeMap::new(),
        }
    }
}

impl StormConfig {
    /// Load and sanitize a config file. Never fails: unreadable or malformed
    /// files yield the built-in defaults.
    pub fn load(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "malformed storm config, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "storm config unreadable, using defaults"
                );
                Self::default()
            }
        };
        let (config, defects) = config.sanitized();
        info!(path = %path.display(), defects = defects.len(), "storm config loaded");
        config
    }

    /// Parse without sanitizing.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Consume, sanitize, log each defect and return both.
    pub fn sanitized(mut self) -> (Self, Vec<ConfigDefect>) {
        let defects = self.sanitize();
        for defect in &defects {
            warn!("{defect}");
        }
        (self, defects)
    }

    /// Replace invalid values with defaults in place.
    pub fn sanitize(&mut self) -> Vec<ConfigDefect> {
        let mut defects = Vec::new();
        self.sanitize_schedule(&mut defects);
        self.sanitize_burst(&mut defects);
        self.sanitize_weights(&mut defects);
        self.sanitize_movement(&mut defects);
        self.sanitize_phases(&mut defects);
        self.sanitize_exposure(&mut defects);
        self.sanitize_zones(&mut defects);
        defects
    }

    fn sanitize_schedule(&mut self, defects: &mut Vec<ConfigDefect>) {
        let d = ScheduleConfig::default();
        let s = &mut self.schedule;
        if !interval_ok(s.min_interval_secs, s.max_interval_secs) {
            defects.push(ConfigDefect::new(
                "schedule.interval",
                format!("invalid range {}..{}", s.min_interval_secs, s.max_interval_secs),
                format!("{}..{}", d.min_interval_secs, d.max_interval_secs),
            ));
            s.min_interval_secs = d.min_interval_secs;
            s.max_interval_secs = d.max_interval_secs;
        }
        // Descending, unique, non-zero.
        s.announce_at.retain(|&secs| secs > 0);
        s.announce_at.sort_unstable_by(|a, b| b.cmp(a));
        s.announce_at.dedup();
    }

    fn sanitize_burst(&mut self, defects: &mut Vec<ConfigDefect>) {
        let d = BurstConfig::default();
        let b = &mut self.burst;
        if b.max_concurrent == 0 {
            defects.push(ConfigDefect::new(
                "burst.max_concurrent",
                "must be positive",
                d.max_concurrent,
            ));
            b.max_concurrent = d.max_concurrent;
        }
        if b.min_burst == 0 || b.min_burst > b.max_burst {
            defects.push(ConfigDefect::new(
                "burst.size",
                format!("invalid range {}..={}", b.min_burst, b.max_burst),
                format!("{}..={}", d.min_burst, d.max_burst),
            ));
            b.min_burst = d.min_burst;
            b.max_burst = d.max_burst;
        }
        let before = b.size_weights.len();
        b.size_weights
            .retain(|&size, &mut w| size > 0 && w.is_finite() && w > 0.0);
        if b.size_weights.len() != before {
            defects.push(ConfigDefect::new(
                "burst.size_weights",
                "dropped zero-size or non-positive entries",
                "remaining entries",
            ));
        }
        if !interval_ok(b.min_interval_secs, b.max_interval_secs) {
            defects.push(ConfigDefect::new(
                "burst.interval",
                format!("invalid range {}..{}", b.min_interval_secs, b.max_interval_secs),
                format!("{}..{}", d.min_interval_secs, d.max_interval_secs),
            ));
            b.min_interval_secs = d.min_interval_secs;
            b.max_interval_secs = d.max_interval_secs;
        }
        if !(0.0..=1.0).contains(&b.initial_fill_ratio) {
            defects.push(ConfigDefect::new(
                "burst.initial_fill_ratio",
                "must be within 0..=1",
                d.initial_fill_ratio,
            ));
            b.initial_fill_ratio = d.initial_fill_ratio;
        }
    }

    fn sanitize_weights(&mut self, defects: &mut Vec<ConfigDefect>) {
        let w = &self.weights;
        let valid = [w.brief, w.moderate, w.severe]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        if !valid || w.total() <= 0.0 {
            defects.push(ConfigDefect::new(
                "weights",
                "weights must be non-negative with a positive total",
                "0.25/0.60/0.15",
            ));
            self.weights = ClassWeights::default();
        }
    }

    fn sanitize_movement(&mut self, defects: &mut Vec<ConfigDefect>) {
        let d = MovementConfig::default();
        let m = &mut self.movement;
        if !(m.active_interval_secs > 0.0) {
            defects.push(ConfigDefect::new(
                "movement.active_interval_secs",
                "must be positive",
                d.active_interval_secs,
            ));
            m.active_interval_secs = d.active_interval_secs;
        }
        if !(m.dormant_interval_secs >= m.active_interval_secs) {
            defects.push(ConfigDefect::new(
                "movement.dormant_interval_secs",
                "must be at least the active interval",
                d.dormant_interval_secs.max(m.active_interval_secs),
            ));
            m.dormant_interval_secs = d.dormant_interval_secs.max(m.active_interval_secs);
        }
        if !(m.active_range >= 0.0) {
            defects.push(ConfigDefect::new(
                "movement.active_range",
                "must be non-negative",
                d.active_range,
            ));
            m.active_range = d.active_range;
        }
    }

    fn sanitize_phases(&mut self, defects: &mut Vec<ConfigDefect>) {
        let d = PhaseConfig::default();
        let p = &mut self.phases;
        let fractions = [p.forming, p.peak, p.dissipating];
        let valid = fractions.iter().all(|f| f.is_finite() && *f >= 0.0);
        if !valid || p.forming + p.peak + p.dissipating > 1.0 + 1e-9 {
            defects.push(ConfigDefect::new(
                "phases",
                "fractions must be non-negative and sum to at most 1",
                format!("{}/{}/{}", d.forming, d.peak, d.dissipating),
            ));
            p.forming = d.forming;
            p.peak = d.peak;
            p.dissipating = d.dissipating;
        }
        if !(p.warning_secs >= 0.0) {
            defects.push(ConfigDefect::new(
                "phases.warning_secs",
                "must be non-negative",
                d.warning_secs,
            ));
            p.warning_secs = d.warning_secs;
        }
    }

    fn sanitize_exposure(&mut self, defects: &mut Vec<ConfigDefect>) {
        let d = ExposureConfig::default();
        let e = &mut self.exposure;
        if e.check_interval_ticks == 0 {
            defects.push(ConfigDefect::new(
                "exposure.check_interval_ticks",
                "must be positive",
                d.check_interval_ticks,
            ));
            e.check_interval_ticks = d.check_interval_ticks;
        }
        if !(e.cooldown_secs >= 0.0) {
            defects.push(ConfigDefect::new(
                "exposure.cooldown_secs",
                "must be non-negative",
                d.cooldown_secs,
            ));
            e.cooldown_secs = d.cooldown_secs;
        }
        if !(e.max_accumulated_secs > 0.0) {
            defects.push(ConfigDefect::new(
                "exposure.max_accumulated_secs",
                "must be positive",
                d.max_accumulated_secs,
            ));
            e.max_accumulated_secs = d.max_accumulated_secs;
        }
        let ent = &mut self.entities;
        if ent.check_interval_ticks == 0 {
            let d = EntityExposureConfig::default();
            defects.push(ConfigDefect::new(
                "entities.check_interval_ticks",
                "must be positive",
                d.check_interval_ticks,
            ));
            ent.check_interval_ticks = d.check_interval_ticks;
        }
    }

    fn sanitize_zones(&mut self, defects: &mut Vec<ConfigDefect>) {
        let d = ZoneConfig::default();
        let z = &mut self.zones;
        let increasing = z.core_radius > 0.0
            && z.core_radius < z.band_radius
            && z.band_radius < z.safe_radius;
        if !increasing {
            defects.push(ConfigDefect::new(
                "zones.radii",
                format!(
                    "radii must be strictly increasing, got {}/{}/{}",
                    z.core_radius, z.band_radius, z.safe_radius
                ),
                format!("{}/{}/{}", d.core_radius, d.band_radius, d.safe_radius),
            ));
            z.core_radius = d.core_radius;
            z.band_radius = d.band_radius;
            z.safe_radius = d.safe_radius;
        }
    }
}

fn interval_ok(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min >= 0.0 && min <= max && max > 0.0
}
