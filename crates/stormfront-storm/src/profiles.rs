//! Storm class profiles and weighted class selection.
//!
//! Built-in profiles cover all three classes. Config overrides are merged
//! field by field; an override that leaves a min/max pair inverted or
//! negative is discarded in favor of the built-in profile.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use stormfront_core::config::{ClassWeights, ProfileOverride};
use stormfront_core::enums::StormClass;
use stormfront_core::error::ConfigDefect;

use crate::weighted::weighted_index;

/// Class used when a weighted draw fails.
pub const FALLBACK_CLASS: StormClass = StormClass::Moderate;

/// Optional status effects carried by a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StormEffects {
    pub blindness: bool,
    pub slowness: bool,
    /// Per-check probability of a lightning strike on an exposed player.
    pub lightning_chance: f64,
}

/// Immutable storm template. Live storms draw actual values from each range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormProfile {
    pub class: StormClass,
    pub display_name: String,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
    /// Health per second at full intensity.
    pub min_damage_rate: f64,
    pub max_damage_rate: f64,
    /// Blocks per second.
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub effects: StormEffects,
}

impl StormProfile {
    pub fn nominal_duration_secs(&self) -> f64 {
        (self.min_duration_secs + self.max_duration_secs) / 2.0
    }

    pub fn nominal_damage_rate(&self) -> f64 {
        (self.min_damage_rate + self.max_damage_rate) / 2.0
    }

    pub fn nominal_speed(&self) -> f64 {
        (self.min_speed + self.max_speed) / 2.0
    }

    pub fn nominal_radius(&self) -> f64 {
        (self.min_radius + self.max_radius) / 2.0
    }

    /// Copy with both duration bounds pinned to `secs`.
    pub fn with_fixed_duration(&self, secs: f64) -> Self {
        Self {
            min_duration_secs: secs,
            max_duration_secs: secs,
            ..self.clone()
        }
    }

    /// Check every min/max pair is finite, non-negative and ordered.
    pub fn validate(&self) -> Result<(), String> {
        let pairs = [
            ("duration", self.min_duration_secs, self.max_duration_secs),
            ("damage_rate", self.min_damage_rate, self.max_damage_rate),
            ("speed", self.min_speed, self.max_speed),
            ("radius", self.min_radius, self.max_radius),
        ];
        for (name, min, max) in pairs {
            if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
                return Err(format!("{name} range {min}..{max} is invalid"));
            }
        }
        if !(0.0..=1.0).contains(&self.effects.lightning_chance) {
            return Err(format!(
                "lightning_chance {} outside 0..=1",
                self.effects.lightning_chance
            ));
        }
        Ok(())
    }

    fn apply(&self, o: &ProfileOverride) -> Self {
        Self {
            class: self.class,
            display_name: o
                .display_name
                .clone()
                .unwrap_or_else(|| self.display_name.clone()),
            min_duration_secs: o.min_duration_secs.unwrap_or(self.min_duration_secs),
            max_duration_secs: o.max_duration_secs.unwrap_or(self.max_duration_secs),
            min_damage_rate: o.min_damage_rate.unwrap_or(self.min_damage_rate),
            max_damage_rate: o.max_damage_rate.unwrap_or(self.max_damage_rate),
            min_speed: o.min_speed.unwrap_or(self.min_speed),
            max_speed: o.max_speed.unwrap_or(self.max_speed),
            min_radius: o.min_radius.unwrap_or(self.min_radius),
            max_radius: o.max_radius.unwrap_or(self.max_radius),
            effects: StormEffects {
                blindness: o.blindness.unwrap_or(self.effects.blindness),
                slowness: o.slowness.unwrap_or(self.effects.slowness),
                lightning_chance: o.lightning_chance.unwrap_or(self.effects.lightning_chance),
            },
        }
    }
}

/// Get the built-in profile for a class.
pub fn builtin_profile(class: StormClass) -> StormProfile {
    match class {
        StormClass::Brief => StormProfile {
            class,
            display_name: "Dust Squall".into(),
            min_duration_secs: 120.0,
            max_duration_secs: 300.0,
            min_damage_rate: 0.5,
            max_damage_rate: 1.0,
            min_speed: 2.0,
            max_speed: 4.0,
            min_radius: 150.0,
            max_radius: 300.0,
            effects: StormEffects::default(),
        },
        StormClass::Moderate => StormProfile {
            class,
            display_name: "Sandstorm".into(),
            min_duration_secs: 300.0,
            max_duration_secs: 600.0,
            min_damage_rate: 1.0,
            max_damage_rate: 2.0,
            min_speed: 3.0,
            max_speed: 6.0,
            min_radius: 250.0,
            max_radius: 450.0,
            effects: StormEffects {
                blindness: false,
                slowness: true,
                lightning_chance: 0.01,
            },
        },
        StormClass::Severe => StormProfile {
            class,
            display_name: "Haboob".into(),
            min_duration_secs: 600.0,
            max_duration_secs: 1200.0,
            min_damage_rate: 2.0,
            max_damage_rate: 4.0,
            min_speed: 4.0,
            max_speed: 8.0,
            min_radius: 350.0,
            max_radius: 600.0,
            effects: StormEffects {
                blindness: true,
                slowness: true,
                lightning_chance: 0.05,
            },
        },
    }
}

/// Resolved profile per class.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTable {
    profiles: [StormProfile; 3],
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    pub fn builtin() -> Self {
        Self {
            profiles: StormClass::ALL.map(builtin_profile),
        }
    }

    /// Merge config overrides onto the built-ins. Invalid merges keep the
    /// built-in profile and are reported.
    pub fn from_overrides(
        overrides: &BTreeMap<StormClass, ProfileOverride>,
    ) -> (Self, Vec<ConfigDefect>) {
        let mut defects = Vec::new();
        let profiles = StormClass::ALL.map(|class| {
            let builtin = builtin_profile(class);
            let Some(o) = overrides.get(&class) else {
                return builtin;
            };
            let merged = builtin.apply(o);
            match merged.validate() {
                Ok(()) => merged,
                Err(problem) => {
                    defects.push(ConfigDefect::new(
                        format!("profiles.{class}"),
                        problem,
                        "built-in profile",
                    ));
                    builtin
                }
            }
        });
        (Self { profiles }, defects)
    }

    pub fn get(&self, class: StormClass) -> &StormProfile {
        &self.profiles[index_of(class)]
    }
}

fn index_of(class: StormClass) -> usize {
    match class {
        StormClass::Brief => 0,
        StormClass::Moderate => 1,
        StormClass::Severe => 2,
    }
}

/// Cumulative class draw in the fixed order Brief, Moderate, Severe.
///
/// A roll landing beyond the cumulative total (float slack) or a
/// non-positive total yields [`FALLBACK_CLASS`].
pub fn select_class(weights: &ClassWeights, roll: f64) -> StormClass {
    let w = StormClass::ALL.map(|class| weights.get(class));
    weighted_index(&w, roll)
        .map(|i| StormClass::ALL[i])
        .unwrap_or(FALLBACK_CLASS)
}

/// Random weighted class draw.
pub fn pick_class(rng: &mut impl Rng, weights: &ClassWeights) -> StormClass {
    select_class(weights, rng.gen::<f64>())
}
