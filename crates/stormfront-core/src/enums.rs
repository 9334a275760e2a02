//! Enumeration types used throughout the simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storm tier. Profiles and spawn weights are keyed by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StormClass {
    /// Short, mild storm.
    Brief,
    /// Medium length and strength. Also the fallback class.
    Moderate,
    /// Long, dangerous storm.
    Severe,
}

impl StormClass {
    /// All classes in cumulative-draw order.
    pub const ALL: [StormClass; 3] = [StormClass::Brief, StormClass::Moderate, StormClass::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for StormClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StormClass {
    type Err = String;

    /// Accepts the canonical names plus the legacy tier names used by
    /// older admin tooling (`short_weak`, `medium`, `long_dangerous`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" | "short" | "short_weak" | "mild" => Ok(Self::Brief),
            "moderate" | "medium" => Ok(Self::Moderate),
            "severe" | "long" | "long_dangerous" | "prolonged" => Ok(Self::Severe),
            other => Err(format!("unknown storm class '{other}'")),
        }
    }
}

/// Lifecycle phase of one storm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StormPhase {
    /// Intensity ramping up from zero.
    Forming,
    /// Full intensity.
    Peak,
    /// Intensity ramping down to zero.
    Dissipating,
}

impl StormPhase {
    /// The phase that follows this one, if any.
    pub fn next(&self) -> Option<StormPhase> {
        match self {
            Self::Forming => Some(Self::Peak),
            Self::Peak => Some(Self::Dissipating),
            Self::Dissipating => None,
        }
    }
}

/// Top-level scheduler phase (legacy single-storm mode).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    #[default]
    Idle,
    Countdown,
    Active,
}

/// Concentric zone ring, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneRing {
    HazardCore,
    HazardBand,
    SafeBand,
    /// Beyond the outermost radius.
    Outside,
}

/// Subject activity mode. Some modes are ignored by the exposure check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityMode {
    #[default]
    Survival,
    Adventure,
    Creative,
    Spectator,
}

/// Subject kind: players receive status effects and economy side effects,
/// non-player entities only take damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    Player,
    Entity,
}

/// Path archetype chosen at storm spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathArchetype {
    /// Straight line through the hazard core.
    Straight,
    /// Two-leg arc bending around a perpendicular offset.
    Arc,
    /// Multi-waypoint wander that crosses the hazard core.
    Wandering,
}

/// Update cadence of a storm's movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    /// Subjects nearby: short update interval.
    Active,
    /// Nobody nearby: long update interval.
    #[default]
    Dormant,
}

/// Status effect applied to exposed players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffectKind {
    Blindness,
    Slowness,
}

/// Why a storm ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Remaining life reached zero.
    Expired,
    /// Administrative end-now or force-start replacement.
    Forced,
    /// Scheduler stopped.
    Shutdown,
}
