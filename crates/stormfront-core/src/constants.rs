//! Simulation constants and default tuning parameters.
//!
//! Config values that are missing or invalid fall back to these.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 20;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Ticks in one second (period of the 1 Hz tasks).
pub const TICKS_PER_SECOND: u64 = TICK_RATE as u64;

// --- Scheduling ---

/// Minimum delay between legacy storms (seconds).
pub const DEFAULT_MIN_INTERVAL_SECS: f64 = 3_600.0;

/// Maximum delay between legacy storms (seconds).
pub const DEFAULT_MAX_INTERVAL_SECS: f64 = 7_200.0;

/// Countdown length before landfall (seconds).
pub const DEFAULT_COUNTDOWN_SECS: u32 = 900;

/// Remaining-second checkpoints at which the countdown is announced.
pub const DEFAULT_ANNOUNCE_AT: [u32; 9] = [900, 600, 300, 120, 60, 30, 10, 5, 3];

// --- Burst mode ---

/// Maximum concurrently live storms in burst mode.
pub const DEFAULT_MAX_CONCURRENT: u32 = 12;

/// Minimum delay between bursts (seconds).
pub const DEFAULT_BURST_MIN_INTERVAL_SECS: f64 = 600.0;

/// Maximum delay between bursts (seconds).
pub const DEFAULT_BURST_MAX_INTERVAL_SECS: f64 = 1_800.0;

/// Share of `max_concurrent` seeded on a cold start.
pub const INITIAL_POPULATION_RATIO: f64 = 0.7;

/// Minimum remaining-life fraction for cold-start seeded storms.
pub const SEEDED_MIN_LIFE_FRACTION: f64 = 0.1;

// --- Class weights ---

pub const DEFAULT_WEIGHT_BRIEF: f64 = 0.25;
pub const DEFAULT_WEIGHT_MODERATE: f64 = 0.60;
pub const DEFAULT_WEIGHT_SEVERE: f64 = 0.15;

// --- Movement ---

/// Distance at which a storm is considered to have reached a waypoint.
pub const ARRIVAL_EPSILON: f64 = 1.0;

/// Range within which a subject keeps a storm in active cadence (blocks).
pub const DEFAULT_ACTIVE_RANGE: f64 = 256.0;

/// Active cadence update interval (seconds).
pub const DEFAULT_ACTIVE_INTERVAL_SECS: f64 = 1.0;

/// Dormant cadence update interval (seconds).
pub const DEFAULT_DORMANT_INTERVAL_SECS: f64 = 60.0;

/// Radius at which an approaching storm is announced to a subject (blocks).
pub const DEFAULT_ANNOUNCE_RADIUS: f64 = 400.0;

// --- Path generation ---

pub const PATH_WEIGHT_STRAIGHT: f64 = 0.4;
pub const PATH_WEIGHT_ARC: f64 = 0.3;
pub const PATH_WEIGHT_WANDERING: f64 = 0.3;

pub const WANDER_MIN_POINTS: usize = 3;
pub const WANDER_MAX_POINTS: usize = 6;

/// Arc control-point offset as a fraction of the hazard core radius.
pub const ARC_OFFSET_MIN: f64 = 0.3;
pub const ARC_OFFSET_MAX: f64 = 0.6;

// --- Phases ---

pub const DEFAULT_FORMING_FRACTION: f64 = 0.2;
pub const DEFAULT_PEAK_FRACTION: f64 = 0.6;
pub const DEFAULT_DISSIPATING_FRACTION: f64 = 0.2;

/// Window before a phase change in which nearby subjects are warned (seconds).
pub const DEFAULT_PHASE_WARNING_SECS: f64 = 30.0;

// --- Exposure ---

/// Player exposure check interval (ticks).
pub const DEFAULT_EXPOSURE_INTERVAL_TICKS: u64 = 20;

/// Non-player entity exposure check interval (ticks).
pub const DEFAULT_ENTITY_INTERVAL_TICKS: u64 = 100;

/// Seconds of exposure before damage reaches full strength.
pub const DEFAULT_GRACE_PERIOD_SECS: f64 = 10.0;

/// Seconds after leaving a storm during which accumulated exposure is kept.
pub const DEFAULT_COOLDOWN_SECS: f64 = 30.0;

/// Cap on accumulated exposure (seconds).
pub const DEFAULT_MAX_ACCUMULATED_SECS: f64 = 600.0;

/// Depth below the top solid surface at which a subject counts as underground.
pub const DEFAULT_MIN_DEPTH: f64 = 8.0;

/// Overhead cover blocks required to shelter a subject.
pub const DEFAULT_MIN_COVER_BLOCKS: u32 = 1;

/// Status effect duration (seconds).
pub const STATUS_EFFECT_SECS: f64 = 3.0;

// --- Zones ---

pub const DEFAULT_CORE_RADIUS: f64 = 1_000.0;
pub const DEFAULT_BAND_RADIUS: f64 = 2_500.0;
pub const DEFAULT_SAFE_RADIUS: f64 = 5_000.0;

/// Top of the world column scanned for overhead cover.
pub const DEFAULT_WORLD_MAX_HEIGHT: f64 = 320.0;
