//! Storm path generation.
//!
//! Every path crosses the hazard core at least once. The spawn position is
//! returned separately from the waypoints, and there is always at least one
//! waypoint.

use glam::DVec2;
use rand::Rng;

use stormfront_core::constants::*;
use stormfront_core::enums::{PathArchetype, ZoneRing};
use stormfront_core::types::Position;
use stormfront_terrain::ZoneModel;

use crate::weighted::weighted_index;

/// Spawn position plus the ordered waypoints a storm will follow.
#[derive(Debug, Clone, PartialEq)]
pub struct StormPath {
    pub archetype: PathArchetype,
    pub start: Position,
    pub waypoints: Vec<Position>,
}

/// Archetype for a roll in `[0, 1)`. Straight on float slack.
pub fn pick_archetype(roll: f64) -> PathArchetype {
    const ORDER: [PathArchetype; 3] = [
        PathArchetype::Straight,
        PathArchetype::Arc,
        PathArchetype::Wandering,
    ];
    let weights = [PATH_WEIGHT_STRAIGHT, PATH_WEIGHT_ARC, PATH_WEIGHT_WANDERING];
    weighted_index(&weights, roll)
        .map(|i| ORDER[i])
        .unwrap_or(PathArchetype::Straight)
}

/// Generate a path with a randomly drawn archetype.
pub fn generate(zones: &ZoneModel, rng: &mut impl Rng) -> StormPath {
    let archetype = pick_archetype(rng.gen::<f64>());
    generate_with(archetype, zones, rng)
}

/// Generate a path of the given archetype.
pub fn generate_with(archetype: PathArchetype, zones: &ZoneModel, rng: &mut impl Rng) -> StormPath {
    match archetype {
        PathArchetype::Straight => straight(zones, rng),
        PathArchetype::Arc => arc(zones, rng),
        PathArchetype::Wandering => wandering(zones, rng),
    }
}

fn straight(zones: &ZoneModel, rng: &mut impl Rng) -> StormPath {
    let (start, end) = crossing(zones, rng);
    StormPath {
        archetype: PathArchetype::Straight,
        start,
        waypoints: vec![end],
    }
}

fn arc(zones: &ZoneModel, rng: &mut impl Rng) -> StormPath {
    let (start, end) = crossing(zones, rng);
    let a = flat(&start);
    let b = flat(&end);
    let chord = b - a;
    // Degenerate chord: pick any direction for the bend.
    let normal = chord.perp().try_normalize().unwrap_or(DVec2::X);
    let core = zones.outer_radius(ZoneRing::HazardCore);
    let offset = rng.gen_range(ARC_OFFSET_MIN..=ARC_OFFSET_MAX) * core;
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let control = (a + b) * 0.5 + normal * offset * side;
    StormPath {
        archetype: PathArchetype::Arc,
        start,
        waypoints: vec![lift(control, start.z), end],
    }
}

fn wandering(zones: &ZoneModel, rng: &mut impl Rng) -> StormPath {
    let start = zones.random_point_in(ZoneRing::HazardBand, rng);
    let count = rng.gen_range(WANDER_MIN_POINTS..=WANDER_MAX_POINTS);
    let core_index = rng.gen_range(0..count);
    let waypoints = (0..count)
        .map(|i| {
            if i == core_index {
                zones.random_point_in(ZoneRing::HazardCore, rng)
            } else {
                zones.random_point_in(ZoneRing::HazardBand, rng)
            }
        })
        .collect();
    StormPath {
        archetype: PathArchetype::Wandering,
        start,
        waypoints,
    }
}

/// Start in the hazard band, pass through a core point, end mirrored beyond it.
fn crossing(zones: &ZoneModel, rng: &mut impl Rng) -> (Position, Position) {
    let core = zones.outer_radius(ZoneRing::HazardCore);
    let band = zones.outer_radius(ZoneRing::HazardBand);
    let bearing = rng.gen_range(0.0..std::f64::consts::TAU);
    let distance = rng.gen_range(core..=band);
    let start = zones.point_at(bearing, distance);
    let through = zones.random_point_in(ZoneRing::HazardCore, rng);
    let end = flat(&through) * 2.0 - flat(&start);
    (start, lift(end, start.z))
}

fn flat(p: &Position) -> DVec2 {
    DVec2::new(p.x, p.y)
}

fn lift(v: DVec2, z: f64) -> Position {
    Position::new(v.x, v.y, z)
}
