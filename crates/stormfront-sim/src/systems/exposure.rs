//! Exposure and damage system.
//!
//! Every subject in a pass is evaluated against the same footprint snapshot
//! of the live storms, taken when the pass starts. Players go through the
//! full pipeline (geometry, cover, activity mode, protection, tracker,
//! damage policies, status effects). Non-player entities get the geometric
//! and cover test only and take damage only.

use std::collections::BTreeMap;

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use stormfront_core::components::*;
use stormfront_core::config::{EntityExposureConfig, ExposureConfig};
use stormfront_core::constants::STATUS_EFFECT_SECS;
use stormfront_core::enums::{ActivityMode, StatusEffectKind, StormClass, StormPhase, SubjectKind};
use stormfront_core::events::StormEvent;
use stormfront_core::types::{Position, StormId, SubjectId};
use stormfront_storm::{PhaseModel, StormEffects};
use stormfront_terrain::{sky_exposed, CoverRules, ProtectionOracle, WorldColumns, ZoneModel};

use crate::exposure_state::ExposureStateTracker;
use crate::hooks::{apply_damage_policies, DamageContext, DamageDecision, DamagePolicy};
use crate::systems::movement::LiveStorm;

/// Read-only copy of one storm's footprint for an exposure pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StormFootprint {
    pub id: StormId,
    pub class: StormClass,
    pub position: Position,
    pub radius: f64,
    /// Phase-adjusted damage per second.
    pub damage_rate: f64,
    pub phase: Option<StormPhase>,
    pub effects: StormEffects,
}

impl StormFootprint {
    pub fn covers(&self, pos: &Position) -> bool {
        self.position.horizontal_range_to(pos) <= self.radius
    }
}

/// Snapshot the live storms.
pub fn footprints<'a>(
    storms: impl IntoIterator<Item = &'a LiveStorm>,
    phases: Option<&PhaseModel>,
) -> Vec<StormFootprint> {
    storms
        .into_iter()
        .map(|live| {
            let s = &live.instance;
            StormFootprint {
                id: s.id,
                class: s.class,
                position: s.position,
                radius: s.radius,
                damage_rate: s.current_damage_rate(phases),
                phase: s.phase,
                effects: s.profile.effects,
            }
        })
        .collect()
}

/// World collaborators and settings shared by one exposure pass.
pub struct ExposureContext<'a> {
    pub columns: &'a dyn WorldColumns,
    pub protection: &'a dyn ProtectionOracle,
    pub zones: &'a ZoneModel,
    /// True while storm weather is active (used when spatial storms are off).
    pub weather_active: bool,
    pub now: f64,
}

/// Storm affecting `pos`: the strongest covering storm, or in global-weather
/// mode the strongest live storm.
fn affecting<'f>(
    footprints: &'f [StormFootprint],
    pos: &Position,
    spatial: bool,
    weather_active: bool,
) -> Option<&'f StormFootprint> {
    footprints
        .iter()
        .filter(|f| if spatial { f.covers(pos) } else { weather_active })
        .max_by(|a, b| a.damage_rate.total_cmp(&b.damage_rate))
}

/// Player pass.
#[allow(clippy::too_many_arguments)]
pub fn run_players(
    world: &mut World,
    footprints: &[StormFootprint],
    tracker: &mut ExposureStateTracker,
    policies: &mut [Box<dyn DamagePolicy>],
    rng: &mut ChaCha8Rng,
    config: &ExposureConfig,
    interval_secs: f64,
    ctx: &ExposureContext<'_>,
) -> Vec<StormEvent> {
    let rules = CoverRules::from(config);
    let mut events = Vec::new();
    let mut exposed: BTreeMap<StormId, Vec<SubjectId>> =
        footprints.iter().map(|f| (f.id, Vec::new())).collect();

    let mut query = world.query::<(
        &Subject,
        &Position,
        &mut Health,
        &Presence,
        Option<&ActivityMode>,
        Option<&mut StatusEffects>,
    )>();
    for (_entity, (subject, pos, health, presence, mode, mut effects)) in query.iter() {
        if subject.kind != SubjectKind::Player {
            continue;
        }
        let id = subject.id;
        if !presence.online || health.is_dead() {
            // Last observation ends the stay so cooldown starts now.
            if tracker.in_storm(id) {
                tracker.leave_storm(id, ctx.now);
            }
            continue;
        }
        let storm = affecting(footprints, pos, config.spatial, ctx.weather_active);
        let ignored = mode.is_some_and(|m| config.ignored_modes.contains(m));
        let storm = storm.filter(|_| {
            !ignored && sky_exposed(ctx.columns, pos, &rules) && !ctx.protection.is_protected(pos)
        });

        let was_in_storm = tracker.in_storm(id);
        let Some(storm) = storm else {
            if was_in_storm {
                tracker.leave_storm(id, ctx.now);
            }
            continue;
        };
        if !was_in_storm {
            tracker.enter_storm(id, ctx.now);
        }
        tracker.update_exposure(id, interval_secs, ctx.now);
        tracker.mark_seen(id, storm.id);
        if let Some(list) = exposed.get_mut(&storm.id) {
            list.push(id);
        }
        if tracker.is_immune(id, ctx.now) {
            continue;
        }

        // Damage
        let zone = ctx.zones.settings_at(pos);
        let mut amount = storm.damage_rate * interval_secs;
        if config.compose_grace_ramp {
            amount *= tracker.damage_multiplier(id, config.grace_period_secs);
        }
        if zone.damage_chance < 1.0 && !rng.gen_bool(zone.damage_chance.clamp(0.0, 1.0)) {
            amount = 0.0;
        }
        let damage_ctx = DamageContext {
            subject: id,
            kind: subject.kind,
            storm: storm.id,
            class: storm.class,
            position: *pos,
        };
        let decision = apply_damage_policies(
            policies,
            &damage_ctx,
            DamageDecision {
                exposed: true,
                amount,
            },
        );
        if decision.exposed && decision.amount > 0.0 {
            let applied = decision.amount.min(health.current);
            health.current = (health.current - decision.amount).max(0.0);
            tracker.mark_damaged(id, ctx.now);
            events.push(StormEvent::SubjectDamaged {
                subject: id,
                storm: storm.id,
                amount: applied,
                health_after: health.current,
                essence_multiplier: zone.essence_multiplier,
            });
        }

        // Status effects
        if !config.status_effects {
            continue;
        }
        let fx = storm.effects;
        for (enabled, effect) in [
            (fx.blindness, StatusEffectKind::Blindness),
            (fx.slowness, StatusEffectKind::Slowness),
        ] {
            if !enabled {
                continue;
            }
            if let Some(effects) = effects.as_deref_mut() {
                let slot = match effect {
                    StatusEffectKind::Blindness => &mut effects.blindness_secs,
                    StatusEffectKind::Slowness => &mut effects.slowness_secs,
                };
                *slot = slot.max(STATUS_EFFECT_SECS);
            }
            events.push(StormEvent::StatusEffectApplied {
                subject: id,
                effect,
                duration_secs: STATUS_EFFECT_SECS,
            });
        }
        if fx.lightning_chance > 0.0 && rng.gen::<f64>() < fx.lightning_chance {
            health.current = (health.current - config.lightning_damage).max(0.0);
            events.push(StormEvent::LightningStrike {
                subject: id,
                storm: storm.id,
                position: *pos,
            });
        }
    }
    drop(query);

    for f in footprints {
        events.push(StormEvent::StormTick {
            storm: f.id,
            position: f.position,
            phase: f.phase,
            damage_rate: f.damage_rate,
            exposed: exposed.remove(&f.id).unwrap_or_default(),
        });
    }
    events
}

/// Non-player entity pass. No tracker, effects or economy side effects.
pub fn run_entities(
    world: &mut World,
    footprints: &[StormFootprint],
    exposure: &ExposureConfig,
    config: &EntityExposureConfig,
    interval_secs: f64,
    ctx: &ExposureContext<'_>,
) -> Vec<StormEvent> {
    let rules = CoverRules::from(exposure);
    let mut events = Vec::new();
    for (_entity, (subject, pos, health, presence)) in
        world.query_mut::<(&Subject, &Position, &mut Health, Option<&Presence>)>()
    {
        if subject.kind != SubjectKind::Entity || health.is_dead() {
            continue;
        }
        if presence.is_some_and(|p| !p.online) {
            continue;
        }
        let Some(storm) = affecting(footprints, pos, exposure.spatial, ctx.weather_active) else {
            continue;
        };
        if !sky_exposed(ctx.columns, pos, &rules) {
            continue;
        }
        let amount = storm.damage_rate * interval_secs * config.damage_multiplier;
        if amount <= 0.0 {
            continue;
        }
        let applied = amount.min(health.current);
        health.current = (health.current - amount).max(0.0);
        events.push(StormEvent::SubjectDamaged {
            subject: subject.id,
            storm: storm.id,
            amount: applied,
            health_after: health.current,
            essence_multiplier: 0.0,
        });
    }
    events
}
