#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use stormfront_core::config::{ClassWeights, MovementConfig, ProfileOverride};
    use stormfront_core::enums::{Cadence, PathArchetype, StormClass, StormPhase};
    use stormfront_core::events::StormEvent;
    use stormfront_core::types::{Position, StormId, SubjectId};

    use crate::instance::StormInstance;
    use crate::movement::{travel, MovementEngine, NearbySubject, StepSettings};
    use crate::path::StormPath;
    use crate::phase::PhaseModel;
    use crate::profiles::{builtin_profile, pick_class, select_class, ProfileTable, StormProfile};

    fn fixed_profile(speed: f64, duration: f64) -> StormProfile {
        let mut profile = builtin_profile(StormClass::Moderate).with_fixed_duration(duration);
        profile.min_speed = speed;
        profile.max_speed = speed;
        profile
    }

    fn make_storm(
        profile: &StormProfile,
        start: Position,
        waypoints: Vec<Position>,
        phases: Option<&PhaseModel>,
    ) -> StormInstance {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let path = StormPath {
            archetype: PathArchetype::Straight,
            start,
            waypoints,
        };
        StormInstance::spawn(StormId(1), profile, &mut rng, path, 0.0, phases)
    }

    fn always_active() -> MovementConfig {
        MovementConfig {
            adaptive_cadence: false,
            ..MovementConfig::default()
        }
    }

    fn settings<'a>(
        movement: &'a MovementConfig,
        phases: Option<&'a PhaseModel>,
    ) -> StepSettings<'a> {
        StepSettings {
            movement,
            phases,
            warning_secs: 30.0,
        }
    }

    // --- Movement ---

    #[test]
    fn test_reaches_waypoint_in_exact_ticks() {
        let profile = fixed_profile(5.0, 1_000.0);
        let mut storm = make_storm(
            &profile,
            Position::new(0.0, 0.0, 64.0),
            vec![Position::new(0.0, 100.0, 64.0)],
            None,
        );
        let mut engine = MovementEngine::new(&storm, 0.0);
        let movement = always_active();

        for t in 1..=19 {
            let update = engine.step(&mut storm, t as f64, 1.0, &[], settings(&movement, None));
            assert!(update.moved);
            assert!(!storm.path_complete, "arrived early at tick {t}");
            assert!(storm.position.y < 100.0);
        }
        engine.step(&mut storm, 20.0, 1.0, &[], settings(&movement, None));
        assert!(storm.path_complete);
        assert_eq!(storm.position.y, 100.0);
        assert_eq!(storm.waypoint_index(), 1);

        // Path complete: the storm stays put.
        engine.step(&mut storm, 21.0, 1.0, &[], settings(&movement, None));
        assert_eq!(storm.position.y, 100.0);
        assert_eq!(storm.waypoint_index(), 1);
    }

    #[test]
    fn test_dormant_cadence_integrates_full_interval() {
        let profile = fixed_profile(5.0, 1_000.0);
        let mut storm = make_storm(
            &profile,
            Position::new(0.0, 0.0, 64.0),
            vec![Position::new(0.0, 1_000.0, 64.0)],
            None,
        );
        let mut engine = MovementEngine::new(&storm, 0.0);
        let movement = MovementConfig::default();

        for t in 1..60 {
            let update = engine.step(&mut storm, t as f64, 1.0, &[], settings(&movement, None));
            assert!(!update.moved);
        }
        assert_eq!(engine.cadence(), Cadence::Dormant);
        let update = engine.step(&mut storm, 60.0, 1.0, &[], settings(&movement, None));
        assert!(update.moved);
        assert_relative_eq!(storm.position.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nearby_subject_switches_to_active_cadence() {
        let profile = fixed_profile(5.0, 1_000.0);
        let mut storm = make_storm(
            &profile,
            Position::new(0.0, 0.0, 64.0),
            vec![Position::new(0.0, 1_000.0, 64.0)],
            None,
        );
        let mut engine = MovementEngine::new(&storm, 0.0);
        let movement = MovementConfig::default();
        let nearby = [NearbySubject {
            id: SubjectId(7),
            position: Position::new(50.0, 0.0, 64.0),
        }];

        let update = engine.step(&mut storm, 1.0, 1.0, &nearby, settings(&movement, None));
        assert!(update.moved);
        assert!(update.events.iter().any(|e| matches!(
            e,
            StormEvent::CadenceChanged {
                cadence: Cadence::Active,
                ..
            }
        )));

        let update = engine.step(&mut storm, 2.0, 1.0, &[], settings(&movement, None));
        assert_eq!(engine.cadence(), Cadence::Dormant);
        assert!(!update.moved);
    }

    #[test]
    fn test_leftover_travel_continues_to_next_waypoint() {
        let profile = fixed_profile(1.0, 100.0);
        let mut storm = make_storm(
            &profile,
            Position::new(0.0, 0.0, 64.0),
            vec![Position::new(0.0, 10.0, 64.0), Position::new(10.0, 10.0, 64.0)],
            None,
        );
        travel(&mut storm, 15.0);
        assert_eq!(storm.waypoint_index(), 1);
        assert_relative_eq!(storm.position.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(storm.position.y, 10.0, epsilon = 1e-9);
        assert!(!storm.path_complete);
    }

    #[test]
    fn test_arrival_epsilon_advances_without_budget() {
        let profile = fixed_profile(1.0, 100.0);
        let mut storm = make_storm(
            &profile,
            Position::new(0.0, 0.0, 64.0),
            vec![Position::new(0.0, 0.5, 64.0)],
            None,
        );
        travel(&mut storm, 0.0);
        assert!(storm.path_complete);
        assert_eq!(storm.position.y, 0.0);
    }

    #[test]
    fn test_approach_announced_once_per_subject() {
        let profile = fixed_profile(0.0, 1_000.0);
        let mut storm = make_storm(&profile, Position::new(0.0, 0.0, 64.0), vec![], None);
        let mut engine = MovementEngine::new(&storm, 0.0);
        let movement = MovementConfig::default();
        let nearby = [
            NearbySubject {
                id: SubjectId(1),
                position: Position::new(300.0, 0.0, 64.0),
            },
            NearbySubject {
                id: SubjectId(2),
                position: Position::new(900.0, 0.0, 64.0),
            },
        ];
        let count = |events: &[StormEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, StormEvent::StormApproaching { .. }))
                .count()
        };
        let first = engine.step(&mut storm, 1.0, 1.0, &nearby, settings(&movement, None));
        assert_eq!(count(&first.events), 1);
        let second = engine.step(&mut storm, 2.0, 1.0, &nearby, settings(&movement, None));
        assert_eq!(count(&second.events), 0);
    }

    // --- Phases through the engine ---

    #[test]
    fn test_phase_changes_and_warnings_fire_once() {
        let model = PhaseModel::default();
        let profile = fixed_profile(0.0, 100.0);
        let mut storm = make_storm(&profile, Position::default(), vec![], Some(&model));
        assert_eq!(storm.phase, Some(StormPhase::Forming));
        let mut engine = MovementEngine::new(&storm, 0.0);
        let movement = always_active();

        let mut changes = Vec::new();
        let mut warnings = Vec::new();
        let mut completed_at = None;
        for t in 1..=100 {
            let update = engine.step(
                &mut storm,
                t as f64,
                1.0,
                &[],
                settings(&movement, Some(&model)),
            );
            for event in update.events {
                match event {
                    StormEvent::PhaseChanged { from, to, .. } => changes.push((from, to)),
                    StormEvent::PhaseWarning { upcoming, .. } => warnings.push(upcoming),
                    _ => {}
                }
            }
            if update.completed && completed_at.is_none() {
                completed_at = Some(t);
            }
        }
        assert_eq!(
            changes,
            vec![
                (Some(StormPhase::Forming), StormPhase::Peak),
                (Some(StormPhase::Peak), StormPhase::Dissipating),
            ]
        );
        assert_eq!(warnings, vec![StormPhase::Peak, StormPhase::Dissipating]);
        assert_eq!(completed_at, Some(100));
    }

    #[test]
    fn test_phase_multiplier_continuous_at_boundaries() {
        let model = PhaseModel::default();
        assert_eq!(model.phase_at(0.0), StormPhase::Forming);
        assert_eq!(model.phase_at(0.2), StormPhase::Peak);
        assert_eq!(model.phase_at(0.9), StormPhase::Dissipating);
        assert_relative_eq!(model.damage_multiplier(0.0), 0.0);
        assert_relative_eq!(model.damage_multiplier(0.1), 0.5, epsilon = 1e-9);
        assert_relative_eq!(model.damage_multiplier(0.2 - 1e-9), 1.0, epsilon = 1e-6);
        assert_relative_eq!(model.damage_multiplier(0.5), 1.0);
        assert_relative_eq!(model.damage_multiplier(0.8 + 1e-9), 1.0, epsilon = 1e-6);
        assert_relative_eq!(model.damage_multiplier(0.9), 0.5, epsilon = 1e-9);
        assert_relative_eq!(model.damage_multiplier(1.0), 0.0);

        let mut previous = 0.0;
        for i in 0..=20 {
            let m = model.damage_multiplier(i as f64 / 100.0);
            assert!(m >= previous, "forming ramp must not decrease");
            previous = m;
        }
    }

    #[test]
    fn test_phase_model_validation_and_remainder() {
        assert!(PhaseModel::new(0.5, 0.6, 0.2).is_err());
        assert!(PhaseModel::new(-0.1, 0.6, 0.2).is_err());
        let model = PhaseModel::new(0.1, 0.5, 0.1).unwrap();
        assert_relative_eq!(model.fraction(StormPhase::Peak), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_width_forming_skipped() {
        let model = PhaseModel::new(0.0, 0.8, 0.2).unwrap();
        assert_eq!(model.phase_at(0.0), StormPhase::Peak);
        assert_relative_eq!(model.damage_multiplier(0.0), 1.0);
        let (next, secs) = model.secs_until_next(0.0, 100.0).unwrap();
        assert_eq!(next, StormPhase::Dissipating);
        assert_relative_eq!(secs, 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_secs_until_next_phase() {
        let model = PhaseModel::default();
        let (next, secs) = model.secs_until_next(0.1, 100.0).unwrap();
        assert_eq!(next, StormPhase::Peak);
        assert_relative_eq!(secs, 10.0, epsilon = 1e-9);
        assert!(model.secs_until_next(0.95, 100.0).is_none());
    }

    // --- Instance ---

    #[test]
    fn test_remaining_never_increases_and_clamps() {
        let profile = fixed_profile(1.0, 10.0);
        let mut storm = make_storm(&profile, Position::default(), vec![], None);
        let mut previous = storm.remaining_secs();
        for _ in 0..5 {
            storm.advance(3.0, None);
            assert!(storm.remaining_secs() <= previous);
            assert!(storm.remaining_secs() >= 0.0);
            previous = storm.remaining_secs();
        }
        assert_eq!(storm.remaining_secs(), 0.0);
        assert!(storm.is_expired());
        assert_relative_eq!(storm.life_fraction(), 1.0);
    }

    #[test]
    fn test_zero_duration_storm_is_fully_elapsed() {
        let profile = fixed_profile(1.0, 0.0);
        let model = PhaseModel::default();
        let mut storm = make_storm(&profile, Position::default(), vec![], Some(&model));
        assert!(storm.is_expired());
        assert_relative_eq!(storm.life_fraction(), 1.0);
        assert_eq!(storm.current_damage_rate(Some(&model)), 0.0);
        storm.advance(1.0, Some(&model));
        assert!(storm.is_expired());
    }

    #[test]
    fn test_actual_values_drawn_within_profile() {
        let profile = builtin_profile(StormClass::Severe);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for i in 0..100 {
            let path = StormPath {
                archetype: PathArchetype::Straight,
                start: Position::default(),
                waypoints: vec![Position::new(10.0, 0.0, 0.0)],
            };
            let storm = StormInstance::spawn(StormId(i), &profile, &mut rng, path, 0.0, None);
            assert!((profile.min_duration_secs..=profile.max_duration_secs)
                .contains(&storm.duration_secs));
            assert!((profile.min_damage_rate..=profile.max_damage_rate)
                .contains(&storm.damage_rate));
            assert!((profile.min_radius..=profile.max_radius).contains(&storm.radius));
            assert!((profile.min_speed..=profile.max_speed).contains(&storm.speed));
            assert_eq!(storm.current_damage_rate(None), storm.damage_rate);
        }
    }

    #[test]
    fn test_speed_override_expires() {
        let profile = fixed_profile(3.0, 100.0);
        let mut storm = make_storm(&profile, Position::default(), vec![], None);
        storm.set_speed_override(20.0, 5.0);
        assert_eq!(storm.effective_speed(4.0), 20.0);
        assert_eq!(storm.effective_speed(5.0), 3.0);
        assert!(storm.speed_override.is_none());
    }

    #[test]
    fn test_restore_backdates_creation() {
        let profile = builtin_profile(StormClass::Moderate);
        let path = StormPath {
            archetype: PathArchetype::Straight,
            start: Position::default(),
            waypoints: vec![Position::new(100.0, 0.0, 0.0)],
        };
        let storm = StormInstance::restore(
            StormId(3),
            &profile,
            600.0,
            200.0,
            1.5,
            path.clone(),
            1_000.0,
            None,
        );
        assert_relative_eq!(storm.created_at, 600.0);
        assert_relative_eq!(storm.elapsed_secs(), 400.0);
        assert_eq!(storm.damage_rate, 1.5);
        assert_eq!(storm.radius, profile.nominal_radius());

        let clamped = StormInstance::restore(
            StormId(4),
            &profile,
            100.0,
            500.0,
            1.5,
            path,
            1_000.0,
            None,
        );
        assert_eq!(clamped.remaining_secs(), 100.0);
        assert_relative_eq!(clamped.created_at, 1_000.0);
    }

    #[test]
    fn test_covers_is_horizontal() {
        let profile = fixed_profile(1.0, 100.0);
        let mut storm = make_storm(&profile, Position::new(0.0, 0.0, 64.0), vec![], None);
        storm.radius = 100.0;
        assert!(storm.covers(&Position::new(100.0, 0.0, 300.0)));
        assert!(!storm.covers(&Position::new(100.1, 0.0, 64.0)));
    }

    // --- Selection ---

    #[test]
    fn test_class_distribution_matches_weights() {
        let weights = ClassWeights::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts = BTreeMap::new();
        let draws = 100_000;
        for _ in 0..draws {
            *counts.entry(pick_class(&mut rng, &weights)).or_insert(0u32) += 1;
        }
        for class in StormClass::ALL {
            let share = counts.get(&class).copied().unwrap_or(0) as f64 / draws as f64;
            let expected = weights.get(class) / weights.total();
            assert!(
                (share - expected).abs() < 0.01,
                "{class}: {share} vs {expected}"
            );
        }
    }

    #[test]
    fn test_selection_fallback_is_moderate() {
        let weights = ClassWeights::default();
        assert_eq!(select_class(&weights, 0.0), StormClass::Brief);
        assert_eq!(select_class(&weights, 1.0), StormClass::Moderate);
        let empty = ClassWeights {
            brief: 0.0,
            moderate: 0.0,
            severe: 0.0,
        };
        assert_eq!(select_class(&empty, 0.3), StormClass::Moderate);
        let severe_only = ClassWeights {
            brief: 0.0,
            moderate: 0.0,
            severe: 2.0,
        };
        assert_eq!(select_class(&severe_only, 0.0), StormClass::Severe);
    }

    #[test]
    fn test_profile_overrides_merge_or_fall_back() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            StormClass::Brief,
            ProfileOverride {
                min_speed: Some(10.0),
                ..ProfileOverride::default()
            },
        );
        overrides.insert(
            StormClass::Severe,
            ProfileOverride {
                display_name: Some("Black Roller".into()),
                max_duration_secs: Some(1_800.0),
                ..ProfileOverride::default()
            },
        );
        let (table, defects) = ProfileTable::from_overrides(&overrides);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].field, "profiles.brief");
        assert_eq!(*table.get(StormClass::Brief), builtin_profile(StormClass::Brief));
        let severe = table.get(StormClass::Severe);
        assert_eq!(severe.display_name, "Black Roller");
        assert_eq!(severe.max_duration_secs, 1_800.0);
        assert_eq!(severe.min_duration_secs, 600.0);
    }

    #[test]
    fn test_builtin_profiles_are_valid() {
        for class in StormClass::ALL {
            let profile = builtin_profile(class);
            assert!(profile.validate().is_ok(), "{class}");
            assert!(profile.nominal_damage_rate() > 0.0);
        }
    }
}
