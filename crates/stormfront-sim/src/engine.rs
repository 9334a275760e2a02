//! Storm scheduler: the core of the weather engine.
//!
//! `StormScheduler` owns the hecs world of subjects, the live storm table,
//! the scheduling state machine and every recurring task. It is driven one
//! engine tick at a time by the host and is completely headless, so the
//! whole lifecycle can be tested deterministically from a seed.

use std::collections::BTreeMap;

use hecs::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use stormfront_core::commands::{AdminCommand, AdminReply};
use stormfront_core::config::StormConfig;
use stormfront_core::constants::TICKS_PER_SECOND;
use stormfront_core::enums::{EndReason, SchedulerPhase, StormClass, ZoneRing};
use stormfront_core::error::{AdminError, ConfigDefect};
use stormfront_core::events::StormEvent;
use stormfront_core::state::{PersistedState, PersistedStorm, SchedulerSnapshot};
use stormfront_core::types::{SimTime, StormId};
use stormfront_storm::path::{self, StormPath};
use stormfront_storm::profiles::pick_class;
use stormfront_storm::{PhaseModel, ProfileTable, StepSettings, StormInstance, StormProfile};
use stormfront_terrain::{BlockGrid, ProtectionOracle, Unprotected, WorldColumns, ZoneModel};

use crate::burst;
use crate::countdown::{Countdown, CountdownTick};
use crate::exposure_state::ExposureStateTracker;
use crate::hooks::{DamagePolicy, EventBus, PreStormDecision, PreStormPolicy};
use crate::systems;
use crate::systems::exposure::ExposureContext;
use crate::systems::movement::LiveStorm;
use crate::systems::snapshot::SchedulerView;
use crate::tasks::PeriodicTask;

/// Configuration for starting a new scheduler.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same storms.
    pub seed: u64,
    /// Scheduler clock at tick zero (seconds). The host passes wall-clock
    /// time so persisted timestamps survive restarts.
    pub epoch_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            epoch_secs: 0.0,
        }
    }
}

/// World queries injected by the host.
pub struct Collaborators {
    pub columns: Box<dyn WorldColumns + Send>,
    pub protection: Box<dyn ProtectionOracle + Send>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            columns: Box::new(BlockGrid::flat(64.0)),
            protection: Box::new(Unprotected),
        }
    }
}

/// The storm scheduler. Owns the subject world and all storm state.
pub struct StormScheduler {
    world: World,
    time: SimTime,
    epoch_secs: f64,
    rng: ChaCha8Rng,
    config: StormConfig,
    profiles: ProfileTable,
    phases: Option<PhaseModel>,
    zones: ZoneModel,
    collaborators: Collaborators,
    running: bool,

    // Legacy single-storm state machine
    phase: SchedulerPhase,
    countdown: Option<Countdown>,
    next_storm_at: Option<f64>,

    // Burst mode
    next_burst_at: Option<f64>,

    storms: BTreeMap<StormId, LiveStorm>,
    next_storm_id: u32,

    schedule_task: PeriodicTask,
    exposure_task: PeriodicTask,
    entity_task: PeriodicTask,

    tracker: ExposureStateTracker,
    bus: EventBus,
    damage_policies: Vec<Box<dyn DamagePolicy>>,
    pre_storm_policies: Vec<Box<dyn PreStormPolicy>>,
    pending_events: Vec<StormEvent>,
}

impl StormScheduler {
    /// Create a stopped scheduler. Invalid config values are replaced with
    /// defaults and logged.
    pub fn new(sim: SimConfig, config: StormConfig, collaborators: Collaborators) -> Self {
        let (config, _) = config.sanitized();
        let (profiles, defects) = ProfileTable::from_overrides(&config.profiles);
        for defect in &defects {
            warn!("{defect}");
        }
        Self {
            world: World::new(),
            time: SimTime::default(),
            epoch_secs: sim.epoch_secs,
            rng: ChaCha8Rng::seed_from_u64(sim.seed),
            profiles,
            phases: PhaseModel::from_config(&config.phases),
            zones: ZoneModel::from_config(&config.zones),
            tracker: ExposureStateTracker::from_config(&config.exposure),
            config,
            collaborators,
            running: false,
            phase: SchedulerPhase::Idle,
            countdown: None,
            next_storm_at: None,
            next_burst_at: None,
            storms: BTreeMap::new(),
            next_storm_id: 1,
            schedule_task: PeriodicTask::idle(),
            exposure_task: PeriodicTask::idle(),
            entity_task: PeriodicTask::idle(),
            bus: EventBus::default(),
            damage_policies: Vec::new(),
            pre_storm_policies: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Start the recurring tasks. In burst mode a cold start seeds an
    /// initial population with partly spent lives; in legacy mode the next
    /// storm is scheduled unless one is already pending or in flight.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        let tick = self.time.tick;
        self.schedule_task = PeriodicTask::new(TICKS_PER_SECOND, tick);
        self.exposure_task = PeriodicTask::new(self.config.exposure.check_interval_ticks, tick);
        self.entity_task = if self.config.entities.enabled {
            PeriodicTask::new(self.config.entities.check_interval_ticks, tick)
        } else {
            PeriodicTask::idle()
        };

        if self.config.burst.enabled {
            if self.storms.is_empty() {
                self.seed_population();
            }
            self.schedule_next_burst();
        } else if self.phase == SchedulerPhase::Idle && self.next_storm_at.is_none() {
            self.schedule_next_storm();
        }
        info!(
            burst = self.config.burst.enabled,
            live = self.storms.len(),
            "storm scheduler started"
        );
    }

    /// Advance the scheduler by one engine tick.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.time.advance();
        let tick = self.time.tick;

        if self.schedule_task.poll(tick) {
            self.schedule_check();
        }
        self.run_countdown(tick);
        self.run_storms(tick);
        if self.exposure_task.poll(tick) {
            self.run_player_exposure();
        }
        if self.entity_task.poll(tick) {
            self.run_entity_exposure();
        }
    }

    /// Tear everything down: per-storm tasks first, then the global tasks,
    /// then the weather itself. Save state before calling this.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        for live in self.storms.values_mut() {
            live.task.cancel();
        }
        let ids: Vec<StormId> = self.storms.keys().copied().collect();
        for id in ids {
            self.teardown(id, EndReason::Shutdown);
        }
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.schedule_task.cancel();
        self.exposure_task.cancel();
        self.entity_task.cancel();
        self.phase = SchedulerPhase::Idle;
        self.running = false;
        info!("storm scheduler stopped");
    }

    /// Scheduler clock (seconds).
    pub fn now(&self) -> f64 {
        self.epoch_secs + self.time.elapsed_secs
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True while any storm is live (global weather for non-spatial mode).
    pub fn is_weather_active(&self) -> bool {
        !self.storms.is_empty()
    }

    pub fn config(&self) -> &StormConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for the host to mirror its subjects.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tracker(&self) -> &ExposureStateTracker {
        &self.tracker
    }

    /// Mutable tracker access, e.g. to grant immunity.
    pub fn tracker_mut(&mut self) -> &mut ExposureStateTracker {
        &mut self.tracker
    }

    pub fn storm(&self, id: StormId) -> Option<&StormInstance> {
        self.storms.get(&id).map(|live| &live.instance)
    }

    pub fn storm_ids(&self) -> Vec<StormId> {
        self.storms.keys().copied().collect()
    }

    pub fn next_storm_time(&self) -> Option<f64> {
        self.next_storm_at
    }

    pub fn next_burst_time(&self) -> Option<f64> {
        self.next_burst_at
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<StormEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StormEvent) + Send + 'static) {
        self.bus.subscribe(Box::new(listener));
    }

    pub fn add_damage_policy(&mut self, policy: impl DamagePolicy + 'static) {
        self.damage_policies.push(Box::new(policy));
    }

    pub fn add_pre_storm_policy(&mut self, policy: impl PreStormPolicy + 'static) {
        self.pre_storm_policies.push(Box::new(policy));
    }

    /// Mutable storm access for tests that need to pin a storm in place.
    #[cfg(test)]
    pub fn storm_mut(&mut self, id: StormId) -> Option<&mut StormInstance> {
        self.storms.get_mut(&id).map(|live| &mut live.instance)
    }

    // --- Administrative operations ---

    /// Cancel whatever is in flight and start a storm now. A missing class
    /// is drawn from the hazard-core weights; a duration replaces the
    /// profile's range. In burst mode the storm joins the live population.
    pub fn force_start(
        &mut self,
        class: Option<&str>,
        duration_secs: Option<i64>,
    ) -> Result<String, AdminError> {
        let class = match class {
            Some(name) => name.parse::<StormClass>().map_err(AdminError::InvalidRequest)?,
            None => {
                let weights = self
                    .zones
                    .effective_weights(&self.config.weights, ZoneRing::HazardCore);
                pick_class(&mut self.rng, &weights)
            }
        };
        let profile = match duration_secs {
            Some(secs) if secs <= 0 => {
                return Err(AdminError::InvalidRequest(format!(
                    "duration must be positive, got {secs}"
                )));
            }
            Some(secs) => self.profiles.get(class).with_fixed_duration(secs as f64),
            None => self.profiles.get(class).clone(),
        };
        if !self.running {
            return Err(AdminError::NotApplicable(
                "storm scheduler is not running".into(),
            ));
        }

        let burst = self.config.burst.enabled;
        if !burst {
            if let Some(mut countdown) = self.countdown.take() {
                countdown.cancel();
                info!(class = %countdown.class(), "countdown superseded by forced storm");
            }
            let ids: Vec<StormId> = self.storms.keys().copied().collect();
            for id in ids {
                self.teardown(id, EndReason::Forced);
            }
            self.next_storm_at = None;
        }
        let id = self.spawn_storm(&profile);
        if !burst {
            self.phase = SchedulerPhase::Active;
            self.emit(StormEvent::Landfall { storm: id, class });
        }
        let duration = self.storm(id).map_or(0.0, |s| s.duration_secs);
        info!(storm = %id, %class, duration, "storm force-started");
        Ok(format!(
            "started {} ({class}) as {id} for {duration:.0}s",
            profile.display_name
        ))
    }

    /// Move the next storm (legacy) or burst to `seconds` from now. Zero
    /// re-runs the schedule check immediately.
    pub fn force_next(&mut self, seconds: i64) -> Result<String, AdminError> {
        if seconds < 0 {
            return Err(AdminError::InvalidRequest(format!(
                "seconds must not be negative, got {seconds}"
            )));
        }
        if !self.running {
            return Err(AdminError::NotApplicable(
                "storm scheduler is not running".into(),
            ));
        }
        let at = self.now() + seconds as f64;
        if self.config.burst.enabled {
            self.next_burst_at = Some(at);
        } else {
            if self.phase != SchedulerPhase::Idle {
                return Err(AdminError::NotApplicable(format!(
                    "scheduler is in {:?}, not idle",
                    self.phase
                )));
            }
            self.next_storm_at = Some(at);
        }
        info!(seconds, "next storm rescheduled");
        if seconds == 0 {
            self.schedule_check();
        }
        Ok(format!("next storm in {seconds}s"))
    }

    /// End every live storm now.
    pub fn end_storm(&mut self) -> Result<String, AdminError> {
        if self.storms.is_empty() {
            return Err(AdminError::NotApplicable("no storm is active".into()));
        }
        let ids: Vec<StormId> = self.storms.keys().copied().collect();
        let count = ids.len();
        for id in ids {
            self.teardown(id, EndReason::Forced);
        }
        if self.phase == SchedulerPhase::Active {
            self.return_to_idle();
        }
        Ok(format!("ended {count} storm(s)"))
    }

    /// Swap in a new config. Live storms keep their drawn values; profiles,
    /// phases, zones and task periods take effect from now on.
    pub fn reload_config(&mut self, config: StormConfig) -> Vec<ConfigDefect> {
        let (config, mut defects) = config.sanitized();
        let (profiles, profile_defects) = ProfileTable::from_overrides(&config.profiles);
        for defect in &profile_defects {
            warn!("{defect}");
        }
        defects.extend(profile_defects);

        let was_burst = self.config.burst.enabled;
        self.profiles = profiles;
        self.phases = PhaseModel::from_config(&config.phases);
        self.zones = ZoneModel::from_config(&config.zones);
        self.tracker.reconfigure(&config.exposure);

        if self.running {
            let tick = self.time.tick;
            if self.exposure_task.period_ticks() != config.exposure.check_interval_ticks {
                self.exposure_task = PeriodicTask::new(config.exposure.check_interval_ticks, tick);
            }
            if !config.entities.enabled {
                self.entity_task.cancel();
            } else if self.entity_task.is_cancelled()
                || self.entity_task.period_ticks() != config.entities.check_interval_ticks
            {
                self.entity_task = PeriodicTask::new(config.entities.check_interval_ticks, tick);
            }
        }
        self.config = config;

        if self.running && was_burst != self.config.burst.enabled {
            if self.config.burst.enabled {
                if let Some(mut countdown) = self.countdown.take() {
                    countdown.cancel();
                }
                self.phase = SchedulerPhase::Idle;
                self.next_storm_at = None;
                self.schedule_next_burst();
            } else {
                self.next_burst_at = None;
                if self.storms.is_empty() {
                    self.schedule_next_storm();
                } else {
                    self.phase = SchedulerPhase::Active;
                }
            }
        }
        info!(defects = defects.len(), "storm config reloaded");
        defects
    }

    /// Dispatch an admin command. Rejections leave state untouched.
    pub fn handle_command(&mut self, command: AdminCommand) -> AdminReply {
        let result = match command {
            AdminCommand::ForceStart {
                class,
                duration_secs,
            } => self.force_start(class.as_deref(), duration_secs),
            AdminCommand::ForceNext { seconds } => self.force_next(seconds),
            AdminCommand::EndNow => self.end_storm(),
            AdminCommand::ReloadConfig { config } => {
                let defects = self.reload_config(*config);
                Ok(format!("config reloaded ({} value(s) defaulted)", defects.len()))
            }
        };
        if let Err(e) = &result {
            warn!(error = %e, "admin command rejected");
        }
        AdminReply::from(result)
    }

    // --- Persistence ---

    /// Rebuild a live storm from saved fields without re-running landfall
    /// selection. A missing damage rate uses the profile's nominal rate.
    pub fn restore_active_storm(
        &mut self,
        class: StormClass,
        duration_secs: f64,
        remaining_secs: f64,
        start_time: f64,
        damage_rate: Option<f64>,
    ) -> StormId {
        let profile = self.profiles.get(class).clone();
        let rate = damage_rate
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or_else(|| profile.nominal_damage_rate());
        let path = path::generate(&self.zones, &mut self.rng);
        let id = self.allocate_id();
        let now = self.now();
        let instance = StormInstance::restore(
            id,
            &profile,
            duration_secs,
            remaining_secs,
            rate,
            path,
            now,
            self.phases.as_ref(),
        );
        info!(storm = %id, %class, remaining_secs, start_time, "storm restored");
        self.insert_storm(instance);
        if !self.config.burst.enabled {
            self.countdown = None;
            self.next_storm_at = None;
            self.phase = SchedulerPhase::Active;
        }
        id
    }

    /// Resume a countdown with `remaining_secs` left.
    pub fn restore_countdown(&mut self, class: StormClass, remaining_secs: u32) {
        if self.config.burst.enabled {
            warn!(%class, "ignoring saved countdown in burst mode");
            return;
        }
        info!(%class, remaining_secs, "countdown restored");
        self.start_countdown(class, remaining_secs);
    }

    /// Resumable state. In burst mode live storms are not saved; a cold
    /// start reseeds the population instead.
    pub fn persisted_state(&self) -> PersistedState {
        let active_storm = if self.config.burst.enabled {
            None
        } else {
            self.storms.values().next().map(|live| {
                let s = &live.instance;
                PersistedStorm {
                    class: s.class,
                    original_duration_secs: s.duration_secs,
                    remaining_secs: s.remaining_secs(),
                    start_time: s.created_at,
                    actual_damage_rate: Some(s.damage_rate),
                }
            })
        };
        PersistedState {
            phase: self.phase,
            next_storm_time: self.next_storm_at,
            active_storm,
            countdown: self.countdown.as_ref().map(Countdown::to_persisted),
        }
    }

    /// Apply saved state. Call before `start()`.
    pub fn restore_persisted(&mut self, state: &PersistedState) {
        if let Some(storm) = &state.active_storm {
            self.restore_active_storm(
                storm.class,
                storm.original_duration_secs,
                storm.remaining_secs,
                storm.start_time,
                storm.actual_damage_rate,
            );
        } else if let Some(countdown) = &state.countdown {
            self.restore_countdown(countdown.class, countdown.remaining_secs);
        } else if let Some(at) = state.next_storm_time {
            self.next_storm_at = Some(at);
        }
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        systems::snapshot::build_snapshot(
            SchedulerView {
                now: self.now(),
                phase: self.phase,
                burst_mode: self.config.burst.enabled,
                next_storm_time: self.next_storm_at,
                next_burst_time: self.next_burst_at,
                countdown: self.countdown.as_ref().map(Countdown::to_persisted),
            },
            &self.storms,
            self.phases.as_ref(),
            &self.zones,
        )
    }

    // --- Scheduling ---

    fn schedule_check(&mut self) {
        let now = self.now();
        if self.config.burst.enabled {
            match self.next_burst_at {
                None => self.schedule_next_burst(),
                Some(at) if now >= at => {
                    self.spawn_burst();
                    self.schedule_next_burst();
                }
                Some(_) => {}
            }
            return;
        }
        if self.phase != SchedulerPhase::Idle {
            return;
        }
        match self.next_storm_at {
            None => {
                self.schedule_next_storm();
            }
            Some(at) if now >= at => self.begin_countdown(),
            Some(_) => {}
        }
    }

    /// Draw the delay to the next legacy storm and record its time.
    /// Returns the delay in seconds.
    fn schedule_next_storm(&mut self) -> f64 {
        let s = &self.config.schedule;
        let mut delay = if s.max_interval_secs > s.min_interval_secs {
            self.rng.gen_range(s.min_interval_secs..=s.max_interval_secs)
        } else {
            s.min_interval_secs
        };
        let frequency = self.zones.settings(ZoneRing::HazardCore).frequency_multiplier;
        if frequency > 0.0 {
            delay /= frequency;
        }
        self.next_storm_at = Some(self.now() + delay);
        debug!(delay, "next storm scheduled");
        delay
    }

    fn schedule_next_burst(&mut self) {
        let delay = burst::next_delay(&self.config.burst, &mut self.rng);
        self.next_burst_at = Some(self.now() + delay);
        debug!(delay, "next burst scheduled");
    }

    fn begin_countdown(&mut self) {
        let weights = self
            .zones
            .effective_weights(&self.config.weights, ZoneRing::HazardCore);
        let class = pick_class(&mut self.rng, &weights);
        let cancelled = self
            .pre_storm_policies
            .iter_mut()
            .any(|policy| policy.decide(class) == PreStormDecision::Cancel);
        if cancelled {
            info!(%class, "scheduled storm cancelled by pre-storm policy");
            self.emit(StormEvent::CountdownCancelled { class });
            self.schedule_next_storm();
            return;
        }
        self.start_countdown(class, self.config.schedule.countdown_secs);
    }

    fn start_countdown(&mut self, class: StormClass, secs: u32) {
        let (countdown, events) =
            Countdown::begin(class, secs, &self.config.schedule.announce_at, self.time.tick);
        self.countdown = Some(countdown);
        self.phase = SchedulerPhase::Countdown;
        self.next_storm_at = None;
        info!(%class, secs, "countdown started");
        self.emit_all(events);
        if secs == 0 {
            self.landfall();
        }
    }

    fn run_countdown(&mut self, tick: u64) {
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        let class = countdown.class();
        match countdown.poll(tick) {
            CountdownTick::Quiet => {}
            CountdownTick::Announce(remaining_secs) => {
                debug!(%class, remaining_secs, "countdown checkpoint");
                self.emit(StormEvent::CountdownAnnouncement {
                    class,
                    remaining_secs,
                });
            }
            CountdownTick::Landfall => self.landfall(),
        }
    }

    fn landfall(&mut self) {
        let Some(countdown) = self.countdown.take() else {
            return;
        };
        let class = countdown.class();
        let profile = self.profiles.get(class).clone();
        let id = self.spawn_storm(&profile);
        self.phase = SchedulerPhase::Active;
        info!(storm = %id, %class, "landfall");
        self.emit(StormEvent::Landfall { storm: id, class });
    }

    fn return_to_idle(&mut self) {
        self.phase = SchedulerPhase::Idle;
        // Scheduled first so the all-clear can report the wait.
        let wait = self.schedule_next_storm();
        info!(next_storm_in_secs = wait, "all clear");
        self.emit(StormEvent::AllClear {
            next_storm_in_secs: wait,
        });
    }

    // --- Burst mode ---

    fn seed_population(&mut self) {
        let target = burst::initial_population(&self.config.burst);
        let count = burst::clamp_to_capacity(target, 0, self.config.burst.max_concurrent);
        for _ in 0..count {
            let fraction = burst::seeded_life_fraction(&mut self.rng);
            self.spawn_random_storm(Some(fraction));
        }
        info!(count, "initial storm population seeded");
    }

    fn spawn_burst(&mut self) {
        let max_concurrent = self.config.burst.max_concurrent;
        let live = self.storms.len() as u32;
        if live >= max_concurrent {
            info!(live, max_concurrent, "burst skipped, at capacity");
            self.emit(StormEvent::BurstSkipped {
                live,
                max_concurrent,
            });
            return;
        }
        let drawn = burst::draw_size(&self.config.burst, &mut self.rng);
        let size = burst::clamp_to_capacity(drawn, live, max_concurrent);
        let storms: Vec<StormId> = (0..size).map(|_| self.spawn_random_storm(None)).collect();
        info!(drawn, spawned = size, live = self.storms.len(), "burst spawned");
        self.emit(StormEvent::BurstSpawned { storms });
    }

    // --- Storm lifecycle ---

    fn allocate_id(&mut self) -> StormId {
        let id = StormId(self.next_storm_id);
        self.next_storm_id += 1;
        id
    }

    /// Spawn a storm of a given profile on a fresh path.
    fn spawn_storm(&mut self, profile: &StormProfile) -> StormId {
        let path = path::generate(&self.zones, &mut self.rng);
        self.spawn_on_path(profile, path, None)
    }

    /// Spawn a storm whose class is drawn with the weights of the ring it
    /// starts in. `remaining_fraction` shortens its life for seeding.
    fn spawn_random_storm(&mut self, remaining_fraction: Option<f64>) -> StormId {
        let path = path::generate(&self.zones, &mut self.rng);
        let ring = self.zones.classify(&path.start);
        let weights = self.zones.effective_weights(&self.config.weights, ring);
        let class = pick_class(&mut self.rng, &weights);
        let profile = self.profiles.get(class).clone();
        self.spawn_on_path(&profile, path, remaining_fraction)
    }

    fn spawn_on_path(
        &mut self,
        profile: &StormProfile,
        path: StormPath,
        remaining_fraction: Option<f64>,
    ) -> StormId {
        let id = self.allocate_id();
        let now = self.now();
        let mut instance = StormInstance::spawn(
            id,
            profile,
            &mut self.rng,
            path,
            now,
            self.phases.as_ref(),
        );
        if let Some(fraction) = remaining_fraction {
            let secs = instance.duration_secs * fraction;
            instance.truncate_remaining(secs, self.phases.as_ref());
        }
        debug!(
            storm = %id,
            class = %instance.class,
            duration = instance.duration_secs,
            radius = instance.radius,
            "storm spawned"
        );
        self.insert_storm(instance);
        id
    }

    fn insert_storm(&mut self, instance: StormInstance) {
        self.emit(StormEvent::StormCreated {
            storm: instance.id,
            class: instance.class,
            position: instance.position,
            radius: instance.radius,
            duration_secs: instance.duration_secs,
            damage_rate: instance.damage_rate,
        });
        let live = LiveStorm::new(instance, self.now(), self.time.tick);
        self.storms.insert(live.instance.id, live);
    }

    fn teardown(&mut self, id: StormId, reason: EndReason) {
        let Some(mut live) = self.storms.remove(&id) else {
            return;
        };
        live.task.cancel();
        info!(storm = %id, ?reason, "storm ended");
        self.emit(StormEvent::StormEnded { storm: id, reason });
    }

    fn run_storms(&mut self, tick: u64) {
        if self.storms.is_empty() {
            return;
        }
        let now = self.now();
        let nearby = systems::movement::nearby_players(&self.world);
        let settings = StepSettings {
            movement: &self.config.movement,
            phases: self.phases.as_ref(),
            warning_secs: self.config.phases.warning_secs,
        };
        let (events, expired) =
            systems::movement::run(&mut self.storms, &nearby, tick, now, settings);
        self.emit_all(events);
        for id in expired {
            self.teardown(id, EndReason::Expired);
        }
        if self.phase == SchedulerPhase::Active && self.storms.is_empty() {
            self.return_to_idle();
        }
    }

    // --- Exposure ---

    fn run_player_exposure(&mut self) {
        let footprints =
            systems::exposure::footprints(self.storms.values(), self.phases.as_ref());
        let ctx = ExposureContext {
            columns: self.collaborators.columns.as_ref(),
            protection: self.collaborators.protection.as_ref(),
            zones: &self.zones,
            weather_active: !self.storms.is_empty(),
            now: self.epoch_secs + self.time.elapsed_secs,
        };
        let interval = self.exposure_task.period_secs();
        let events = systems::exposure::run_players(
            &mut self.world,
            &footprints,
            &mut self.tracker,
            &mut self.damage_policies,
            &mut self.rng,
            &self.config.exposure,
            interval,
            &ctx,
        );
        self.emit_all(events);
    }

    fn run_entity_exposure(&mut self) {
        if self.storms.is_empty() {
            return;
        }
        let footprints =
            systems::exposure::footprints(self.storms.values(), self.phases.as_ref());
        let ctx = ExposureContext {
            columns: self.collaborators.columns.as_ref(),
            protection: self.collaborators.protection.as_ref(),
            zones: &self.zones,
            weather_active: true,
            now: self.epoch_secs + self.time.elapsed_secs,
        };
        let interval = self.entity_task.period_secs();
        let events = systems::exposure::run_entities(
            &mut self.world,
            &footprints,
            &self.config.exposure,
            &self.config.entities,
            interval,
            &ctx,
        );
        self.emit_all(events);
    }

    // --- Events ---

    fn emit(&mut self, event: StormEvent) {
        self.bus.publish(&event);
        self.pending_events.push(event);
    }

    fn emit_all(&mut self, events: impl IntoIterator<Item = StormEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}
