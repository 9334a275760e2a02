//! Game loop thread: runs the storm scheduler at 20 Hz and logs its events.
//!
//! The scheduler is created inside this thread so it never has to be shared.
//! Admin commands arrive over an `mpsc` channel. On shutdown the resumable
//! state is saved first and the scheduler is stopped afterwards.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tracing::{debug, error, info};

use stormfront_core::config::StormConfig;
use stormfront_core::constants::{TICKS_PER_SECOND, TICK_RATE};
use stormfront_core::events::StormEvent;
use stormfront_sim::persistence;
use stormfront_sim::{Collaborators, SimConfig, StormScheduler};

use crate::state::{GameLoopCommand, SharedSnapshot};

/// Nominal duration of one tick.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Everything the loop needs to build and drive the scheduler.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub config: StormConfig,
    pub state_path: PathBuf,
    pub seed: u64,
    /// Stop after this many ticks.
    pub max_ticks: Option<u64>,
    /// Run ticks back to back instead of at the real tick rate.
    pub unthrottled: bool,
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    settings: LoopSettings,
    latest_snapshot: SharedSnapshot,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("stormfront-game-loop".into())
        .spawn(move || {
            run_game_loop(settings, cmd_rx, &latest_snapshot);
        })?;

    Ok((cmd_tx, handle))
}

/// Build a scheduler on the wall clock and resume any saved state.
pub fn build_scheduler(settings: &LoopSettings) -> StormScheduler {
    let epoch_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    let mut scheduler = StormScheduler::new(
        SimConfig {
            seed: settings.seed,
            epoch_secs,
        },
        settings.config.clone(),
        Collaborators::default(),
    );
    let saved = persistence::load_or_default(&settings.state_path);
    scheduler.restore_persisted(&saved);
    scheduler.start();
    scheduler
}

/// The game loop. Runs until Shutdown, channel disconnect or the tick limit.
fn run_game_loop(
    settings: LoopSettings,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &SharedSnapshot,
) {
    let mut scheduler = build_scheduler(&settings);
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Admin(cmd)) => {
                    let reply = scheduler.handle_command(cmd);
                    info!(ok = reply.ok, "{}", reply.message);
                }
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    shutdown(&mut scheduler, &settings);
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick and log what happened
        scheduler.tick();
        for event in scheduler.drain_events() {
            log_event(&event);
        }

        // 3. Publish a snapshot once per second
        let tick = scheduler.time().tick;
        if tick % TICKS_PER_SECOND == 0 {
            if let Ok(mut lock) = latest_snapshot.lock() {
                *lock = Some(scheduler.snapshot());
            }
        }

        if settings.max_ticks.is_some_and(|max| tick >= max) {
            shutdown(&mut scheduler, &settings);
            return;
        }
        if settings.unthrottled {
            continue;
        }

        // 4. Sleep until the next tick
        next_tick_time += TICK_DURATION;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > TICK_DURATION * 2 {
            // Too far behind; reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}

/// Save first: stopping ends every storm and clears the countdown.
fn shutdown(scheduler: &mut StormScheduler, settings: &LoopSettings) {
    match persistence::save_to_file(&settings.state_path, &scheduler.persisted_state()) {
        Ok(()) => info!(path = %settings.state_path.display(), "storm state saved"),
        Err(e) => error!(
            path = %settings.state_path.display(),
            error = %e,
            "failed to save storm state"
        ),
    }
    scheduler.stop();
    for event in scheduler.drain_events() {
        log_event(&event);
    }
}

/// Per-tick exposure events go to debug, everything else to info.
pub fn log_event(event: &StormEvent) {
    match event {
        StormEvent::StormTick { .. }
        | StormEvent::SubjectDamaged { .. }
        | StormEvent::StatusEffectApplied { .. } => debug!(?event, "storm event"),
        _ => info!(?event, "storm event"),
    }
}
