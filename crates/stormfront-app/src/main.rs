use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stormfront_app::console;
use stormfront_app::game_loop::{spawn_game_loop, LoopSettings};
use stormfront_app::state::{shared_snapshot, GameLoopCommand};
use stormfront_core::config::StormConfig;

/// Run the STORMFRONT storm scheduler.
#[derive(Parser, Debug)]
#[command(name = "stormfront", about = "Storm scheduler and exposure engine")]
struct Args {
    /// JSON storm configuration (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File the resumable storm state is loaded from and saved to
    #[arg(short, long, default_value = "stormfront-state.json")]
    state: PathBuf,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run this many ticks without a console, then save and exit
    #[arg(long)]
    ticks: Option<u64>,

    /// Do not sleep between ticks
    #[arg(long)]
    fast: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = args
        .config
        .as_deref()
        .map(StormConfig::load)
        .unwrap_or_default();

    let settings = LoopSettings {
        config,
        state_path: args.state.clone(),
        seed: args.seed,
        max_ticks: args.ticks,
        unthrottled: args.fast,
    };
    let latest = shared_snapshot();
    let (cmd_tx, handle) = match spawn_game_loop(settings, latest.clone()) {
        Ok(spawned) => spawned,
        Err(e) => {
            error!(error = %e, "failed to spawn game loop");
            return ExitCode::FAILURE;
        }
    };
    info!(state = %args.state.display(), "stormfront running");

    if args.ticks.is_none() {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match console::parse_line(&line, args.config.as_deref()) {
                Ok(GameLoopCommand::Shutdown) => break,
                Ok(command) => {
                    if cmd_tx.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{e}"),
            }
        }
        // The loop may already have exited; nothing left to do then.
        let _ = cmd_tx.send(GameLoopCommand::Shutdown);
    }

    if handle.join().is_err() {
        error!("game loop panicked");
        return ExitCode::FAILURE;
    }
    if let Ok(lock) = latest.lock() {
        if let Some(snapshot) = lock.as_ref() {
            info!(phase = ?snapshot.phase, storms = snapshot.storms.len(), "final state");
        }
    }
    ExitCode::SUCCESS
}
