//! State shared between the console and the game loop thread.

use std::sync::{Arc, Mutex};

use stormfront_core::commands::AdminCommand;
use stormfront_core::state::SchedulerSnapshot;

/// Commands sent from the console to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// An admin command to forward to the scheduler.
    Admin(AdminCommand),
    /// Save state, stop the scheduler and end the loop.
    Shutdown,
}

/// Latest scheduler snapshot, refreshed by the game loop once per second.
pub type SharedSnapshot = Arc<Mutex<Option<SchedulerSnapshot>>>;

pub fn shared_snapshot() -> SharedSnapshot {
    Arc::new(Mutex::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_snapshot_starts_empty() {
        let shared = shared_snapshot();
        assert!(shared.lock().unwrap().is_none());
    }
}
