//! Save and load the scheduler's resumable state as pretty-printed JSON.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use stormfront_core::error::PersistenceError;
use stormfront_core::state::PersistedState;

/// Write the state to `path`, creating the parent directory if needed.
pub fn save_to_file(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(PersistenceError::Serialize)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<PersistedState, PersistenceError> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(PersistenceError::Parse)
}

/// Load saved state, or start fresh when the file is missing or unreadable.
pub fn load_or_default(path: &Path) -> PersistedState {
    if !path.exists() {
        info!(path = %path.display(), "no saved storm state");
        return PersistedState::default();
    }
    match load_from_file(path) {
        Ok(state) => state,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring saved storm state");
            PersistedState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormfront_core::enums::{SchedulerPhase, StormClass};
    use stormfront_core::state::{PersistedCountdown, PersistedStorm};

    #[test]
    fn save_and_load_file() {
        let dir = std::env::temp_dir().join("stormfront_test_save_load");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("state.json");

        let state = PersistedState {
            phase: SchedulerPhase::Active,
            next_storm_time: Some(1234.5),
            active_storm: Some(PersistedStorm {
                class: StormClass::Severe,
                original_duration_secs: 900.0,
                remaining_secs: 321.0,
                start_time: 700.0,
                actual_damage_rate: Some(3.25),
            }),
            countdown: None,
        };
        save_to_file(&path, &state).unwrap();
        assert_eq!(load_from_file(&path).unwrap(), state);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn countdown_survives_round_trip() {
        let dir = std::env::temp_dir().join("stormfront_test_countdown");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("state.json");

        let state = PersistedState {
            phase: SchedulerPhase::Countdown,
            countdown: Some(PersistedCountdown {
                class: StormClass::Brief,
                remaining_secs: 42,
            }),
            ..PersistedState::default()
        };
        save_to_file(&path, &state).unwrap();
        assert_eq!(load_or_default(&path), state);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let dir = std::env::temp_dir().join("stormfront_test_malformed");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("state.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_from_file(&path), Err(PersistenceError::Parse(_))));
        assert_eq!(load_or_default(&path), PersistedState::default());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("stormfront_test_missing").join("none.json");
        assert!(matches!(load_from_file(&path), Err(PersistenceError::Io(_))));
        assert_eq!(load_or_default(&path), PersistedState::default());
    }
}
