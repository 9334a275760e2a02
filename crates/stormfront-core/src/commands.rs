//! Administrative commands sent from the host to the scheduler.
//!
//! Arguments arrive unvalidated (as typed by an operator); the scheduler
//! rejects bad ones without touching state.

use serde::{Deserialize, Serialize};

use crate::config::StormConfig;
use crate::error::AdminError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdminCommand {
    /// Cancel whatever is in flight and start a storm immediately.
    ForceStart {
        /// Storm class name; random weighted draw when absent.
        class: Option<String>,
        /// Fixed duration replacing the profile's min/max (seconds).
        duration_secs: Option<i64>,
    },
    /// Move the next legacy storm to `seconds` from now.
    ForceNext { seconds: i64 },
    /// End every live storm now.
    EndNow,
    /// Swap in a freshly loaded config.
    ReloadConfig { config: Box<StormConfig> },
}

/// Outcome of an admin command: success flag plus an operator-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminReply {
    pub ok: bool,
    pub message: String,
}

impl From<Result<String, AdminError>> for AdminReply {
    fn from(result: Result<String, AdminError>) -> Self {
        match result {
            Ok(message) => Self { ok: true, message },
            Err(e) => Self {
                ok: false,
                message: e.to_string(),
            },
        }
    }
}
