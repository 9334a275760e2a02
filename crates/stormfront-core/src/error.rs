//! Error taxonomy.
//!
//! Nothing here is fatal to the host: config defects are substituted with
//! defaults, admin rejections leave state untouched, and persistence failures
//! fall back to in-memory defaults.

use thiserror::Error;

/// A missing or invalid tunable that was replaced with a built-in default.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config `{field}`: {problem}; using default {default}")]
pub struct ConfigDefect {
    /// Dotted path of the offending field, e.g. `burst.max_concurrent`.
    pub field: String,
    pub problem: String,
    /// Display form of the substituted value.
    pub default: String,
}

impl ConfigDefect {
    pub fn new(
        field: impl Into<String>,
        problem: impl Into<String>,
        default: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
            default: default.to_string(),
        }
    }
}

/// Rejected administrative request. No state was changed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdminError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotApplicable(String),
}

/// Save/load failure.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse save data: {0}")]
    Parse(serde_json::Error),
    #[error("failed to serialize save data: {0}")]
    Serialize(serde_json::Error),
}
