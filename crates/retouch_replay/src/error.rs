//! Replay engine errors.

use retouch_core::CoreError;
use retouch_log::LogError;
use thiserror::Error;

/// Result type for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Replay engine error
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Replay target outside `[-1, last]`
    #[error("replay target {target} out of bounds [-1, {last}]")]
    IndexOutOfBounds {
        /// Requested index
        target: i64,
        /// Last index in the log
        last: i64,
    },

    /// Rejected configuration value
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration file is not valid JSON
    #[error("malformed config: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// Encoding or decoding failed in the log layer
    #[error(transparent)]
    Log(#[from] LogError),
}

impl From<ReplayError> for CoreError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::IndexOutOfBounds { target, last } => CoreError::OutOfBounds {
                index: target,
                min: -1,
                max: last,
            },
            ReplayError::Log(e) => e.into(),
            other => CoreError::Validation {
                field: "replay".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
