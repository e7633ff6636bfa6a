//! Log and script decoding errors.

use retouch_core::CoreError;
use thiserror::Error;

/// Result type for log operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while decoding or encoding actions
#[derive(Debug, Error)]
pub enum LogError {
    /// A script entry could not be decoded into a known action
    #[error("action #{index}: {reason}")]
    Decode {
        /// Position of the entry in the script
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// The script is not valid JSON
    #[error("malformed script: {0}")]
    Json(#[from] serde_json::Error),

    /// Canonical encoding failed
    #[error("canonical encoding failed: {0}")]
    Encode(#[from] postcard::Error),
}

impl From<LogError> for CoreError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::Decode { index, reason } => CoreError::Validation {
                field: format!("actions[{}]", index),
                reason,
            },
            LogError::Json(e) => CoreError::ParseError {
                message: e.to_string(),
            },
            LogError::Encode(_) => CoreError::InvalidEncoding,
        }
    }
}
