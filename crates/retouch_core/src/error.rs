//! Core error types for retouch.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid encoding
    InvalidEncoding,

    /// Invalid rotation angle
    InvalidRotation {
        /// Angle that was rejected
        degrees: u16,
    },

    /// Parse error
    ParseError {
        /// Parser message
        message: String,
    },

    /// Validation error
    Validation {
        /// Offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// History index outside the legal range
    OutOfBounds {
        /// Requested index
        index: i64,
        /// Lowest legal index
        min: i64,
        /// Highest legal index
        max: i64,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding => write!(f, "Invalid encoding"),
            Self::InvalidRotation { degrees } => {
                write!(f, "Invalid rotation: {} (expected 0, 90, 180 or 270)", degrees)
            }
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
            Self::OutOfBounds { index, min, max } => {
                write!(f, "Index {} out of bounds [{}, {}]", index, min, max)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: err.to_string(),
        }
    }
}

impl From<postcard::Error> for CoreError {
    fn from(_: postcard::Error) -> Self {
        Self::InvalidEncoding
    }
}
