//! Replay engine configuration.

use crate::error::{ReplayError, ReplayResult};
use serde::{Deserialize, Serialize};

/// Keyframe cadence, retention and undo policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Capture a keyframe at every index that is a multiple of this
    pub keyframe_interval: usize,
    /// Number of non-genesis keyframes kept
    pub keyframe_buffer: usize,
    /// Stop undo at the leading run of `LOAD_IMAGE` actions
    pub protect_setup: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            keyframe_interval: 20,
            keyframe_buffer: 5,
            protect_setup: false,
        }
    }
}

impl ReplayConfig {
    /// Set the keyframe interval
    #[must_use]
    pub const fn with_interval(mut self, interval: usize) -> Self {
        self.keyframe_interval = interval;
        self
    }

    /// Set the keyframe window size
    #[must_use]
    pub const fn with_buffer(mut self, buffer: usize) -> Self {
        self.keyframe_buffer = buffer;
        self
    }

    /// Enable or disable setup protection
    #[must_use]
    pub const fn with_protect_setup(mut self, enabled: bool) -> Self {
        self.protect_setup = enabled;
        self
    }

    /// Check the config is usable
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if the interval is zero
    pub fn validate(&self) -> ReplayResult<()> {
        if self.keyframe_interval == 0 {
            return Err(ReplayError::InvalidConfig {
                field: "keyframe_interval",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the values are invalid
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.keyframe_interval, 20);
        assert_eq!(config.keyframe_buffer, 5);
        assert!(!config.protect_setup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = ReplayConfig::default().with_interval(0);
        assert!(matches!(
            config.validate(),
            Err(ReplayError::InvalidConfig { field: "keyframe_interval", .. })
        ));
    }

    #[test]
    fn test_zero_buffer_allowed() {
        assert!(ReplayConfig::default().with_buffer(0).validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ReplayConfig::from_json(r#"{ "keyframe_interval": 3 }"#).unwrap();
        assert_eq!(config, ReplayConfig::default().with_interval(3));
        assert!(ReplayConfig::from_json(r#"{ "keyframe_interval": 0 }"#).is_err());
        let config = ReplayConfig::from_json(r#"{ "protect_setup": true }"#).unwrap();
        assert!(config.protect_setup);
        assert!(matches!(
            ReplayConfig::from_json("{"),
            Err(ReplayError::ConfigJson(_))
        ));
    }
}
