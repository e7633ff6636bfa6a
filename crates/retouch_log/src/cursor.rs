//! Cursor for navigating the action log.

use serde::{Deserialize, Serialize};

/// Cursor position in the action log.
///
/// The position is the index of the last applied action, or
/// [`Cursor::GENESIS`] when no action is applied. Only [`crate::ActionLog`]
/// moves it, so it always stays inside the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    position: i64,
}

impl Cursor {
    /// Position before the first action
    pub const GENESIS: i64 = -1;

    /// Cursor at genesis
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: Self::GENESIS,
        }
    }

    /// Move by `delta`, clamped to `[GENESIS, last]`
    pub(crate) fn step(&mut self, delta: i64, last: i64) -> i64 {
        let target = self.position.saturating_add(delta);
        self.position = target.clamp(Self::GENESIS, last.max(Self::GENESIS));
        self.position
    }

    pub(crate) fn seek(&mut self, position: i64) {
        debug_assert!(position >= Self::GENESIS);
        self.position = position;
    }

    /// Index of the last applied action
    #[must_use]
    pub const fn pos(&self) -> i64 {
        self.position
    }

    /// True if no action is applied
    #[must_use]
    pub const fn is_genesis(&self) -> bool {
        self.position == Self::GENESIS
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
