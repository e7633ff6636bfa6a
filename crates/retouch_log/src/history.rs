//! The action log: ordered actions plus a cursor.
//!
//! Invariant: `-1 <= cursor <= len - 1`. Appending at cursor `c` first
//! discards every action after `c`.

use crate::action::{Action, ActionKind, EditAction};
use crate::cursor::Cursor;
use tracing::debug;

/// Result of appending to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOutcome {
    /// Index of the new action (the new cursor)
    pub index: i64,
    /// Cursor before the append
    pub previous: i64,
    /// Number of redoable actions dropped by the append
    pub discarded: usize,
}

impl LogOutcome {
    /// True if the append pruned an abandoned future
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.discarded > 0
    }
}

/// Ordered record of applied edits with a movable cursor
#[derive(Debug, Clone)]
pub struct ActionLog {
    actions: Vec<Action>,
    cursor: Cursor,
    floor: i64,
    protect_setup: bool,
}

impl ActionLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            cursor: Cursor::new(),
            floor: Cursor::GENESIS,
            protect_setup: false,
        }
    }

    /// Stamp `payload` with a fresh id and time, then append it
    pub fn log_action(&mut self, payload: EditAction) -> LogOutcome {
        self.append(Action::new(payload))
    }

    /// Append an already stamped action
    pub fn append(&mut self, action: Action) -> LogOutcome {
        let previous = self.cursor.pos();
        let keep = (previous + 1) as usize;
        let discarded = self.actions.len().saturating_sub(keep);
        if discarded > 0 {
            self.actions.truncate(keep);
            debug!(cursor = previous, discarded, "branching: dropped redoable actions");
        }

        self.actions.push(action);
        let index = self.last_index();
        self.cursor.seek(index);
        if self.floor > index {
            self.floor = index;
        }

        LogOutcome {
            index,
            previous,
            discarded,
        }
    }

    /// True if the cursor can move back
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.pos() > self.effective_floor()
    }

    /// True if there are actions after the cursor
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.pos() < self.last_index()
    }

    /// Move the cursor by `delta`, clamped into `[-1, len - 1]`.
    ///
    /// Only moves the cursor; nothing is replayed.
    pub fn move_cursor(&mut self, delta: i64) -> i64 {
        let last = self.last_index();
        self.cursor.step(delta, last)
    }

    /// Move the cursor to `index`, clamped into `[-1, len - 1]`
    pub fn seek(&mut self, index: i64) -> i64 {
        let delta = index.saturating_sub(self.cursor.pos());
        self.move_cursor(delta)
    }

    /// Lowest position undo may reach.
    ///
    /// Clamped to the current cursor so the floor never sits ahead of it.
    pub fn set_floor(&mut self, floor: i64) {
        self.floor = floor.clamp(Cursor::GENESIS, self.cursor.pos());
    }

    /// Floor set through [`ActionLog::set_floor`]
    #[must_use]
    pub const fn floor(&self) -> i64 {
        self.floor
    }

    /// Keep undo from unloading the images the session opened with.
    ///
    /// While enabled, undo stops at [`ActionLog::setup_floor`] as well as
    /// at the manual floor.
    pub fn set_protect_setup(&mut self, enabled: bool) {
        self.protect_setup = enabled;
    }

    /// True if the setup run is protected from undo
    #[must_use]
    pub const fn protects_setup(&self) -> bool {
        self.protect_setup
    }

    /// Index of the last action in the leading run of `LOAD_IMAGE`
    /// actions, or -1 if the log does not start with one
    #[must_use]
    pub fn setup_floor(&self) -> i64 {
        let run = self
            .actions
            .iter()
            .take_while(|action| action.kind() == ActionKind::LoadImage)
            .count();
        run as i64 - 1
    }

    /// Lowest position undo may reach right now
    #[must_use]
    pub fn effective_floor(&self) -> i64 {
        if self.protect_setup {
            self.floor.max(self.setup_floor())
        } else {
            self.floor
        }
    }

    /// Current cursor
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Index of the last action, or -1 if empty
    #[must_use]
    pub fn last_index(&self) -> i64 {
        self.actions.len() as i64 - 1
    }

    /// Number of logged actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if nothing is logged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action at `index`, if in range
    #[must_use]
    pub fn get(&self, index: i64) -> Option<&Action> {
        usize::try_from(index).ok().and_then(|i| self.actions.get(i))
    }

    /// Every logged action in order
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions with index in `(after, through]`, in log order
    #[must_use]
    pub fn range(&self, after: i64, through: i64) -> &[Action] {
        let start = (after + 1).max(0) as usize;
        let end = ((through + 1).max(0) as usize).min(self.actions.len());
        if start >= end {
            return &[];
        }
        &self.actions[start..end]
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}
