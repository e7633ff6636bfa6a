//! Replay engine: undo and redo by keyframe restore plus re-application.

use crate::apply::{apply_action, ApplyOutcome};
use crate::assets::{AssetManager, AssetRegistry};
use crate::config::ReplayConfig;
use crate::error::{ReplayError, ReplayResult};
use crate::keyframe::KeyframeCache;
use crate::state::Document;
use retouch_log::{ActionLog, Cursor, EditAction, LogOutcome};
use retouch_raster::{BrushKernel, SoftBrush};
use std::time::Instant;
use tracing::{debug, warn};

type Hook = Box<dyn FnMut(&Document) + Send>;

/// Callbacks fired after the document changes
#[derive(Default)]
pub struct ReplayHooks {
    on_render: Option<Hook>,
    on_ui_refresh: Option<Hook>,
}

impl ReplayHooks {
    /// No hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the render callback
    #[must_use]
    pub fn on_render(mut self, hook: impl FnMut(&Document) + Send + 'static) -> Self {
        self.on_render = Some(Box::new(hook));
        self
    }

    /// Set the UI refresh callback
    #[must_use]
    pub fn on_ui_refresh(mut self, hook: impl FnMut(&Document) + Send + 'static) -> Self {
        self.on_ui_refresh = Some(Box::new(hook));
        self
    }

    fn fire(&mut self, document: &Document) {
        if let Some(render) = self.on_render.as_mut() {
            render(document);
        }
        if let Some(refresh) = self.on_ui_refresh.as_mut() {
            refresh(document);
        }
    }
}

impl std::fmt::Debug for ReplayHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayHooks")
            .field("on_render", &self.on_render.is_some())
            .field("on_ui_refresh", &self.on_ui_refresh.is_some())
            .finish()
    }
}

/// What one replay did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Index the document now reflects
    pub target: i64,
    /// Index of the keyframe replay started from
    pub keyframe_index: i64,
    /// Actions re-applied
    pub replayed: usize,
    /// Actions skipped for missing assets or unknown types
    pub skipped: usize,
}

/// Outcome of [`ReplayEngine::execute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOutcome {
    /// Whether the edit took effect
    pub applied: ApplyOutcome,
    /// Where it landed in the log
    pub logged: LogOutcome,
}

/// Owns the document and its history
pub struct ReplayEngine<A: AssetManager = AssetRegistry> {
    document: Document,
    log: ActionLog,
    keyframes: KeyframeCache,
    assets: A,
    kernel: Box<dyn BrushKernel>,
    hooks: ReplayHooks,
    config: ReplayConfig,
}

impl<A: AssetManager> ReplayEngine<A> {
    /// Create an engine; `document` becomes the genesis keyframe
    ///
    /// # Errors
    ///
    /// Returns error if `config` is invalid
    pub fn new(document: Document, assets: A, config: ReplayConfig) -> ReplayResult<Self> {
        let keyframes = KeyframeCache::new(&config, &document)?;
        let mut log = ActionLog::new();
        log.set_protect_setup(config.protect_setup);
        Ok(Self {
            document,
            log,
            keyframes,
            assets,
            kernel: Box::new(SoftBrush::new()),
            hooks: ReplayHooks::new(),
            config,
        })
    }

    /// Use a different brush kernel
    #[must_use]
    pub fn with_kernel(mut self, kernel: impl BrushKernel + 'static) -> Self {
        self.kernel = Box::new(kernel);
        self
    }

    /// Install render and UI hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: ReplayHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the hooks in place
    pub fn set_hooks(&mut self, hooks: ReplayHooks) {
        self.hooks = hooks;
    }

    /// Record an edit the caller has already applied to the document.
    ///
    /// Logging behind the tip discards the redoable future along with any
    /// keyframes taken in it, and forces a keyframe at the new index.
    pub fn log_action(&mut self, payload: EditAction) -> LogOutcome {
        let kind = payload.kind();
        let outcome = self.log.log_action(payload);
        if outcome.truncated() {
            self.keyframes.discard_after(outcome.previous);
        }
        if outcome.truncated() || self.keyframes.is_due(outcome.index) {
            self.keyframes.save_keyframe(outcome.index, &self.document);
        }
        debug!(index = outcome.index, %kind, discarded = outcome.discarded, "logged action");
        self.hooks.fire(&self.document);
        outcome
    }

    /// Apply an edit to the live document, then log it
    pub fn execute(&mut self, payload: EditAction) -> ExecuteOutcome {
        let applied = apply_action(
            &mut self.document,
            &payload,
            &self.assets,
            self.kernel.as_ref(),
        );
        let logged = self.log_action(payload);
        ExecuteOutcome { applied, logged }
    }

    /// Step back one action; `Ok(None)` if nothing to undo
    ///
    /// # Errors
    ///
    /// Returns error if the replay fails
    pub fn undo(&mut self) -> ReplayResult<Option<ReplayStats>> {
        if !self.log.can_undo() {
            return Ok(None);
        }
        let target = self.log.move_cursor(-1);
        self.replay_to(target).map(Some)
    }

    /// Step forward one action; `Ok(None)` if nothing to redo
    ///
    /// # Errors
    ///
    /// Returns error if the replay fails
    pub fn redo(&mut self) -> ReplayResult<Option<ReplayStats>> {
        if !self.log.can_redo() {
            return Ok(None);
        }
        let target = self.log.move_cursor(1);
        self.replay_to(target).map(Some)
    }

    /// Rebuild the document as of `target` and move the cursor there.
    ///
    /// Restores the nearest keyframe at or before `target`, re-applies the
    /// actions after it in log order, then fires the hooks once.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::IndexOutOfBounds`] if `target` is outside
    /// `[-1, last_index]`
    pub fn replay_to(&mut self, target: i64) -> ReplayResult<ReplayStats> {
        let last = self.log.last_index();
        if target < Cursor::GENESIS || target > last {
            return Err(ReplayError::IndexOutOfBounds { target, last });
        }

        let started = Instant::now();
        let keyframe_index = self.keyframes.restore(target, &mut self.document);
        debug_assert!(keyframe_index <= target);

        let mut replayed = 0;
        let mut skipped = 0;
        for action in self.log.range(keyframe_index, target) {
            match apply_action(
                &mut self.document,
                &action.payload,
                &self.assets,
                self.kernel.as_ref(),
            ) {
                ApplyOutcome::Applied => replayed += 1,
                ApplyOutcome::Skipped(reason) => {
                    warn!(id = %action.id, ?reason, "action skipped during replay");
                    skipped += 1;
                }
            }
        }
        self.log.seek(target);

        debug!(
            target,
            keyframe_index,
            replayed,
            skipped,
            elapsed_us = started.elapsed().as_micros() as u64,
            "replayed"
        );
        self.hooks.fire(&self.document);

        Ok(ReplayStats {
            target,
            keyframe_index,
            replayed,
            skipped,
        })
    }

    /// Capture a keyframe at the current cursor
    pub fn checkpoint(&mut self) {
        let index = self.log.cursor().pos();
        self.keyframes.save_keyframe(index, &self.document);
    }

    /// Forbid undo below `index`
    pub fn set_undo_floor(&mut self, index: i64) {
        self.log.set_floor(index);
    }

    /// Toggle the leading `LOAD_IMAGE` run as an undo floor
    pub fn set_protect_setup(&mut self, enabled: bool) {
        self.config.protect_setup = enabled;
        self.log.set_protect_setup(enabled);
    }

    /// True if [`ReplayEngine::undo`] would move the cursor
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    /// True if [`ReplayEngine::redo`] would move the cursor
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Current cursor position
    #[must_use]
    pub fn cursor(&self) -> i64 {
        self.log.cursor().pos()
    }

    /// The live document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for callers that apply edits themselves before
    /// calling [`ReplayEngine::log_action`]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The action log
    #[must_use]
    pub const fn log(&self) -> &ActionLog {
        &self.log
    }

    /// The keyframe cache
    #[must_use]
    pub const fn keyframes(&self) -> &KeyframeCache {
        &self.keyframes
    }

    /// Config the engine was built with, plus later toggles
    #[must_use]
    pub const fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// The asset source
    #[must_use]
    pub const fn assets(&self) -> &A {
        &self.assets
    }

    /// Mutable asset source, for registering assets mid-session
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }
}

impl<A: AssetManager + std::fmt::Debug> std::fmt::Debug for ReplayEngine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayEngine")
            .field("cursor", &self.log.cursor().pos())
            .field("actions", &self.log.len())
            .field("keyframes", &self.keyframes.indices())
            .field("assets", &self.assets)
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .finish()
    }
}
