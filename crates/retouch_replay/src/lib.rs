//! retouch Replay Engine
//!
//! Undo and redo over an action log without a bitmap per edit: sparse
//! keyframes in a bounded window, plus deterministic re-application of the
//! actions logged since the nearest one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod keyframe;
pub mod snapshot;
pub mod state;

pub use apply::{apply_action, ApplyOutcome, SkipReason};
pub use assets::{Asset, AssetManager, AssetRegistry};
pub use config::ReplayConfig;
pub use engine::{ExecuteOutcome, ReplayEngine, ReplayHooks, ReplayStats};
pub use error::{ReplayError, ReplayResult};
pub use keyframe::{Keyframe, KeyframeCache, GENESIS_INDEX};
pub use snapshot::Snapshot;
pub use state::{Document, EditState, LayerSlot, DEFAULT_OPACITY};
