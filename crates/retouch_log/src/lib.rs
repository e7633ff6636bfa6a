//! retouch Action Log
//!
//! The ordered record of semantic edits with a movable cursor. Branching
//! (logging while the cursor is behind the tip) permanently discards the
//! redoable future.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod cursor;
pub mod encoding;
pub mod error;
pub mod history;
pub mod params;

pub use action::{
    Action, ActionKind, ApplyCensor, CropAction, EditAction, LoadImage, MergeLayers,
    PolylineAction, PolylineMode, StrokeAction, TuneColor,
};
pub use cursor::Cursor;
pub use encoding::{decode_action, decode_actions, decode_script, CanonicalEncode};
pub use error::{LogError, LogResult};
pub use history::{ActionLog, LogOutcome};
pub use params::{
    Adjustments, BandTuning, BrushMode, BrushParams, BrushSettings, BrushStroke, ColorBalance,
    ColorBand, Levels, Slot,
};
