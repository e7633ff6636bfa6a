//! Action types for the action log.
//!
//! An [`Action`] is created once, when it is logged, and never mutated.
//! The payload enum is the closed vocabulary of edits the replay engine
//! knows how to re-apply.

use crate::params::{Adjustments, BandTuning, BrushStroke, ColorBand, Slot};
use retouch_core::{ActionId, AssetId, Point, Rect, Rotation, Timestamp};
use serde::{Deserialize, Serialize};

/// Action kind - the type tag of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Bind an asset into a slot
    LoadImage,
    /// Exchange the two slots
    Swap,
    /// Freehand mask stroke
    Stroke,
    /// Committed polyline
    Polyline,
    /// Crop rectangle and rotation
    Crop,
    /// Replace the adjustment set
    Adjustment,
    /// Replace one colour band
    TuneColor,
    /// Restore neutral adjustments
    ResetAdjustments,
    /// Quarter turn clockwise
    RotateView,
    /// Set front-layer opacity
    SetOpacity,
    /// Show or hide the mask overlay
    ToggleMask,
    /// Show or hide the back layer
    ToggleBack,
    /// Enable or disable adjustments
    ToggleAdjustments,
    /// Flatten both layers into one slot
    MergeLayers,
    /// Install a censored layer
    ApplyCensor,
    /// Clear mask, adjustments and visibility
    ResetAll,
    /// Unbind one slot
    ClearLayer,
    /// Tag this build does not know
    Unrecognized,
}

impl ActionKind {
    /// Every kind that has a wire tag
    pub const KNOWN: [ActionKind; 17] = [
        Self::LoadImage,
        Self::Swap,
        Self::Stroke,
        Self::Polyline,
        Self::Crop,
        Self::Adjustment,
        Self::TuneColor,
        Self::ResetAdjustments,
        Self::RotateView,
        Self::SetOpacity,
        Self::ToggleMask,
        Self::ToggleBack,
        Self::ToggleAdjustments,
        Self::MergeLayers,
        Self::ApplyCensor,
        Self::ResetAll,
        Self::ClearLayer,
    ];

    /// Wire tag for this kind
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::LoadImage => "LOAD_IMAGE",
            Self::Swap => "SWAP",
            Self::Stroke => "STROKE",
            Self::Polyline => "POLYLINE",
            Self::Crop => "CROP",
            Self::Adjustment => "ADJUSTMENT",
            Self::TuneColor => "TUNE_COLOR",
            Self::ResetAdjustments => "RESET_ADJUSTMENTS",
            Self::RotateView => "ROTATE_VIEW",
            Self::SetOpacity => "SET_OPACITY",
            Self::ToggleMask => "TOGGLE_MASK",
            Self::ToggleBack => "TOGGLE_BACK",
            Self::ToggleAdjustments => "TOGGLE_ADJUSTMENTS",
            Self::MergeLayers => "MERGE_LAYERS",
            Self::ApplyCensor => "APPLY_CENSOR",
            Self::ResetAll => "RESET_ALL",
            Self::ClearLayer => "CLEAR_LAYER",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }

    /// Look up a kind by wire tag, including legacy aliases
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag == "SWAP_LAYERS" {
            return Some(Self::Swap);
        }
        Self::KNOWN.iter().copied().find(|kind| kind.tag() == tag)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Bind an asset into a layer slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadImage {
    /// Asset to bind
    pub asset_id: AssetId,
    /// Destination slot
    pub slot: Slot,
    /// Display name; the asset's own name is used when absent
    #[serde(default)]
    pub name: Option<String>,
}

/// A freehand brush stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeAction {
    /// Ordered points, proportional to image height
    pub points: Vec<Point>,
    /// Brush captured when the stroke was drawn
    pub brush: BrushStroke,
}

/// Polyline tool mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolylineMode {
    /// Raise mask coverage
    Erase,
    /// Lower mask coverage
    Repair,
}

/// A committed polyline, optionally filled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineAction {
    /// Vertices, proportional to image height
    pub points: Vec<Point>,
    /// Groups the segments of one polyline session
    pub session_id: u64,
    /// Fill the closed polygon before stroking the edges
    #[serde(default)]
    pub fill: bool,
    /// Edge width, proportional to image height
    pub brush_size: f32,
    /// Feather radius or hardness, as in [`BrushStroke`]
    pub feather: f32,
    /// Selects how `feather` is interpreted
    #[serde(default)]
    pub feather_mode: bool,
    /// Erase or repair
    pub mode: PolylineMode,
}

/// A committed crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropAction {
    /// Crop rectangle in full-image pixels
    pub rect: Rect,
    /// View rotation committed with the crop
    #[serde(default)]
    pub rotation: Rotation,
}

/// Replace one colour band's tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuneColor {
    /// Band to change
    pub band: ColorBand,
    /// New tuning for the band
    pub tuning: BandTuning,
}

/// Replace a slot with a flattened composite of both layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeLayers {
    /// The flattened composite
    pub asset_id: AssetId,
    /// Slot that receives the composite
    #[serde(default = "default_merge_slot")]
    pub target_slot: Slot,
}

fn default_merge_slot() -> Slot {
    Slot::A
}

/// Install a censored copy of the base image as a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplyCensor {
    /// The censored copy
    pub asset_id: AssetId,
    /// Slot that receives it
    #[serde(default = "default_censor_slot")]
    pub slot: Slot,
}

fn default_censor_slot() -> Slot {
    Slot::B
}

/// The edit vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditAction {
    /// Bind an asset into a slot and refit the document extent
    LoadImage(LoadImage),
    /// Exchange layer A and layer B
    #[serde(alias = "SWAP_LAYERS")]
    Swap,
    /// Paint a freehand stroke into the mask
    Stroke(StrokeAction),
    /// Paint a polyline, optionally filled
    Polyline(PolylineAction),
    /// Set the crop rectangle and rotation
    Crop(CropAction),
    /// Replace every adjustment parameter
    Adjustment(Adjustments),
    /// Replace one colour band's tuning
    TuneColor(TuneColor),
    /// Restore neutral adjustments
    ResetAdjustments,
    /// Rotate the view a quarter turn clockwise
    RotateView,
    /// Set the front layer's opacity
    SetOpacity {
        /// Clamped into `0..=1` when applied
        value: f32,
    },
    /// Show or hide the mask overlay
    ToggleMask {
        /// New visibility
        visible: bool,
    },
    /// Show or hide the back layer
    ToggleBack {
        /// New visibility
        visible: bool,
    },
    /// Enable or disable adjustments
    ToggleAdjustments {
        /// New visibility
        visible: bool,
    },
    /// Replace both layers with a flattened composite
    MergeLayers(MergeLayers),
    /// Install a censored layer
    ApplyCensor(ApplyCensor),
    /// Clear the mask and restore adjustments, visibility and crop
    ResetAll,
    /// Unbind one slot
    ClearLayer {
        /// Slot to unbind
        slot: Slot,
    },
    /// A tag this build does not know; kept so the log stays faithful
    #[serde(skip_deserializing)]
    Unrecognized {
        /// The tag as it appeared on the wire
        tag: String,
    },
}

impl EditAction {
    /// The type tag of this action
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::LoadImage(_) => ActionKind::LoadImage,
            Self::Swap => ActionKind::Swap,
            Self::Stroke(_) => ActionKind::Stroke,
            Self::Polyline(_) => ActionKind::Polyline,
            Self::Crop(_) => ActionKind::Crop,
            Self::Adjustment(_) => ActionKind::Adjustment,
            Self::TuneColor(_) => ActionKind::TuneColor,
            Self::ResetAdjustments => ActionKind::ResetAdjustments,
            Self::RotateView => ActionKind::RotateView,
            Self::SetOpacity { .. } => ActionKind::SetOpacity,
            Self::ToggleMask { .. } => ActionKind::ToggleMask,
            Self::ToggleBack { .. } => ActionKind::ToggleBack,
            Self::ToggleAdjustments { .. } => ActionKind::ToggleAdjustments,
            Self::MergeLayers(_) => ActionKind::MergeLayers,
            Self::ApplyCensor(_) => ActionKind::ApplyCensor,
            Self::ResetAll => ActionKind::ResetAll,
            Self::ClearLayer { .. } => ActionKind::ClearLayer,
            Self::Unrecognized { .. } => ActionKind::Unrecognized,
        }
    }

    /// Asset referenced by this action, if any
    #[must_use]
    pub fn asset_id(&self) -> Option<AssetId> {
        match self {
            Self::LoadImage(load) => Some(load.asset_id),
            Self::MergeLayers(merge) => Some(merge.asset_id),
            Self::ApplyCensor(censor) => Some(censor.asset_id),
            _ => None,
        }
    }
}

/// A logged action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Unique id assigned when logged
    pub id: ActionId,
    /// Wall-clock time when logged; never read by replay
    pub timestamp: Timestamp,
    /// What the action does
    #[serde(flatten)]
    pub payload: EditAction,
}

impl Action {
    /// Stamp a payload with a fresh id and the current time
    #[must_use]
    pub fn new(payload: EditAction) -> Self {
        Self {
            id: ActionId::new(),
            timestamp: Timestamp::now(),
            payload,
        }
    }

    /// Stamp a payload with an explicit time
    #[must_use]
    pub fn at(payload: EditAction, timestamp: Timestamp) -> Self {
        Self {
            id: ActionId::new(),
            timestamp,
            payload,
        }
    }

    /// The type tag of this action
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}
