//! The live document the engine edits.
//!
//! [`EditState`] is plain data. Layer pixels live in the asset manager and
//! are referenced by id, so cloning the state never copies an image.

use crate::error::ReplayResult;
use retouch_core::{AssetId, Dims, Fingerprinter, Hash, Rect, Rotation};
use retouch_log::{Adjustments, BrushSettings, CanonicalEncode, Slot};
use retouch_raster::MaskBuffer;
use serde::{Deserialize, Serialize};

/// Default front-layer opacity
pub const DEFAULT_OPACITY: f32 = 0.8;

/// What is bound into one layer slot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerSlot {
    /// Bound asset, if any
    pub asset_id: Option<AssetId>,
    /// Layer display name
    pub name: String,
}

impl LayerSlot {
    /// A slot bound to `asset_id`
    #[must_use]
    pub fn bound(asset_id: AssetId, name: impl Into<String>) -> Self {
        Self {
            asset_id: Some(asset_id),
            name: name.into(),
        }
    }

    /// True if an asset is bound
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.asset_id.is_some()
    }

    /// Unbind the slot
    pub fn clear(&mut self) {
        self.asset_id = None;
        self.name.clear();
    }
}

/// Every replayable, non-raster piece of editor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditState {
    /// Colour adjustments
    pub adjustments: Adjustments,
    /// Crop in truth-space pixels; `None` means the whole image
    pub crop_rect: Option<Rect>,
    /// View rotation
    pub rotation: Rotation,
    /// Extent covering both layers
    pub full_dims: Dims,
    /// Brush settings per mode
    pub brush_settings: BrushSettings,
    /// Front-layer opacity in `0..=1`
    pub opacity: f32,
    /// Layer A is drawn in front
    pub is_a_front: bool,
    /// Slot A
    pub layer_a: LayerSlot,
    /// Slot B
    pub layer_b: LayerSlot,
    /// Mask overlay visible
    pub mask_visible: bool,
    /// Back layer visible
    pub back_visible: bool,
    /// Adjustments enabled
    pub adjustments_visible: bool,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            adjustments: Adjustments::default(),
            crop_rect: None,
            rotation: Rotation::Deg0,
            full_dims: Dims::zero(),
            brush_settings: BrushSettings::default(),
            opacity: DEFAULT_OPACITY,
            is_a_front: true,
            layer_a: LayerSlot::default(),
            layer_b: LayerSlot::default(),
            mask_visible: true,
            back_visible: true,
            adjustments_visible: true,
        }
    }
}

impl EditState {
    /// The layer in `slot`
    #[must_use]
    pub const fn layer(&self, slot: Slot) -> &LayerSlot {
        match slot {
            Slot::A => &self.layer_a,
            Slot::B => &self.layer_b,
        }
    }

    /// Mutable layer in `slot`
    pub fn layer_mut(&mut self, slot: Slot) -> &mut LayerSlot {
        match slot {
            Slot::A => &mut self.layer_a,
            Slot::B => &mut self.layer_b,
        }
    }

    /// Crop rect, falling back to the full image
    #[must_use]
    pub fn effective_crop(&self) -> Rect {
        self.crop_rect.unwrap_or_else(|| Rect::full(self.full_dims))
    }
}

impl CanonicalEncode for EditState {}

/// Edit state plus the mask raster
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Everything but the raster
    pub state: EditState,
    /// Coverage raster sized to `full_dims`
    pub mask: MaskBuffer,
}

impl Document {
    /// An empty document: default state, zero-sized mask
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default state with a blank mask sized to `dims`
    #[must_use]
    pub fn with_dims(dims: Dims) -> Self {
        Self {
            state: EditState {
                full_dims: dims,
                ..EditState::default()
            },
            mask: MaskBuffer::new(dims),
        }
    }

    /// Fingerprint over the canonical state encoding and the mask bytes.
    ///
    /// Two documents with equal fingerprints are bit-identical.
    ///
    /// # Errors
    ///
    /// Returns error if the state cannot be canonically encoded
    pub fn fingerprint(&self) -> ReplayResult<Hash> {
        let state = self.state.encode()?;
        let mask = self.mask.fingerprint();
        let mut fp = Fingerprinter::new();
        fp.section(&state).section(mask.as_bytes());
        Ok(fp.finish())
    }
}
