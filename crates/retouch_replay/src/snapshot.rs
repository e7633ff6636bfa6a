//! Value copies of a document.
//!
//! Capture and restore copy every field by name. Destructuring is
//! exhaustive, so adding a field to [`EditState`] without deciding how it
//! is snapshotted fails to compile.

use crate::state::{Document, EditState, LayerSlot};
use retouch_core::{Dims, Rect, Rotation};
use retouch_log::{Adjustments, BrushSettings};
use retouch_raster::MaskBuffer;

/// Deep copy of a document at one point in history
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Adjustment parameters
    pub adjustments: Adjustments,
    /// Crop rectangle
    pub crop_rect: Option<Rect>,
    /// View rotation
    pub rotation: Rotation,
    /// Document extent
    pub full_dims: Dims,
    /// Brush settings per mode
    pub brush_settings: BrushSettings,
    /// Front-layer opacity
    pub opacity: f32,
    /// Layer A drawn in front
    pub is_a_front: bool,
    /// Slot A binding
    pub layer_a: LayerSlot,
    /// Slot B binding
    pub layer_b: LayerSlot,
    /// Mask overlay visibility
    pub mask_visible: bool,
    /// Back layer visibility
    pub back_visible: bool,
    /// Adjustments enabled
    pub adjustments_visible: bool,
    /// Duplicate of the mask raster, same dims as the live one
    pub mask: MaskBuffer,
}

impl Snapshot {
    /// Capture an independent copy of `document`
    #[must_use]
    pub fn capture(document: &Document) -> Self {
        let EditState {
            adjustments,
            crop_rect,
            rotation,
            full_dims,
            brush_settings,
            opacity,
            is_a_front,
            layer_a,
            layer_b,
            mask_visible,
            back_visible,
            adjustments_visible,
        } = &document.state;

        Self {
            adjustments: adjustments.clone(),
            crop_rect: *crop_rect,
            rotation: *rotation,
            full_dims: *full_dims,
            brush_settings: *brush_settings,
            opacity: *opacity,
            is_a_front: *is_a_front,
            layer_a: layer_a.clone(),
            layer_b: layer_b.clone(),
            mask_visible: *mask_visible,
            back_visible: *back_visible,
            adjustments_visible: *adjustments_visible,
            mask: document.mask.clone(),
        }
    }

    /// Overwrite `document` with this snapshot.
    ///
    /// The live mask buffer is reused when dims match.
    pub fn restore_into(&self, document: &mut Document) {
        let Self {
            adjustments,
            crop_rect,
            rotation,
            full_dims,
            brush_settings,
            opacity,
            is_a_front,
            layer_a,
            layer_b,
            mask_visible,
            back_visible,
            adjustments_visible,
            mask,
        } = self;

        document.state = EditState {
            adjustments: adjustments.clone(),
            crop_rect: *crop_rect,
            rotation: *rotation,
            full_dims: *full_dims,
            brush_settings: *brush_settings,
            opacity: *opacity,
            is_a_front: *is_a_front,
            layer_a: layer_a.clone(),
            layer_b: layer_b.clone(),
            mask_visible: *mask_visible,
            back_visible: *back_visible,
            adjustments_visible: *adjustments_visible,
        };
        document.mask.copy_from(mask);
    }

    /// Approximate bytes held, dominated by the mask
    #[must_use]
    pub fn byte_len(&self) -> usize {
        std::mem::size_of::<Self>() + self.mask.byte_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_core::AssetId;
    use retouch_log::{BandTuning, ColorBand};

    fn busy_document() -> Document {
        let mut doc = Document::with_dims(Dims::new(16, 12));
        doc.state.opacity = 0.3;
        doc.state.rotation = Rotation::Deg180;
        doc.state.crop_rect = Some(Rect::new(1.0, 1.0, 10.0, 8.0));
        doc.state.layer_a = LayerSlot::bound(AssetId::from_name("a"), "front");
        doc.state.adjustments.set_band(
            ColorBand::Red,
            BandTuning {
                saturation: 0.4,
                ..BandTuning::default()
            },
        );
        doc.state.back_visible = false;
        doc.mask.blend(4, 4, 1.0, true);
        doc
    }

    #[test]
    fn test_capture_restore_roundtrip() {
        let doc = busy_document();
        let snap = Snapshot::capture(&doc);
        let mut other = Document::new();
        snap.restore_into(&mut other);
        assert_eq!(other, doc);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut doc = busy_document();
        let snap = Snapshot::capture(&doc);
        doc.mask.blend(0, 0, 1.0, true);
        doc.state.adjustments.gamma = 2.0;
        doc.state.layer_a.clear();
        assert_eq!(snap.mask.coverage_at(0, 0), Some(0));
        assert_eq!(snap.adjustments.gamma, 1.0);
        assert!(snap.layer_a.is_occupied());
    }

    #[test]
    fn test_restore_replaces_mask_of_other_dims() {
        let snap = Snapshot::capture(&busy_document());
        let mut doc = Document::with_dims(Dims::new(2, 2));
        snap.restore_into(&mut doc);
        assert_eq!(doc.mask.dims(), Dims::new(16, 12));
        assert_eq!(doc.mask.coverage_at(4, 4), Some(255));
    }

    #[test]
    fn test_byte_len_counts_mask() {
        let snap = Snapshot::capture(&Document::with_dims(Dims::new(10, 10)));
        assert!(snap.byte_len() >= 100);
    }
}
