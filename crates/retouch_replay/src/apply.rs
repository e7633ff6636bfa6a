//! Action dispatch: re-apply one logged edit to the live document.
//!
//! Points and brush sizes in strokes and polylines are fractions of the
//! image height and are scaled by `full_dims.h` here.

use crate::assets::{Asset, AssetManager};
use crate::state::{Document, LayerSlot};
use retouch_core::{AssetId, Point, Rect};
use retouch_log::{
    Adjustments, BrushSettings, BrushStroke, EditAction, LoadImage, PolylineAction, PolylineMode,
    Slot,
};
use retouch_raster::{BrushKernel, BrushTip};
use tracing::warn;

/// Layer name used when a merge does not name its result
pub const MERGED_LAYER_NAME: &str = "Merged Layer";
/// Layer name used when a censor does not name its result
pub const CENSORED_LAYER_NAME: &str = "Censored Layer";

/// Why an action was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The referenced asset is not registered
    MissingAsset(AssetId),
    /// The action type is unknown to this build
    Unrecognized(String),
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The document changed as described by the action
    Applied,
    /// The document was left untouched
    Skipped(SkipReason),
}

impl ApplyOutcome {
    /// True if the action took effect
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Apply `action` to `document`.
///
/// Data problems (missing asset, unknown type) are logged and reported as
/// [`ApplyOutcome::Skipped`]; the document is left untouched in that case.
pub fn apply_action<A, K>(
    document: &mut Document,
    action: &EditAction,
    assets: &A,
    kernel: &K,
) -> ApplyOutcome
where
    A: AssetManager + ?Sized,
    K: BrushKernel + ?Sized,
{
    let state = &mut document.state;
    match action {
        EditAction::LoadImage(load) => {
            let LoadImage {
                asset_id,
                slot,
                name,
            } = load;
            let Some(asset) = lookup(assets, asset_id, action) else {
                return ApplyOutcome::Skipped(SkipReason::MissingAsset(*asset_id));
            };
            let name = name.clone().unwrap_or_else(|| asset.name.clone());
            bind_asset(document, *slot, asset, name);
        }
        EditAction::Swap => {
            std::mem::swap(&mut state.layer_a, &mut state.layer_b);
        }
        EditAction::Stroke(stroke) => {
            let scale = state.full_dims.h as f32;
            let points = scale_points(&stroke.points, scale);
            kernel.draw_stroke(&mut document.mask, &points, &stroke_tip(&stroke.brush, scale));
        }
        EditAction::Polyline(polyline) => {
            let scale = state.full_dims.h as f32;
            paint_polyline(document, polyline, scale, kernel);
        }
        EditAction::Crop(crop) => {
            state.crop_rect = Some(crop.rect);
            state.rotation = crop.rotation;
        }
        EditAction::Adjustment(adjustments) => {
            state.adjustments = adjustments.clone();
        }
        EditAction::TuneColor(tune) => {
            state.adjustments.set_band(tune.band, tune.tuning);
        }
        EditAction::ResetAdjustments => {
            state.adjustments = Adjustments::default();
        }
        EditAction::RotateView => {
            state.rotation = state.rotation.rotated_cw();
        }
        EditAction::SetOpacity { value } => {
            if value.is_finite() {
                state.opacity = value.clamp(0.0, 1.0);
            }
        }
        EditAction::ToggleMask { visible } => state.mask_visible = *visible,
        EditAction::ToggleBack { visible } => state.back_visible = *visible,
        EditAction::ToggleAdjustments { visible } => state.adjustments_visible = *visible,
        EditAction::MergeLayers(merge) => {
            let Some(asset) = lookup(assets, &merge.asset_id, action) else {
                return ApplyOutcome::Skipped(SkipReason::MissingAsset(merge.asset_id));
            };
            let target = merge.target_slot;
            state.layer_mut(target.other()).clear();
            bind_asset(document, target, asset, MERGED_LAYER_NAME.to_string());
            document.mask.clear();
            document.state.is_a_front = target == Slot::A;
            document.state.opacity = 1.0;
        }
        EditAction::ApplyCensor(censor) => {
            let Some(asset) = lookup(assets, &censor.asset_id, action) else {
                return ApplyOutcome::Skipped(SkipReason::MissingAsset(censor.asset_id));
            };
            bind_asset(document, censor.slot, asset, CENSORED_LAYER_NAME.to_string());
            document.mask.clear();
            let state = &mut document.state;
            state.brush_settings = BrushSettings::default();
            state.is_a_front = true;
            state.opacity = 1.0;
            state.mask_visible = true;
            state.back_visible = true;
        }
        EditAction::ResetAll => {
            document.mask.clear();
            state.adjustments = Adjustments::default();
            state.mask_visible = true;
            state.back_visible = true;
            state.adjustments_visible = true;
            state.crop_rect = Some(Rect::full(state.full_dims));
        }
        EditAction::ClearLayer { slot } => {
            state.layer_mut(*slot).clear();
        }
        EditAction::Unrecognized { tag } => {
            warn!(tag = %tag, "skipping unrecognized action");
            return ApplyOutcome::Skipped(SkipReason::Unrecognized(tag.clone()));
        }
    }
    ApplyOutcome::Applied
}

fn lookup<'a, A>(assets: &'a A, id: &AssetId, action: &EditAction) -> Option<&'a Asset>
where
    A: AssetManager + ?Sized,
{
    let asset = assets.get_asset(id);
    if asset.is_none() {
        warn!(asset = %id, kind = %action.kind(), "asset missing, skipping action");
    }
    asset
}

/// Bind `asset` into `slot` and refit the document extent.
///
/// The new extent covers both layers when the other slot is occupied,
/// otherwise it is the asset's own size. The mask follows the extent,
/// anchored top-left; the crop resets when the extent changes.
fn bind_asset(document: &mut Document, slot: Slot, asset: &Asset, name: String) {
    let state = &mut document.state;
    *state.layer_mut(slot) = LayerSlot::bound(asset.id, name);

    let full = if state.layer(slot.other()).is_occupied() {
        state.full_dims.union(&asset.dims)
    } else {
        asset.dims
    };
    if full != state.full_dims {
        state.full_dims = full;
        state.crop_rect = Some(Rect::full(full));
    }
    document.mask.resize_preserving(full);
}

fn scale_points(points: &[Point], scale: f32) -> Vec<Point> {
    points.iter().map(|p| p.scaled(scale)).collect()
}

fn stroke_tip(brush: &BrushStroke, scale: f32) -> BrushTip {
    BrushTip {
        size: brush.size * scale,
        feather: if brush.feather_mode {
            brush.feather * scale
        } else {
            brush.feather
        },
        feather_mode: brush.feather_mode,
        erasing: brush.erasing,
    }
}

fn paint_polyline<K>(document: &mut Document, polyline: &PolylineAction, scale: f32, kernel: &K)
where
    K: BrushKernel + ?Sized,
{
    let erasing = polyline.mode == PolylineMode::Erase;
    let points = scale_points(&polyline.points, scale);
    if polyline.fill {
        kernel.fill_polygon(&mut document.mask, &points, erasing);
    }
    let tip = stroke_tip(
        &BrushStroke {
            size: polyline.brush_size,
            feather: polyline.feather,
            feather_mode: polyline.feather_mode,
            erasing,
        },
        scale,
    );
    kernel.draw_polyline(&mut document.mask, &points, &tip);
}
