//! retouch Raster
//!
//! The single-channel mask raster and the brush kernel that paints into it.
//! Painting is deterministic: the same inputs always produce the same bytes,
//! which is what lets the replay engine rebuild a mask from its action log.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod brush;
pub mod mask;

pub use brush::{softness, BrushKernel, BrushTip, SoftBrush, HARDNESS_MAX};
pub use mask::MaskBuffer;
