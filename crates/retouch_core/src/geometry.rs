//! Geometry value types: image dimensions, points, rectangles and
//! quarter-turn rotations.
//!
//! Rectangles live in the unrotated pixel grid of the full image; the view
//! rotation is stored beside them, never baked in.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image or raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dims {
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl Dims {
    /// Create new dimensions
    #[must_use]
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Zero-sized dims (no image loaded)
    #[must_use]
    pub const fn zero() -> Self {
        Self { w: 0, h: 0 }
    }

    /// True if either side is zero
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Component-wise maximum, so the result covers both extents
    #[must_use]
    pub fn union(&self, other: &Dims) -> Dims {
        Dims {
            w: self.w.max(other.w),
            h: self.h.max(other.h),
        }
    }
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// A point, either in pixels or in proportional units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by `factor`
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// True if both coordinates are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`
    #[must_use]
    pub fn distance(&self, other: &Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle in truth-space pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering the whole image
    #[must_use]
    pub fn full(dims: Dims) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: dims.w as f32,
            h: dims.h as f32,
        }
    }
}

/// Quarter-turn view rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    /// Upright
    #[default]
    Deg0,
    /// Quarter turn clockwise
    Deg90,
    /// Half turn
    Deg180,
    /// Quarter turn counter-clockwise
    Deg270,
}

impl Rotation {
    /// Angle in degrees
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Next quarter turn clockwise
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = CoreError;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees % 360 {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(CoreError::InvalidRotation { degrees }),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}deg", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dims_union() {
        let a = Dims::new(400, 600);
        let b = Dims::new(900, 300);
        assert_eq!(a.union(&b), Dims::new(900, 600));
    }

    #[test]
    fn test_rect_full() {
        let r = Rect::full(Dims::new(800, 600));
        assert_eq!(r, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_rotation_cycle() {
        let mut r = Rotation::Deg0;
        for _ in 0..4 {
            r = r.rotated_cw();
        }
        assert_eq!(r, Rotation::Deg0);
        assert_eq!(Rotation::Deg90.rotated_cw(), Rotation::Deg180);
    }

    #[test]
    fn test_rotation_serde() {
        let json = serde_json::to_string(&Rotation::Deg270).unwrap();
        assert_eq!(json, "270");
        let back: Rotation = serde_json::from_str("90").unwrap();
        assert_eq!(back, Rotation::Deg90);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    proptest! {
        #[test]
        fn prop_union_covers_both(
            aw in 0u32..5000, ah in 0u32..5000, bw in 0u32..5000, bh in 0u32..5000,
        ) {
            let a = Dims::new(aw, ah);
            let b = Dims::new(bw, bh);
            let u = a.union(&b);
            prop_assert_eq!(u, b.union(&a));
            prop_assert!(u.w >= a.w && u.w >= b.w);
            prop_assert!(u.h >= a.h && u.h >= b.h);
            prop_assert!(u.w == a.w || u.w == b.w);
            prop_assert_eq!(u.union(&a), u);
        }
    }
}
