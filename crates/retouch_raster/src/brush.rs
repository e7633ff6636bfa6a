//! Brush kernel: round stamps, spaced strokes and polygon fills.
//!
//! All coordinates here are pixels. Callers holding proportional units
//! scale them before painting.

use crate::mask::MaskBuffer;
use retouch_core::Point;
use tracing::trace;

/// Hardness scale used when not in feather mode
pub const HARDNESS_MAX: f32 = 20.0;

/// Brush parameters for one paint call, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushTip {
    /// Stamp diameter
    pub size: f32,
    /// Feather radius (feather mode) or hardness (0..=20)
    pub feather: f32,
    /// Treat `feather` as a radius instead of a hardness
    pub feather_mode: bool,
    /// Erasing raises coverage; repairing lowers it
    pub erasing: bool,
}

impl BrushTip {
    fn is_finite(&self) -> bool {
        self.size.is_finite() && self.feather.is_finite()
    }

    /// Distance between stamps along a segment
    #[must_use]
    pub fn spacing(&self) -> f32 {
        (self.size * 0.15).max(1.0)
    }
}

/// Fraction of the radius that fades out, in `0..=1`.
///
/// In feather mode the feather is an absolute radius; otherwise it is a
/// hardness value on a 0..=[`HARDNESS_MAX`] scale.
#[must_use]
pub fn softness(size: f32, feather: f32, feather_mode: bool) -> f32 {
    if !size.is_finite() || !feather.is_finite() {
        return 0.0;
    }
    let radius = size / 2.0;
    if radius <= 0.0 {
        return 0.0;
    }
    if feather_mode {
        (feather / radius).clamp(0.0, 1.0)
    } else {
        (feather / HARDNESS_MAX).clamp(0.0, 1.0)
    }
}

/// Rasterizer for brush strokes into a mask
pub trait BrushKernel: Send {
    /// Paint one round stamp centred at `at`
    fn paint_stamp(&self, mask: &mut MaskBuffer, at: Point, tip: &BrushTip);

    /// Fill a closed polygon at full strength (even-odd rule)
    fn fill_polygon(&self, mask: &mut MaskBuffer, points: &[Point], erasing: bool);

    /// Stamp evenly spaced dabs from `last` towards `to`.
    ///
    /// Returns the position of the last stamp on the segment, which is the
    /// `last` for the next segment. With no previous stamp, paints at `to`.
    /// Only stamps that can touch the mask are painted.
    fn paint_segment(
        &self,
        mask: &mut MaskBuffer,
        last: Option<Point>,
        to: Point,
        tip: &BrushTip,
    ) -> Point {
        let Some(last) = last else {
            self.paint_stamp(mask, to, tip);
            return to;
        };

        let spacing = tip.spacing();
        let dist = last.distance(&to);
        if !dist.is_finite() || !spacing.is_finite() || dist < spacing {
            return last;
        }

        let dir = Point::new((to.x - last.x) / dist, (to.y - last.y) / dist);
        let along = |s: f32| Point::new(last.x + dir.x * s, last.y + dir.y * s);
        let steps = (dist / spacing).floor() as u64;
        let end = along(steps as f32 * spacing);

        let Some((near, far)) = visible_span(mask, last, dir, dist, tip.size / 2.0) else {
            return end;
        };
        let first = ((near / spacing).ceil() as u64).max(1);
        let final_step = ((far / spacing).floor() as u64).min(steps);
        for k in first..=final_step {
            self.paint_stamp(mask, along(k as f32 * spacing), tip);
        }
        end
    }

    /// Paint a whole freehand stroke, ending with a cap stamp on the last
    /// point
    fn draw_stroke(&self, mask: &mut MaskBuffer, points: &[Point], tip: &BrushTip) {
        match points {
            [] => {}
            [only] => self.paint_stamp(mask, *only, tip),
            [.., end] => {
                let mut last = None;
                for point in points {
                    last = Some(self.paint_segment(mask, last, *point, tip));
                }
                self.paint_stamp(mask, *end, tip);
            }
        }
    }

    /// Paint a polyline: stamp every vertex and space stamps along every
    /// edge
    fn draw_polyline(&self, mask: &mut MaskBuffer, points: &[Point], tip: &BrushTip) {
        let Some(first) = points.first() else {
            return;
        };
        self.paint_stamp(mask, *first, tip);
        for pair in points.windows(2) {
            self.paint_segment(mask, Some(pair[0]), pair[1], tip);
            self.paint_stamp(mask, pair[1], tip);
        }
    }
}

/// Distances along the ray from `from` in `dir` (within `0..=len`) whose
/// stamps can reach the mask, by clipping to the mask grown by `radius`
fn visible_span(mask: &MaskBuffer, from: Point, dir: Point, len: f32, radius: f32) -> Option<(f32, f32)> {
    let dims = mask.dims();
    if dims.is_empty() {
        return None;
    }
    let pad = radius.max(0.0) + 1.0;
    let bounds = [
        (-dir.x, from.x + pad),
        (dir.x, dims.w as f32 + pad - from.x),
        (-dir.y, from.y + pad),
        (dir.y, dims.h as f32 + pad - from.y),
    ];

    let (mut near, mut far) = (0.0f32, len);
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            near = near.max(q / p);
        } else {
            far = far.min(q / p);
        }
    }
    (near <= far).then_some((near, far))
}

/// Reference kernel: round stamps with a linear radial falloff
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftBrush;

impl SoftBrush {
    /// Create the kernel
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl BrushKernel for SoftBrush {
    fn paint_stamp(&self, mask: &mut MaskBuffer, at: Point, tip: &BrushTip) {
        if !at.is_finite() || !tip.is_finite() {
            trace!(?at, ?tip, "skipping non-finite stamp");
            return;
        }
        let radius = tip.size / 2.0;
        if radius <= 0.0 {
            return;
        }
        let dims = mask.dims();
        if dims.is_empty() {
            return;
        }

        let soft = softness(tip.size, tip.feather, tip.feather_mode);
        let inner = radius * (1.0 - soft);

        let x0 = (at.x - radius).floor().max(0.0) as u32;
        let y0 = (at.y - radius).floor().max(0.0) as u32;
        let x1 = ((at.x + radius).ceil().max(0.0) as u32).min(dims.w);
        let y1 = ((at.y + radius).ceil().max(0.0) as u32).min(dims.h);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Point::new(x as f32 + 0.5, y as f32 + 0.5).distance(&at);
                if d > radius {
                    continue;
                }
                let alpha = if d <= inner {
                    1.0
                } else {
                    (radius - d) / (radius - inner)
                };
                mask.blend(x, y, alpha, tip.erasing);
            }
        }
    }

    fn fill_polygon(&self, mask: &mut MaskBuffer, points: &[Point], erasing: bool) {
        if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
            return;
        }
        let dims = mask.dims();
        if dims.is_empty() {
            return;
        }

        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let y0 = min_y.floor().max(0.0) as u32;
        let y1 = (max_y.ceil().max(0.0) as u32).min(dims.h);

        let mut crossings = Vec::with_capacity(points.len());
        for y in y0..y1 {
            let yc = y as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                    let t = (yc - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as u32;
                let end = ((span[1] - 0.5).ceil().max(0.0) as u32).min(dims.w);
                for x in start..end {
                    mask.blend(x, y, 1.0, erasing);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use retouch_core::Dims;

    fn hard(size: f32, erasing: bool) -> BrushTip {
        BrushTip {
            size,
            feather: 0.0,
            feather_mode: false,
            erasing,
        }
    }

    #[test]
    fn test_softness() {
        assert_eq!(softness(10.0, 0.0, false), 0.0);
        assert_eq!(softness(10.0, 10.0, false), 0.5);
        assert_eq!(softness(10.0, 40.0, false), 1.0);
        assert_eq!(softness(10.0, 2.5, true), 0.5);
        assert_eq!(softness(0.0, 5.0, true), 0.0);
        assert_eq!(softness(f32::NAN, 5.0, true), 0.0);
    }

    #[test]
    fn test_spacing_floor() {
        assert_eq!(hard(2.0, true).spacing(), 1.0);
        assert!((hard(100.0, true).spacing() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_hard_stamp_fills_disc() {
        let mut mask = MaskBuffer::new(Dims::new(20, 20));
        SoftBrush.paint_stamp(&mut mask, Point::new(10.0, 10.0), &hard(6.0, true));
        assert_eq!(mask.coverage_at(10, 10), Some(255));
        assert_eq!(mask.coverage_at(0, 0), Some(0));
        assert_eq!(mask.coverage_at(16, 10), Some(0));
    }

    #[test]
    fn test_soft_stamp_falls_off() {
        let mut mask = MaskBuffer::new(Dims::new(40, 40));
        let tip = BrushTip {
            size: 20.0,
            feather: 20.0,
            feather_mode: false,
            erasing: true,
        };
        SoftBrush.paint_stamp(&mut mask, Point::new(20.0, 20.0), &tip);
        let centre = mask.coverage_at(19, 19).unwrap();
        let edge = mask.coverage_at(27, 19).unwrap();
        assert!(centre > edge);
        assert!(edge > 0);
    }

    #[test]
    fn test_repair_stamp_clears() {
        let mut mask = MaskBuffer::new(Dims::new(20, 20));
        SoftBrush.paint_stamp(&mut mask, Point::new(10.0, 10.0), &hard(8.0, true));
        SoftBrush.paint_stamp(&mut mask, Point::new(10.0, 10.0), &hard(8.0, false));
        assert!(mask.is_blank());
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut mask = MaskBuffer::new(Dims::new(10, 10));
        SoftBrush.paint_stamp(&mut mask, Point::new(f32::NAN, 1.0), &hard(4.0, true));
        SoftBrush.paint_stamp(&mut mask, Point::new(5.0, 5.0), &hard(f32::INFINITY, true));
        SoftBrush.fill_polygon(
            &mut mask,
            &[Point::new(0.0, 0.0), Point::new(f32::NAN, 0.0), Point::new(5.0, 5.0)],
            true,
        );
        assert!(mask.is_blank());
    }

    #[test]
    fn test_segment_short_move_keeps_last() {
        let mut mask = MaskBuffer::new(Dims::new(50, 50));
        let tip = hard(40.0, true);
        let last = Point::new(10.0, 10.0);
        let next = SoftBrush.paint_segment(&mut mask, Some(last), Point::new(12.0, 10.0), &tip);
        assert_eq!(next, last);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_segment_steps_by_spacing() {
        let mut mask = MaskBuffer::new(Dims::new(50, 50));
        let tip = hard(20.0, true);
        let next = SoftBrush.paint_segment(
            &mut mask,
            Some(Point::new(0.0, 10.0)),
            Point::new(10.0, 10.0),
            &tip,
        );
        assert_eq!(next, Point::new(9.0, 10.0));
    }

    #[test]
    fn test_segment_far_off_canvas_matches_clipped() {
        let tip = hard(6.0, true);
        let from = Point::new(5.0, 10.0);
        let mut far = MaskBuffer::new(Dims::new(40, 40));
        let end = SoftBrush.paint_segment(&mut far, Some(from), Point::new(1.0e7, 10.0), &tip);
        let mut near = MaskBuffer::new(Dims::new(40, 40));
        SoftBrush.paint_segment(&mut near, Some(from), Point::new(60.0, 10.0), &tip);

        assert_eq!(far.as_raw(), near.as_raw());
        assert_eq!(far.coverage_at(39, 10), Some(255));
        assert!(end.x > 9.0e6);
    }

    #[test]
    fn test_segment_entering_canvas_from_outside() {
        let tip = hard(4.0, true);
        let mut mask = MaskBuffer::new(Dims::new(20, 20));
        SoftBrush.paint_segment(
            &mut mask,
            Some(Point::new(-5.0e6, 10.0)),
            Point::new(10.0, 10.0),
            &tip,
        );
        assert_eq!(mask.coverage_at(0, 10), Some(255));
        assert_eq!(mask.coverage_at(10, 0), Some(0));
    }

    #[test]
    fn test_stroke_single_point() {
        let mut mask = MaskBuffer::new(Dims::new(10, 10));
        SoftBrush.draw_stroke(&mut mask, &[Point::new(5.0, 5.0)], &hard(4.0, true));
        assert_eq!(mask.coverage_at(5, 5), Some(255));
    }

    #[test]
    fn test_stroke_reaches_end_cap() {
        let mut mask = MaskBuffer::new(Dims::new(100, 20));
        let points = [Point::new(5.0, 10.0), Point::new(93.0, 10.0)];
        SoftBrush.draw_stroke(&mut mask, &points, &hard(4.0, true));
        assert_eq!(mask.coverage_at(93, 10), Some(255));
        assert_eq!(mask.coverage_at(50, 10), Some(255));
    }

    #[test]
    fn test_fill_square() {
        let mut mask = MaskBuffer::new(Dims::new(20, 20));
        let square = [
            Point::new(2.0, 2.0),
            Point::new(12.0, 2.0),
            Point::new(12.0, 12.0),
            Point::new(2.0, 12.0),
        ];
        SoftBrush.fill_polygon(&mut mask, &square, true);
        assert_eq!(mask.covered_pixels(), 100);
        assert_eq!(mask.coverage_at(2, 2), Some(255));
        assert_eq!(mask.coverage_at(12, 12), Some(0));
    }

    #[test]
    fn test_fill_needs_three_points() {
        let mut mask = MaskBuffer::new(Dims::new(10, 10));
        SoftBrush.fill_polygon(&mut mask, &[Point::new(0.0, 0.0), Point::new(9.0, 9.0)], true);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_polyline_stamps_vertices() {
        let mut mask = MaskBuffer::new(Dims::new(40, 40));
        let pts = [Point::new(5.0, 5.0), Point::new(30.0, 5.0), Point::new(30.0, 30.0)];
        SoftBrush.draw_polyline(&mut mask, &pts, &hard(3.0, true));
        for p in pts {
            assert_eq!(mask.coverage_at(p.x as u32, p.y as u32), Some(255));
        }
    }

    proptest! {
        #[test]
        fn prop_painting_is_deterministic(
            xs in proptest::collection::vec((0f32..64.0, 0f32..64.0), 1..12),
            size in 1f32..20.0,
            feather in 0f32..20.0,
            erasing in any::<bool>(),
        ) {
            let points: Vec<Point> = xs.into_iter().map(|(x, y)| Point::new(x, y)).collect();
            let tip = BrushTip { size, feather, feather_mode: false, erasing: true };
            let mut a = MaskBuffer::new(Dims::new(64, 64));
            let mut b = MaskBuffer::new(Dims::new(64, 64));
            SoftBrush.draw_stroke(&mut a, &points, &tip);
            SoftBrush.draw_stroke(&mut b, &points, &tip);
            let repair = BrushTip { erasing, ..tip };
            SoftBrush.draw_stroke(&mut a, &points, &repair);
            SoftBrush.draw_stroke(&mut b, &points, &repair);
            prop_assert_eq!(a.fingerprint(), b.fingerprint());
        }
    }
}
