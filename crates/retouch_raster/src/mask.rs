//! Coverage mask raster.
//!
//! Each pixel holds how much of the front layer is erased, from 0 (intact)
//! to 255 (fully erased).

use image::{GrayImage, Luma};
use retouch_core::{Dims, Fingerprinter, Hash};

/// Single-channel coverage raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBuffer {
    image: GrayImage,
}

impl MaskBuffer {
    /// Create a blank mask
    #[must_use]
    pub fn new(dims: Dims) -> Self {
        Self {
            image: GrayImage::new(dims.w, dims.h),
        }
    }

    /// Raster size
    #[must_use]
    pub fn dims(&self) -> Dims {
        Dims::new(self.image.width(), self.image.height())
    }

    /// Reset every pixel to zero coverage
    pub fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = Luma([0]);
        }
    }

    /// True if no pixel carries coverage
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.image.as_raw().iter().all(|&v| v == 0)
    }

    /// Resize to `dims`, keeping existing content anchored at the top-left.
    ///
    /// Pixels outside the old extent start blank; pixels outside the new
    /// extent are dropped.
    pub fn resize_preserving(&mut self, dims: Dims) {
        if self.dims() == dims {
            return;
        }
        let mut resized = GrayImage::new(dims.w, dims.h);
        let copy_w = self.image.width().min(dims.w);
        let copy_h = self.image.height().min(dims.h);
        for y in 0..copy_h {
            for x in 0..copy_w {
                resized.put_pixel(x, y, *self.image.get_pixel(x, y));
            }
        }
        self.image = resized;
    }

    /// Replace this mask's content with `other`, reusing the allocation
    /// when the dims match
    pub fn copy_from(&mut self, other: &MaskBuffer) {
        if self.dims() == other.dims() {
            self.image.copy_from_slice(other.image.as_raw());
        } else {
            self.image = other.image.clone();
        }
    }

    /// Coverage at `(x, y)`, or `None` outside the raster
    #[must_use]
    pub fn coverage_at(&self, x: u32, y: u32) -> Option<u8> {
        self.image.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    /// Blend `alpha` (0..=1) into one pixel.
    ///
    /// Erasing composites source-over (`a + d(1 - a)`); repairing
    /// composites destination-out (`a(1 - d)`). Out-of-range pixels are
    /// ignored.
    pub fn blend(&mut self, x: u32, y: u32, alpha: f32, erasing: bool) {
        if alpha <= 0.0 {
            return;
        }
        let Some(pixel) = self.image.get_pixel_mut_checked(x, y) else {
            return;
        };
        let d = alpha.min(1.0);
        let a = f32::from(pixel.0[0]) / 255.0;
        let out = if erasing { a + d * (1.0 - a) } else { a * (1.0 - d) };
        pixel.0[0] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Number of pixels with any coverage
    #[must_use]
    pub fn covered_pixels(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v > 0).count()
    }

    /// Coverage bytes in row-major order
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The underlying grayscale image
    #[must_use]
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Bytes held by the raster
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.image.as_raw().len()
    }

    /// Content fingerprint over dims and pixels
    #[must_use]
    pub fn fingerprint(&self) -> Hash {
        let dims = self.dims();
        let mut fp = Fingerprinter::new();
        fp.section(&dims.w.to_le_bytes())
            .section(&dims.h.to_le_bytes())
            .section(self.image.as_raw());
        fp.finish()
    }
}

impl Default for MaskBuffer {
    fn default() -> Self {
        Self::new(Dims::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mask_blank() {
        let mask = MaskBuffer::new(Dims::new(8, 4));
        assert_eq!(mask.dims(), Dims::new(8, 4));
        assert!(mask.is_blank());
        assert_eq!(mask.byte_len(), 32);
    }

    #[test]
    fn test_blend_erase_then_repair() {
        let mut mask = MaskBuffer::new(Dims::new(2, 2));
        mask.blend(0, 0, 1.0, true);
        assert_eq!(mask.coverage_at(0, 0), Some(255));
        mask.blend(0, 0, 0.5, false);
        assert_eq!(mask.coverage_at(0, 0), Some(128));
        mask.blend(0, 0, 1.0, false);
        assert_eq!(mask.coverage_at(0, 0), Some(0));
    }

    #[test]
    fn test_blend_out_of_range_ignored() {
        let mut mask = MaskBuffer::new(Dims::new(2, 2));
        mask.blend(5, 5, 1.0, true);
        assert!(mask.is_blank());
        assert_eq!(mask.coverage_at(5, 5), None);
    }

    #[test]
    fn test_resize_preserves_top_left() {
        let mut mask = MaskBuffer::new(Dims::new(4, 4));
        mask.blend(1, 2, 1.0, true);
        mask.blend(3, 3, 1.0, true);
        mask.resize_preserving(Dims::new(6, 3));
        assert_eq!(mask.dims(), Dims::new(6, 3));
        assert_eq!(mask.coverage_at(1, 2), Some(255));
        assert_eq!(mask.coverage_at(5, 0), Some(0));
        assert_eq!(mask.covered_pixels(), 1);
    }

    #[test]
    fn test_copy_from_resizes() {
        let mut src = MaskBuffer::new(Dims::new(3, 3));
        src.blend(2, 2, 1.0, true);
        let mut dst = MaskBuffer::new(Dims::new(1, 1));
        dst.copy_from(&src);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_fingerprint_tracks_content_and_dims() {
        let a = MaskBuffer::new(Dims::new(4, 4));
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.blend(0, 0, 0.2, true);
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(
            MaskBuffer::new(Dims::new(2, 8)).fingerprint(),
            MaskBuffer::new(Dims::new(8, 2)).fingerprint()
        );
    }

    #[test]
    fn test_clear() {
        let mut mask = MaskBuffer::new(Dims::new(3, 3));
        mask.blend(1, 1, 1.0, true);
        mask.clear();
        assert!(mask.is_blank());
    }
}
