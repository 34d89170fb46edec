//! Rotated overlay stamps and colour washes.
//!
//! A stamp is a coverage mask (for watermark text, the alpha channel of the
//! glyph run the page rasterised) tinted with a colour, rotated about its
//! centre and source-over blended onto the surface.
//!
//! # Algorithm
//!
//! Inverse mapping: for each surface pixel inside the rotated bounding box,
//! find the mask position it came from and bilinearly sample the coverage.
//!
//! ```text
//! mask_x = (x - cx) * cos(-θ) - (y - cy) * sin(-θ) + mask_cx
//! mask_y = (x - cx) * sin(-θ) + (y - cy) * cos(-θ) + mask_cy
//! ```

use super::CompositeError;
use crate::decode::{RasterSurface, CHANNELS};

/// An 8-bit coverage mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl Mask {
    /// Create a mask from row-major coverage values.
    pub fn new(width: u32, height: u32, coverage: Vec<u8>) -> Result<Self, CompositeError> {
        if width == 0 || height == 0 || coverage.len() != width as usize * height as usize {
            return Err(CompositeError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    /// Fully covered rectangle.
    pub fn solid(width: u32, height: u32) -> Result<Self, CompositeError> {
        Self::new(width, height, vec![255; width as usize * height as usize])
    }

    /// Take the alpha channel of an RGBA surface, e.g. text drawn on an
    /// offscreen canvas.
    pub fn from_alpha(surface: &RasterSurface) -> Result<Self, CompositeError> {
        let coverage = surface.pixels.chunks_exact(CHANNELS).map(|px| px[3]).collect();
        Self::new(surface.width, surface.height, coverage)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn at(&self, x: i64, y: i64) -> f64 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.coverage[y as usize * self.width as usize + x as usize] as f64
    }

    /// Bilinear coverage at a pixel-centre coordinate. Outside is 0, which
    /// gives the stamp anti-aliased edges.
    fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        self.at(x0, y0) * (1.0 - fx) * (1.0 - fy)
            + self.at(x0 + 1, y0) * fx * (1.0 - fy)
            + self.at(x0, y0 + 1) * (1.0 - fx) * fy
            + self.at(x0 + 1, y0 + 1) * fx * fy
    }
}

/// A mask placed on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub mask: Mask,
    /// Centre of the stamp in surface pixels.
    pub center_x: f64,
    pub center_y: f64,
    /// Rotation in degrees, positive = counter-clockwise.
    pub angle_degrees: f64,
    pub color: [u8; 3],
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,
}

/// Size of the axis-aligned box around a `width x height` mask rotated by
/// `angle_degrees`.
pub fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let rad = angle_degrees.to_radians();
    let cos = rad.cos().abs();
    let sin = rad.sin().abs();
    let (w, h) = (width as f64, height as f64);
    // Epsilon keeps exact right angles from ceiling 50.000000000000006 to 51.
    let bw = (w * cos + h * sin - 1e-9).ceil() as u32;
    let bh = (w * sin + h * cos - 1e-9).ceil() as u32;
    (bw.max(1), bh.max(1))
}

/// Blend a stamp onto the surface in place.
pub fn apply_stamp(surface: &mut RasterSurface, stamp: &Stamp) {
    let opacity = stamp.opacity.clamp(0.0, 1.0) as f64;
    if opacity == 0.0 || surface.is_empty() || !stamp.angle_degrees.is_finite() {
        return;
    }
    let (cx, cy) = (stamp.center_x, stamp.center_y);
    if !cx.is_finite() || !cy.is_finite() {
        return;
    }

    let mask = &stamp.mask;
    let (bw, bh) = rotated_bounds(mask.width, mask.height, stamp.angle_degrees);

    // Visit only the rotated bounding box, clipped to the surface.
    let x_start = (cx - bw as f64 / 2.0 - 1.0).floor().max(0.0) as u32;
    let y_start = (cy - bh as f64 / 2.0 - 1.0).floor().max(0.0) as u32;
    let x_end = ((cx + bw as f64 / 2.0 + 1.0).ceil().max(0.0) as u32).min(surface.width);
    let y_end = ((cy + bh as f64 / 2.0 + 1.0).ceil().max(0.0) as u32).min(surface.height);

    // Negate angle so positive rotates counter-clockwise on a y-down surface
    let rad = -stamp.angle_degrees.to_radians();
    let cos = rad.cos();
    let sin = rad.sin();
    let mask_cx = mask.width as f64 / 2.0;
    let mask_cy = mask.height as f64 / 2.0;

    for y in y_start..y_end {
        for x in x_start..x_end {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let mx = dx * cos - dy * sin + mask_cx - 0.5;
            let my = dx * sin + dy * cos + mask_cy - 0.5;

            let coverage = mask.sample(mx, my) / 255.0;
            if coverage <= 0.0 {
                continue;
            }
            let i = surface.offset(x, y);
            blend_over(&mut surface.pixels[i..i + CHANNELS], stamp.color, coverage * opacity);
        }
    }
}

/// Blend a colour over every pixel of the surface.
pub fn apply_tint(surface: &mut RasterSurface, color: [u8; 3], opacity: f32) {
    let alpha = opacity.clamp(0.0, 1.0) as f64;
    if alpha == 0.0 {
        return;
    }
    for px in surface.pixels.chunks_exact_mut(CHANNELS) {
        blend_over(px, color, alpha);
    }
}

/// Source-over with straight (non-premultiplied) alpha.
#[inline]
fn blend_over(dst: &mut [u8], color: [u8; 3], alpha: f64) {
    let alpha = alpha.clamp(0.0, 1.0);
    let dst_a = dst[3] as f64 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let v = (color[c] as f64 * alpha + dst[c] as f64 * dst_a * (1.0 - alpha)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black(width: u32, height: u32) -> RasterSurface {
        RasterSurface::filled(width, height, [0, 0, 0, 255])
    }

    fn white_stamp(mask: Mask, cx: f64, cy: f64, angle: f64, opacity: f32) -> Stamp {
        Stamp {
            mask,
            center_x: cx,
            center_y: cy,
            angle_degrees: angle,
            color: [255, 255, 255],
            opacity,
        }
    }

    #[test]
    fn test_mask_validation() {
        assert!(Mask::new(2, 2, vec![0; 3]).is_err());
        assert!(Mask::new(0, 2, vec![]).is_err());
        assert!(Mask::solid(3, 2).is_ok());
    }

    #[test]
    fn test_mask_from_alpha() {
        let surface = RasterSurface::new(2, 1, vec![9, 9, 9, 10, 9, 9, 9, 200]);
        let mask = Mask::from_alpha(&surface).unwrap();
        assert_eq!(mask.coverage, vec![10, 200]);
    }

    #[test]
    fn test_unrotated_stamp_covers_exact_pixels() {
        let mut surface = black(10, 10);
        apply_stamp(&mut surface, &white_stamp(Mask::solid(2, 2).unwrap(), 5.0, 5.0, 0.0, 1.0));

        for (x, y) in [(4, 4), (5, 4), (4, 5), (5, 5)] {
            assert_eq!(surface.pixel(x, y), [255, 255, 255, 255], "({}, {})", x, y);
        }
        assert_eq!(surface.pixel(3, 4), [0, 0, 0, 255]);
        assert_eq!(surface.pixel(6, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn test_half_opacity() {
        let mut surface = black(10, 10);
        apply_stamp(&mut surface, &white_stamp(Mask::solid(2, 2).unwrap(), 5.0, 5.0, 0.0, 0.5));
        let px = surface.pixel(4, 4);
        assert!((127..=128).contains(&px[0]), "got {:?}", px);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_rotation_90_turns_wide_into_tall() {
        let mut surface = black(20, 20);
        apply_stamp(&mut surface, &white_stamp(Mask::solid(4, 2).unwrap(), 10.0, 10.0, 90.0, 1.0));

        // Tall footprint: x in 9..=10, y in 8..=11
        assert!(surface.pixel(10, 8)[0] > 200);
        assert!(surface.pixel(9, 11)[0] > 200);
        // Where the unrotated wide stamp would have reached
        assert!(surface.pixel(12, 10)[0] < 50);
        assert!(surface.pixel(7, 9)[0] < 50);
    }

    #[test]
    fn test_stamp_partly_off_surface() {
        let mut surface = black(4, 4);
        apply_stamp(&mut surface, &white_stamp(Mask::solid(4, 4).unwrap(), 0.0, 0.0, 30.0, 1.0));
        assert!(surface.pixel(0, 0)[0] > 200);
        assert_eq!(surface.pixel(3, 3), [0, 0, 0, 255]);
    }

    #[test]
    fn test_zero_opacity_is_noop() {
        let mut surface = black(6, 6);
        let before = surface.clone();
        apply_stamp(&mut surface, &white_stamp(Mask::solid(4, 4).unwrap(), 3.0, 3.0, 45.0, 0.0));
        assert_eq!(surface, before);
    }

    #[test]
    fn test_stamp_on_transparent_takes_stamp_color() {
        let mut surface = RasterSurface::transparent(4, 4);
        apply_stamp(&mut surface, &white_stamp(Mask::solid(2, 2).unwrap(), 2.0, 2.0, 0.0, 0.5));
        let px = surface.pixel(1, 1);
        assert_eq!(&px[..3], &[255, 255, 255]);
        assert!((127..=128).contains(&px[3]));
    }

    #[test]
    fn test_tint() {
        let mut surface = RasterSurface::filled(2, 2, [100, 100, 100, 255]);
        apply_tint(&mut surface, [200, 0, 0], 0.5);
        assert_eq!(surface.pixel(0, 0), [150, 50, 50, 255]);
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        let (w, h) = rotated_bounds(100, 50, 90.0);
        assert_eq!((w, h), (50, 100));
        let (w, h) = rotated_bounds(100, 100, 45.0);
        assert_eq!((w, h), (142, 142));
    }
}
