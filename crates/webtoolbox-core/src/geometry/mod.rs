//! Crop geometry shared by the cropper, resizer and watermark tools.
//!
//! # Coordinate Systems
//!
//! Three spaces are kept consistent:
//!
//! - **Display space**: CSS pixels of the `<img>` element on the page
//! - **Percentage space**: `CropRect`, 0-100 on both axes relative to the
//!   displayed image. Interactive edits happen here.
//! - **Natural space**: pixels of the decoded source. `PixelCropRect` lives
//!   here and is what the compositor copies.
//!
//! Origin is the top-left corner in every space.

mod mapper;
mod view;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mapper::{display_delta_to_percent, display_to_natural_scale, to_natural_pixels, to_percentage};
pub use view::{Pan, ViewState, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// Upper bound of percentage space.
pub const FULL: f64 = 100.0;

/// Errors raised by coordinate conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A conversion was attempted before an image with usable dimensions
    /// was loaded.
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
}

/// Dimensions of the loaded source image.
///
/// Display dimensions change when the page relayouts; natural dimensions are
/// fixed for the lifetime of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceImage {
    pub display_width: f64,
    pub display_height: f64,
    pub natural_width: f64,
    pub natural_height: f64,
}

impl SourceImage {
    pub fn new(display_width: f64, display_height: f64, natural_width: f64, natural_height: f64) -> Self {
        Self {
            display_width,
            display_height,
            natural_width,
            natural_height,
        }
    }

    /// A source shown at its natural size.
    pub fn natural(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        Self::new(w, h, w, h)
    }

    /// Same image at a new display size.
    pub fn with_display_size(self, display_width: f64, display_height: f64) -> Self {
        Self {
            display_width,
            display_height,
            ..self
        }
    }

    /// Natural width / natural height, or `None` if either is unusable.
    pub fn natural_aspect(&self) -> Option<f64> {
        if usable(self.natural_width) && usable(self.natural_height) {
            Some(self.natural_width / self.natural_height)
        } else {
            None
        }
    }

    /// True when all four dimensions are positive and finite.
    pub fn is_loaded(&self) -> bool {
        usable(self.display_width)
            && usable(self.display_height)
            && usable(self.natural_width)
            && usable(self.natural_height)
    }
}

#[inline]
pub(crate) fn usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Crop rectangle in percentage-of-display units.
///
/// Every field lies in `[0, 100]` with `x + width <= 100` and
/// `y + height <= 100`. Out-of-range values are clamped by [`CropRect::clamped`];
/// nothing in this crate rejects a rectangle for being out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for CropRect {
    fn default() -> Self {
        Self::full()
    }
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, FULL, FULL)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Centre point.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Clamp into the `[0, 100]` box.
    ///
    /// Size is clamped first, then position, so an oversized rectangle
    /// becomes the full axis rather than being shifted off the edge.
    /// Non-finite fields become 0.
    pub fn clamped(self) -> Self {
        let width = finite_or_zero(self.width).clamp(0.0, FULL);
        let height = finite_or_zero(self.height).clamp(0.0, FULL);
        let x = finite_or_zero(self.x).clamp(0.0, FULL - width);
        let y = finite_or_zero(self.y).clamp(0.0, FULL - height);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle satisfies the bounds invariant (with a small
    /// tolerance for accumulated floating-point error).
    pub fn is_within_bounds(&self) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= -EPS
            && self.y >= -EPS
            && self.width >= -EPS
            && self.height >= -EPS
            && self.right() <= FULL + EPS
            && self.bottom() <= FULL + EPS
    }
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Crop rectangle in natural-image pixels.
///
/// Always derived from a [`CropRect`] through [`to_natural_pixels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelCropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelCropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Aspect-ratio lock for interactive edits.
///
/// The ratio is width / height measured in natural pixels, so "1:1" means a
/// square output file regardless of the displayed shape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectConstraint {
    #[default]
    Free,
    Ratio(f64),
}

impl AspectConstraint {
    /// Build a ratio constraint. Returns `None` for zero, negative or
    /// non-finite ratios.
    pub fn ratio(ratio: f64) -> Option<Self> {
        usable(ratio).then_some(Self::Ratio(ratio))
    }

    /// Build a ratio from `width:height` parts, e.g. `from_parts(16.0, 9.0)`.
    pub fn from_parts(width: f64, height: f64) -> Option<Self> {
        if usable(width) && usable(height) {
            Self::ratio(width / height)
        } else {
            None
        }
    }

    /// The active ratio, if any.
    pub fn value(&self) -> Option<f64> {
        match *self {
            Self::Free => None,
            Self::Ratio(r) if usable(r) => Some(r),
            Self::Ratio(_) => None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.value().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_keeps_valid_rect() {
        let rect = CropRect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.clamped(), rect);
    }

    #[test]
    fn test_clamped_shifts_overflowing_rect() {
        let rect = CropRect::new(80.0, 90.0, 30.0, 20.0).clamped();
        assert_eq!(rect, CropRect::new(70.0, 80.0, 30.0, 20.0));
    }

    #[test]
    fn test_clamped_negative_origin() {
        let rect = CropRect::new(-5.0, -1.0, 50.0, 50.0).clamped();
        assert_eq!((rect.x, rect.y), (0.0, 0.0));
    }

    #[test]
    fn test_clamped_oversized_becomes_full() {
        let rect = CropRect::new(10.0, 10.0, 150.0, 120.0).clamped();
        assert_eq!(rect, CropRect::full());
    }

    #[test]
    fn test_clamped_non_finite() {
        let rect = CropRect::new(f64::NAN, 0.0, f64::INFINITY, 10.0).clamped();
        assert_eq!(rect, CropRect::new(0.0, 0.0, 0.0, 10.0));
    }

    #[test]
    fn test_aspect_ratio_rejects_invalid() {
        assert_eq!(AspectConstraint::ratio(0.0), None);
        assert_eq!(AspectConstraint::ratio(-1.5), None);
        assert_eq!(AspectConstraint::ratio(f64::NAN), None);
        assert_eq!(AspectConstraint::ratio(1.5), Some(AspectConstraint::Ratio(1.5)));
    }

    #[test]
    fn test_aspect_from_parts() {
        let c = AspectConstraint::from_parts(16.0, 9.0).unwrap();
        assert!((c.value().unwrap() - 16.0 / 9.0).abs() < 1e-12);
        assert!(AspectConstraint::from_parts(16.0, 0.0).is_none());
    }

    #[test]
    fn test_source_loaded_state() {
        assert!(SourceImage::natural(10, 10).is_loaded());
        assert!(!SourceImage::new(0.0, 10.0, 10.0, 10.0).is_loaded());
        assert_eq!(SourceImage::natural(1000, 500).natural_aspect(), Some(2.0));
    }

    #[test]
    fn test_aspect_constraint_serde() {
        let json = serde_json::to_string(&AspectConstraint::Ratio(1.5)).unwrap();
        assert_eq!(json, r#"{"ratio":1.5}"#);
        let free: AspectConstraint = serde_json::from_str(r#""free""#).unwrap();
        assert!(free.is_free());
    }
}
