//! Conversions between percentage, display and natural-pixel space.
//!
//! All functions are stateless. They fail with
//! [`GeometryError::InvalidState`] when the source has a zero or non-finite
//! dimension, which only happens if a caller converts before the image has
//! finished loading.

use super::{usable, CropRect, GeometryError, PixelCropRect, SourceImage, FULL};

/// Scale factors from display pixels to natural pixels.
///
/// Returns `(natural_width / display_width, natural_height / display_height)`.
pub fn display_to_natural_scale(source: &SourceImage) -> Result<(f64, f64), GeometryError> {
    ensure_loaded(source)?;
    Ok((
        source.natural_width / source.display_width,
        source.natural_height / source.display_height,
    ))
}

/// Convert a percentage crop into natural pixels.
///
/// Each field is multiplied by the natural dimension / 100 and floored, so
/// the output size is deterministic and never lands between pixels. Because
/// the input is clamped first and floors never round up, the result always
/// fits inside the natural image. A non-empty axis keeps at least one pixel.
pub fn to_natural_pixels(crop: &CropRect, source: &SourceImage) -> Result<PixelCropRect, GeometryError> {
    ensure_loaded(source)?;
    let crop = crop.clamped();
    let nw = source.natural_width;
    let nh = source.natural_height;

    let max_w = floor_px(nw);
    let max_h = floor_px(nh);
    let (x, width) = floor_span(crop.x * nw / FULL, crop.width * nw / FULL, max_w);
    let (y, height) = floor_span(crop.y * nh / FULL, crop.height * nh / FULL, max_h);

    Ok(PixelCropRect::new(x, y, width, height))
}

/// Convert natural pixels back into a percentage crop.
///
/// Used when the user types exact pixel values into the position and size
/// fields. The result is clamped into bounds.
pub fn to_percentage(rect: &PixelCropRect, source: &SourceImage) -> Result<CropRect, GeometryError> {
    ensure_loaded(source)?;
    let nw = source.natural_width;
    let nh = source.natural_height;
    Ok(CropRect::new(
        rect.x as f64 * FULL / nw,
        rect.y as f64 * FULL / nh,
        rect.width as f64 * FULL / nw,
        rect.height as f64 * FULL / nh,
    )
    .clamped())
}

/// Convert a pointer movement in display pixels into percentage units.
pub fn display_delta_to_percent(dx: f64, dy: f64, source: &SourceImage) -> Result<(f64, f64), GeometryError> {
    ensure_loaded(source)?;
    Ok((
        dx * FULL / source.display_width,
        dy * FULL / source.display_height,
    ))
}

fn ensure_loaded(source: &SourceImage) -> Result<(), GeometryError> {
    if !usable(source.display_width) || !usable(source.display_height) {
        return Err(GeometryError::InvalidState("display size is zero"));
    }
    if !usable(source.natural_width) || !usable(source.natural_height) {
        return Err(GeometryError::InvalidState("natural size is zero"));
    }
    Ok(())
}

/// Floor one axis. A non-empty span keeps at least one pixel, and float
/// error in start + len can't push it past `max`.
fn floor_span(start: f64, len: f64, max: u32) -> (u32, u32) {
    let mut start_px = floor_px(start);
    let mut len_px = floor_px(len);
    if len > 0.0 && max > 0 {
        start_px = start_px.min(max - 1);
        len_px = len_px.max(1);
    }
    (start_px, len_px.min(max.saturating_sub(start_px)))
}

#[inline]
fn floor_px(v: f64) -> u32 {
    // Tiny epsilon so 33.999999999 from a round trip still floors to 34.
    (v + 1e-9).floor().max(0.0) as u32
}
