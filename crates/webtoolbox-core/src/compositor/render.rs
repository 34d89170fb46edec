//! Region copy from a source raster onto a fresh output surface.

use super::{resize, CompositeError, PostProcess};
use crate::decode::{FilterType, RasterSurface, CHANNELS};
use crate::geometry::PixelCropRect;

/// Copy the crop region of `source` onto a new surface at 1:1 scale.
///
/// The output is exactly `rect.width x rect.height` whenever the rectangle
/// lies inside the source, which [`crate::geometry::to_natural_pixels`]
/// guarantees. A rectangle that runs past the source edge is clamped.
///
/// # Errors
///
/// Returns `CompositeError::EmptyRegion` if no pixel of the rectangle lies
/// inside the source.
pub fn render(source: &RasterSurface, rect: &PixelCropRect) -> Result<RasterSurface, CompositeError> {
    if source.is_empty() || rect.is_empty() || rect.x >= source.width || rect.y >= source.height {
        return Err(CompositeError::EmptyRegion);
    }

    let out_width = rect.width.min(source.width - rect.x);
    let out_height = rect.height.min(source.height - rect.y);

    // Fast path: whole image
    if rect.x == 0 && rect.y == 0 && out_width == source.width && out_height == source.height {
        return Ok(source.clone());
    }

    let row_bytes = out_width as usize * CHANNELS;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in 0..out_height {
        let start = source.offset(rect.x, rect.y + y);
        output.extend_from_slice(&source.pixels[start..start + row_bytes]);
    }

    Ok(RasterSurface::new(out_width, out_height, output))
}

/// [`render`] followed by post-process steps, applied in order.
pub fn render_with(
    source: &RasterSurface,
    rect: &PixelCropRect,
    steps: &[PostProcess],
) -> Result<RasterSurface, CompositeError> {
    let mut surface = render(source, rect)?;
    for step in steps {
        step.apply(&mut surface);
    }
    Ok(surface)
}

/// [`render`] then rescale to a fixed output size (social-media presets).
pub fn render_scaled(
    source: &RasterSurface,
    rect: &PixelCropRect,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterSurface, CompositeError> {
    let surface = render(source, rect)?;
    resize(&surface, width, height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test surface where each pixel encodes its own position.
    fn test_surface(width: u32, height: u32) -> RasterSurface {
        let mut pixels = Vec::with_capacity((width * height) as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, ((y * width + x) % 256) as u8, 255]);
            }
        }
        RasterSurface::new(width, height, pixels)
    }

    #[test]
    fn test_full_render_is_identity() {
        let src = test_surface(20, 10);
        let out = render(&src, &PixelCropRect::new(0, 0, 20, 10)).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_region_dimensions_and_origin() {
        let src = test_surface(50, 40);
        let out = render(&src, &PixelCropRect::new(7, 3, 20, 11)).unwrap();
        assert_eq!((out.width, out.height), (20, 11));
        assert_eq!(out.pixel(0, 0)[..2], [7, 3]);
        assert_eq!(out.pixel(19, 10)[..2], [26, 13]);
    }

    #[test]
    fn test_overflowing_region_is_clamped() {
        let src = test_surface(10, 10);
        let out = render(&src, &PixelCropRect::new(8, 8, 5, 5)).unwrap();
        assert_eq!((out.width, out.height), (2, 2));
    }

    #[test]
    fn test_empty_region_errors() {
        let src = test_surface(10, 10);
        assert_eq!(
            render(&src, &PixelCropRect::new(0, 0, 0, 5)),
            Err(CompositeError::EmptyRegion)
        );
        assert_eq!(
            render(&src, &PixelCropRect::new(10, 0, 5, 5)),
            Err(CompositeError::EmptyRegion)
        );
        assert!(render(&RasterSurface::transparent(0, 0), &PixelCropRect::new(0, 0, 1, 1)).is_err());
    }

    #[test]
    fn test_render_with_tint() {
        let src = RasterSurface::filled(4, 4, [0, 0, 0, 255]);
        let steps = [PostProcess::Tint {
            color: [255, 255, 255],
            opacity: 1.0,
        }];
        let out = render_with(&src, &PixelCropRect::new(1, 1, 2, 2), &steps).unwrap();
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_scaled() {
        let src = test_surface(40, 40);
        let out = render_scaled(&src, &PixelCropRect::new(0, 0, 20, 10), 100, 50, FilterType::Bilinear).unwrap();
        assert_eq!((out.width, out.height), (100, 50));
    }
}
