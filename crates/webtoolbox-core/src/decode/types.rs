//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The header dimensions exceed the configured pixel budget.
    #[error("Image too large: {width}x{height} exceeds {max_pixels} pixels")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Limits applied before a full decode is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeLimits {
    /// Maximum `width * height` accepted from the image header.
    pub max_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_pixels: 40_000_000,
        }
    }
}

/// An RGBA raster, the in-memory equivalent of a canvas.
///
/// Used both for decoded sources and for compositor output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl RasterSurface {
    /// Create a surface from dimensions and RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Allocate a fully transparent surface.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * CHANNELS],
        }
    }

    /// Allocate a surface filled with a single RGBA colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a surface from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Byte offset of the pixel at `(x, y)`.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Read one RGBA pixel. Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if this is an empty/invalid surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_type_conversion() {
        assert!(matches!(
            FilterType::Nearest.to_image_filter(),
            image::imageops::FilterType::Nearest
        ));
        assert!(matches!(
            FilterType::Bilinear.to_image_filter(),
            image::imageops::FilterType::Triangle
        ));
        assert!(matches!(
            FilterType::Lanczos3.to_image_filter(),
            image::imageops::FilterType::Lanczos3
        ));
    }

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal);
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        assert!(!Orientation::Normal.swaps_dimensions());
        assert!(!Orientation::Rotate180.swaps_dimensions());
        assert!(Orientation::Rotate90CW.swaps_dimensions());
        assert!(Orientation::Rotate270CW.swaps_dimensions());
    }

    #[test]
    fn test_surface_creation() {
        let surface = RasterSurface::transparent(100, 50);
        assert_eq!(surface.pixel_count(), 5000);
        assert_eq!(surface.pixels.len(), 20000);
        assert!(!surface.is_empty());
        assert!(RasterSurface::transparent(0, 0).is_empty());
    }

    #[test]
    fn test_filled_surface_pixel() {
        let surface = RasterSurface::filled(3, 2, [10, 20, 30, 40]);
        assert_eq!(surface.pixel(2, 1), [10, 20, 30, 40]);
        assert_eq!(surface.offset(1, 1), 16);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::TooLarge {
            width: 10,
            height: 10,
            max_pixels: 50,
        };
        assert_eq!(err.to_string(), "Image too large: 10x10 exceeds 50 pixels");
        assert_eq!(
            DecodeError::InvalidFormat.to_string(),
            "Invalid or unsupported image format"
        );
    }

    #[test]
    fn test_decode_limits_from_partial_json() {
        let limits: DecodeLimits = serde_json::from_str("{}").unwrap();
        assert_eq!(limits, DecodeLimits::default());
    }
}
