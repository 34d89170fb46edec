//! Surface export to PNG, JPEG and WebP.
//!
//! JPEG has no alpha channel, so surfaces are flattened onto a background
//! colour first. PNG and WebP are written lossless and keep transparency.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{RasterSurface, CHANNELS};

/// Default JPEG quality, matching the canvas `toBlob` default in most browsers.
pub const DEFAULT_QUALITY: u8 = 92;

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output container for a downloaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    #[serde(rename = "webp")]
    WebP,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Parse a MIME type from a format `<select>`. Parameters after `;` are
    /// ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(ExportFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ExportFormat::Jpeg),
            "image/webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, ExportFormat::Jpeg)
    }
}

/// Export settings carried in the tool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// 1-100, JPEG only.
    pub quality: u8,
    /// Colour transparent pixels are flattened onto for JPEG.
    pub background: [u8; 3],
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: DEFAULT_QUALITY,
            background: [0, 0, 0],
        }
    }
}

/// Encoded bytes ready to become a `Blob`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBlob {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl EncodedBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode a surface with the default JPEG background.
///
/// `quality` is clamped to 1-100 and only affects JPEG.
pub fn export(
    surface: &RasterSurface,
    format: ExportFormat,
    quality: u8,
) -> Result<EncodedBlob, EncodeError> {
    export_with(
        surface,
        &ExportOptions {
            format,
            quality,
            ..ExportOptions::default()
        },
    )
}

/// Encode a surface using every field of `options`.
///
/// # Errors
///
/// - `EncodeError::InvalidDimensions` for a zero-sized surface
/// - `EncodeError::InvalidPixelData` if the buffer length is wrong
/// - `EncodeError::EncodingFailed` if the codec fails
pub fn export_with(surface: &RasterSurface, options: &ExportOptions) -> Result<EncodedBlob, EncodeError> {
    let (width, height) = (surface.width, surface.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * CHANNELS;
    if surface.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: surface.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let result = match options.format {
        ExportFormat::Png => PngEncoder::new(&mut buffer).write_image(
            &surface.pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::WebP => WebPEncoder::new_lossless(&mut buffer).write_image(
            &surface.pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb = flatten(&surface.pixels, options.background);
            JpegEncoder::new_with_quality(&mut buffer, options.quality.clamp(1, 100)).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    log::info!(
        "Exported {}x{} surface as {} ({} bytes)",
        width,
        height,
        options.format.mime(),
        bytes.len()
    );
    Ok(EncodedBlob {
        bytes,
        mime: options.format.mime(),
    })
}

/// Composite RGBA over an opaque background, producing RGB.
fn flatten(rgba: &[u8], background: [u8; 3]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / CHANNELS * 3);
    for px in rgba.chunks_exact(CHANNELS) {
        let a = px[3] as u32;
        for c in 0..3 {
            let v = (px[c] as u32 * a + background[c] as u32 * (255 - a) + 127) / 255;
            rgb.push(v as u8);
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
