//! Preview compositor: turns a source raster and a pixel crop into the
//! surface shown in the live preview and handed to export.
//!
//! # Pipeline
//!
//! 1. Copy the crop region from the source at 1:1 ([`render`])
//! 2. Apply post-process steps in order ([`PostProcess`]): rotated overlay
//!    stamps (watermark text) and colour washes
//! 3. Optionally rescale to a fixed output size ([`render_scaled`])
//!
//! The same functions serve preview and export, so what the user sees is
//! exactly what gets downloaded.

mod render;
mod resize;
mod stamp;

use thiserror::Error;

pub use render::{render, render_scaled, render_with};
pub use resize::{fit_dimensions, resize, resize_to_fit, SocialPreset};
pub use stamp::{apply_stamp, apply_tint, rotated_bounds, Mask, Stamp};

/// Errors that can occur while compositing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// The crop region has no pixels inside the source.
    #[error("Crop region is empty")]
    EmptyRegion,

    /// A target or mask size is zero or doesn't match its buffer.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// A step applied after the base copy, before the surface is finalised.
#[derive(Debug, Clone, PartialEq)]
pub enum PostProcess {
    /// Composite a rotated, tinted coverage mask.
    Stamp(Stamp),
    /// Wash the whole surface with a colour.
    Tint { color: [u8; 3], opacity: f32 },
}

impl PostProcess {
    pub(crate) fn apply(&self, surface: &mut crate::decode::RasterSurface) {
        match self {
            PostProcess::Stamp(stamp) => apply_stamp(surface, stamp),
            PostProcess::Tint { color, opacity } => apply_tint(surface, *color, *opacity),
        }
    }
}
