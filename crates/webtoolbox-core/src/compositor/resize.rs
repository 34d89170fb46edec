//! Output resizing for the resizer and social-media tools.
//!
//! Provides resize operations using the `image` crate's algorithms.
//! All functions return new surfaces without modifying the input.

use serde::{Deserialize, Serialize};

use super::CompositeError;
use crate::decode::{FilterType, RasterSurface};
use crate::geometry::AspectConstraint;

/// Resize a surface to exact dimensions.
///
/// # Errors
///
/// Returns `CompositeError::InvalidDimensions` for a zero target size or a
/// surface whose buffer doesn't match its dimensions.
pub fn resize(
    surface: &RasterSurface,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterSurface, CompositeError> {
    if width == 0 || height == 0 {
        return Err(CompositeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if surface.width == width && surface.height == height {
        return Ok(surface.clone());
    }

    let rgba = surface.to_rgba_image().ok_or(CompositeError::InvalidDimensions {
        width: surface.width,
        height: surface.height,
    })?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(RasterSurface::from_rgba_image(resized))
}

/// Resize so the longest edge is at most `max_edge`, preserving aspect
/// ratio. Surfaces that already fit are returned unchanged.
pub fn resize_to_fit(
    surface: &RasterSurface,
    max_edge: u32,
    filter: FilterType,
) -> Result<RasterSurface, CompositeError> {
    if max_edge == 0 {
        return Err(CompositeError::InvalidDimensions {
            width: max_edge,
            height: max_edge,
        });
    }

    if surface.width <= max_edge && surface.height <= max_edge {
        return Ok(surface.clone());
    }

    let (new_width, new_height) = fit_dimensions(surface.width, surface.height, max_edge);
    resize(surface, new_width, new_height, filter)
}

/// Dimensions that fit within `max_edge` while preserving aspect ratio.
pub fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

/// Fixed output sizes offered by the social-media resizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocialPreset {
    InstagramPost,
    InstagramStory,
    FacebookCover,
    TwitterHeader,
    YoutubeThumbnail,
    LinkedinBanner,
}

impl SocialPreset {
    pub const ALL: [SocialPreset; 6] = [
        SocialPreset::InstagramPost,
        SocialPreset::InstagramStory,
        SocialPreset::FacebookCover,
        SocialPreset::TwitterHeader,
        SocialPreset::YoutubeThumbnail,
        SocialPreset::LinkedinBanner,
    ];

    /// Output width and height in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            SocialPreset::InstagramPost => (1080, 1080),
            SocialPreset::InstagramStory => (1080, 1920),
            SocialPreset::FacebookCover => (820, 312),
            SocialPreset::TwitterHeader => (1500, 500),
            SocialPreset::YoutubeThumbnail => (1280, 720),
            SocialPreset::LinkedinBanner => (1584, 396),
        }
    }

    /// Stable identifier, the same string serde uses.
    pub fn id(self) -> &'static str {
        match self {
            SocialPreset::InstagramPost => "instagram-post",
            SocialPreset::InstagramStory => "instagram-story",
            SocialPreset::FacebookCover => "facebook-cover",
            SocialPreset::TwitterHeader => "twitter-header",
            SocialPreset::YoutubeThumbnail => "youtube-thumbnail",
            SocialPreset::LinkedinBanner => "linkedin-banner",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.id() == id.trim())
    }

    /// Crop lock matching the output shape.
    pub fn aspect(self) -> AspectConstraint {
        let (w, h) = self.dimensions();
        AspectConstraint::from_parts(w as f64, h as f64).unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            SocialPreset::InstagramPost => "Instagram Post",
            SocialPreset::InstagramStory => "Instagram Story",
            SocialPreset::FacebookCover => "Facebook Cover",
            SocialPreset::TwitterHeader => "Twitter Header",
            SocialPreset::YoutubeThumbnail => "YouTube Thumbnail",
            SocialPreset::LinkedinBanner => "LinkedIn Banner",
        }
    }
}
