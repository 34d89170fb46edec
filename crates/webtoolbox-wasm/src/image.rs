//! Stateless image bindings: decode, crop, resize, watermark and export.
//!
//! These back the single-shot tools (converter, resizer, watermark) that
//! don't need a crop session.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, resize_to_preset, export_surface } from '@webtoolbox/wasm';
//!
//! const source = decode_image(new Uint8Array(await file.arrayBuffer()), config.decode?.maxPixels);
//! const story = resize_to_preset(source, 'instagram-story', 2);
//! const bytes = export_surface(story, 'image/jpeg', 90);
//! ```

use wasm_bindgen::prelude::*;
use webtoolbox_core::compositor::{self, Mask, PostProcess, SocialPreset, Stamp};
use webtoolbox_core::decode::{self, DecodeLimits};
use webtoolbox_core::encode;
use webtoolbox_core::geometry::PixelCropRect;
use webtoolbox_core::ToolError;

use crate::crop::parse_format;
use crate::types::{filter_from_u8, js_error, serde_error, JsRasterSurface};

/// Decode PNG, JPEG, WebP, GIF or BMP bytes into RGBA, applying EXIF
/// orientation.
///
/// `max_pixels` is the tool's `decode.maxPixels` budget; leave it
/// `undefined` for the default.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8], max_pixels: Option<f64>) -> Result<JsRasterSurface, JsValue> {
    decode::decode_image(bytes, &limits(max_pixels))
        .map(JsRasterSurface::from_surface)
        .map_err(js_error)
}

/// `[width, height]` from the file header, after EXIF orientation and
/// without decoding.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    decode::display_dimensions(bytes)
        .map(|(w, h)| vec![w, h])
        .map_err(js_error)
}

/// Copy a natural-pixel region of `image`.
#[wasm_bindgen]
pub fn render_crop(image: &JsRasterSurface, x: u32, y: u32, width: u32, height: u32) -> Result<JsRasterSurface, JsValue> {
    compositor::render(image.surface(), &PixelCropRect::new(x, y, width, height))
        .map(JsRasterSurface::from_surface)
        .map_err(js_error)
}

/// Resize to exact dimensions. Filter: 0 = Nearest, 1 = Bilinear, 2 = Lanczos3.
#[wasm_bindgen]
pub fn resize(image: &JsRasterSurface, width: u32, height: u32, filter: u8) -> Result<JsRasterSurface, JsValue> {
    compositor::resize(image.surface(), width, height, filter_from_u8(filter))
        .map(JsRasterSurface::from_surface)
        .map_err(js_error)
}

/// Resize so the longest edge is at most `max_edge`.
#[wasm_bindgen]
pub fn resize_to_fit(image: &JsRasterSurface, max_edge: u32, filter: u8) -> Result<JsRasterSurface, JsValue> {
    compositor::resize_to_fit(image.surface(), max_edge, filter_from_u8(filter))
        .map(JsRasterSurface::from_surface)
        .map_err(js_error)
}

/// Resize to a social-media preset such as `instagram-post` or
/// `youtube-thumbnail`.
#[wasm_bindgen]
pub fn resize_to_preset(image: &JsRasterSurface, preset: &str, filter: u8) -> Result<JsRasterSurface, JsValue> {
    let preset = parse_preset(preset).map_err(js_error)?;
    let (width, height) = preset.dimensions();
    compositor::resize(image.surface(), width, height, filter_from_u8(filter))
        .map(JsRasterSurface::from_surface)
        .map_err(js_error)
}

/// All social presets as `[{id, label, width, height}]`.
#[wasm_bindgen]
pub fn social_presets() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&preset_table()).map_err(serde_error)
}

/// Stamp a watermark onto a copy of `image`.
///
/// `mask` is the text drawn on an offscreen canvas; only its alpha channel
/// is used. The stamp is centred at (`center_x`, `center_y`), rotated by
/// `angle_degrees` counter-clockwise and tinted `#rrggbb` at `opacity`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn apply_watermark(
    image: &JsRasterSurface,
    mask: &JsRasterSurface,
    center_x: f64,
    center_y: f64,
    angle_degrees: f64,
    color: &str,
    opacity: f32,
) -> Result<JsRasterSurface, JsValue> {
    let stamp = Stamp {
        mask: Mask::from_alpha(mask.surface()).map_err(js_error)?,
        center_x,
        center_y,
        angle_degrees,
        color: parse_hex_color(color).map_err(js_error)?,
        opacity,
    };
    let source = image.surface();
    compositor::render_with(
        source,
        &PixelCropRect::new(0, 0, source.width, source.height),
        &[PostProcess::Stamp(stamp)],
    )
    .map(JsRasterSurface::from_surface)
    .map_err(js_error)
}

/// Encode for download. `mime` is `image/png`, `image/jpeg` or
/// `image/webp`; `quality` (1-100) applies to JPEG.
#[wasm_bindgen]
pub fn export_surface(image: &JsRasterSurface, mime: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format = parse_format(mime).map_err(js_error)?;
    encode::export(image.surface(), format, quality)
        .map(|blob| blob.bytes)
        .map_err(js_error)
}

#[derive(serde::Serialize)]
struct PresetInfo {
    id: SocialPreset,
    label: &'static str,
    width: u32,
    height: u32,
}

fn preset_table() -> Vec<PresetInfo> {
    SocialPreset::ALL
        .into_iter()
        .map(|preset| {
            let (width, height) = preset.dimensions();
            PresetInfo {
                id: preset,
                label: preset.label(),
                width,
                height,
            }
        })
        .collect()
}

fn limits(max_pixels: Option<f64>) -> DecodeLimits {
    match max_pixels {
        Some(max) if max.is_finite() && max >= 1.0 => DecodeLimits {
            max_pixels: max as u64,
        },
        _ => DecodeLimits::default(),
    }
}

fn parse_preset(id: &str) -> Result<SocialPreset, ToolError> {
    SocialPreset::from_id(id).ok_or_else(|| ToolError::InvalidInput(format!("Unknown preset: {}", id)))
}

/// `#rrggbb` or `rrggbb`.
fn parse_hex_color(color: &str) -> Result<[u8; 3], ToolError> {
    let invalid = || ToolError::InvalidInput(format!("Invalid colour: {}", color));
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
