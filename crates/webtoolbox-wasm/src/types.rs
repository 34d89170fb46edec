//! WASM-compatible wrapper types and conversion helpers.
//!
//! This module provides the JavaScript-facing raster type and the helpers
//! the bindings share for filters and errors.

use wasm_bindgen::prelude::*;
use webtoolbox_core::decode::{FilterType, RasterSurface, CHANNELS};
use webtoolbox_core::ToolError;

/// An RGBA raster for JavaScript.
///
/// Pixel data lives in WASM memory. `pixels()` copies it out as a
/// `Uint8Array`, ready for `new ImageData(new Uint8ClampedArray(px), w, h)`.
#[wasm_bindgen]
pub struct JsRasterSurface {
    inner: RasterSurface,
}

#[wasm_bindgen]
impl JsRasterSurface {
    /// Wrap RGBA pixels, e.g. from `ctx.getImageData(...).data`.
    ///
    /// # Errors
    ///
    /// Fails if `pixels.length != width * height * 4`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRasterSurface, JsValue> {
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(JsValue::from_str(&format!(
                "Invalid pixel data: expected {} bytes, got {}",
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            inner: RasterSurface::new(width, height, pixels),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

impl JsRasterSurface {
    pub(crate) fn from_surface(inner: RasterSurface) -> Self {
        Self { inner }
    }

    pub(crate) fn surface(&self) -> &RasterSurface {
        &self.inner
    }
}

/// Convert a u8 filter type value to the core FilterType enum.
///
/// Values:
/// - 0 = Nearest (fastest, lowest quality)
/// - 1 = Bilinear (good balance of speed and quality)
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Errors cross the boundary as the user-facing message.
pub(crate) fn js_error(e: impl Into<ToolError>) -> JsValue {
    let e = e.into();
    log::debug!("tool error: {}", e);
    JsValue::from_str(&e.user_message())
}

pub(crate) fn serde_error(e: serde_wasm_bindgen::Error) -> JsValue {
    JsValue::from_str(&format!("Invalid options: {}", e))
}
