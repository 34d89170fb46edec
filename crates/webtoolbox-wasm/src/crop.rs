//! Crop tool session bindings.
//!
//! `JsCropTool` owns the selection and the source pixels for one cropper or
//! social-media resizer page. The page feeds it pointer deltas and numeric
//! fields and redraws from `preview()`.
//!
//! # Example
//!
//! ```typescript
//! import { JsCropTool } from '@webtoolbox/wasm';
//!
//! const tool = new JsCropTool({ defaultAspect: { ratio: 1 } });
//! const ticket = tool.begin_load();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! if (tool.finish_load(ticket, bytes, img.width, img.height)) {
//!   const preview = tool.preview();
//!   ctx.putImageData(new ImageData(new Uint8ClampedArray(preview.pixels()), preview.width), 0, 0);
//! }
//! ```

use wasm_bindgen::prelude::*;
use webtoolbox_core::crop::AspectPreset;
use webtoolbox_core::decode::decode_image;
use webtoolbox_core::encode::{EncodedBlob, ExportFormat};
use webtoolbox_core::geometry::{AspectConstraint, CropRect, PixelCropRect};
use webtoolbox_core::session::{CropTool, Ticket, ToolState};
use webtoolbox_core::{ResizeHandle, ToolConfig, ToolError};

use crate::types::{js_error, serde_error, JsRasterSurface};

/// Handle for an in-flight load or export.
#[wasm_bindgen]
pub struct JsTicket {
    inner: Ticket,
}

#[wasm_bindgen]
impl JsTicket {
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.inner.generation().value() as f64
    }
}

#[wasm_bindgen]
pub struct JsCropTool {
    inner: CropTool,
}

#[wasm_bindgen]
impl JsCropTool {
    /// Create a tool. `config` is an optional `ToolConfig` object; missing
    /// fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropTool, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            ToolConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(serde_error)?
        };
        Ok(Self::with_config(config))
    }

    /// `"empty"`, `"loaded"`, `"editing"` or `"exporting"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.state()).to_string()
    }

    pub fn begin_load(&mut self) -> JsTicket {
        JsTicket {
            inner: self.inner.begin_load(),
        }
    }

    /// Decode `bytes` and, if `ticket` is still current, make it the
    /// source. Returns `false` when the ticket was stale.
    pub fn finish_load(
        &mut self,
        ticket: &JsTicket,
        bytes: &[u8],
        display_width: f64,
        display_height: f64,
    ) -> Result<bool, JsValue> {
        if !self.inner.is_current(ticket.inner) {
            log::debug!("Skipping decode for stale load ticket {}", ticket.generation());
            return Ok(false);
        }
        let decoded = decode_image(bytes, &self.inner.config().decode);
        self.inner
            .finish_load(ticket.inner, decoded, (display_width, display_height))
            .map(|applied| !applied.is_stale())
            .map_err(js_error)
    }

    /// `begin_load` and `finish_load` in one call.
    pub fn load(&mut self, bytes: &[u8], display_width: f64, display_height: f64) -> Result<(), JsValue> {
        let ticket = self.begin_load();
        self.finish_load(&ticket, bytes, display_width, display_height).map(|_| ())
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn relayout(&mut self, display_width: f64, display_height: f64) -> Result<(), JsValue> {
        self.inner.relayout(display_width, display_height).map_err(js_error)
    }

    /// Move the selection by a pointer delta in display pixels.
    pub fn drag(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner.drag(dx, dy).map_err(js_error)
    }

    /// `handle` is one of `n s e w ne nw se sw`.
    pub fn resize(&mut self, handle: &str, dx: f64, dy: f64, aspect_locked: bool) -> Result<(), JsValue> {
        let handle = parse_handle(handle).map_err(js_error)?;
        self.inner.resize(handle, dx, dy, aspect_locked).map_err(js_error)
    }

    /// Lock to `ratio` (width / height in pixels). Zero, negative or NaN
    /// ratios are ignored.
    pub fn set_aspect_ratio(&mut self, ratio: f64) -> Result<(), JsValue> {
        match AspectConstraint::ratio(ratio) {
            Some(aspect) => self.inner.set_aspect(aspect).map_err(js_error),
            None => Ok(()),
        }
    }

    pub fn set_free_aspect(&mut self) -> Result<(), JsValue> {
        self.inner.set_aspect(AspectConstraint::Free).map_err(js_error)
    }

    /// Apply a preset by its label: `Free`, `1:1`, `16:9`, ...
    pub fn set_aspect_preset(&mut self, label: &str) -> Result<(), JsValue> {
        let preset = AspectPreset::from_label(label)
            .ok_or_else(|| ToolError::InvalidInput(format!("Unknown aspect preset: {}", label)))
            .map_err(js_error)?;
        self.inner.set_aspect(preset.constraint()).map_err(js_error)
    }

    /// Active ratio, or `undefined` when free.
    #[wasm_bindgen(getter)]
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.inner.aspect().value()
    }

    pub fn center_horizontally(&mut self) -> Result<(), JsValue> {
        self.inner.center_horizontally().map_err(js_error)
    }

    pub fn center_vertically(&mut self) -> Result<(), JsValue> {
        self.inner.center_vertically().map_err(js_error)
    }

    pub fn reset_crop(&mut self) -> Result<(), JsValue> {
        self.inner.reset_crop().map_err(js_error)
    }

    /// Numeric "Pos X / Pos Y / Width / Height" entry in percent.
    pub fn set_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsValue> {
        self.inner.set_rect(CropRect::new(x, y, width, height)).map_err(js_error)
    }

    /// Numeric entry in natural pixels.
    pub fn set_pixel_rect(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner
            .set_pixel_rect(PixelCropRect::new(x, y, width, height))
            .map_err(js_error)
    }

    /// `{x, y, width, height}` in percent, or `undefined` when empty.
    pub fn crop_rect(&self) -> Result<JsValue, JsValue> {
        match self.inner.crop_rect() {
            Some(rect) => serde_wasm_bindgen::to_value(&rect).map_err(serde_error),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// `{x, y, width, height}` in natural pixels.
    pub fn pixel_rect(&self) -> Result<JsValue, JsValue> {
        let rect = self.inner.pixel_rect().map_err(js_error)?;
        serde_wasm_bindgen::to_value(&rect).map_err(serde_error)
    }

    pub fn zoom_by(&mut self, factor: f64) -> Result<(), JsValue> {
        self.inner.zoom_by(factor).map_err(js_error)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), JsValue> {
        self.inner.set_zoom(zoom).map_err(js_error)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner.pan_by(dx, dy).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.view().zoom()
    }

    /// `{zoom, pan: {x, y}, minZoom, maxZoom}`
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.view()).map_err(serde_error)
    }

    pub fn preview(&self) -> Result<JsRasterSurface, JsValue> {
        self.inner.preview().map(JsRasterSurface::from_surface).map_err(js_error)
    }

    /// Enter Exporting before handing the preview to `canvas.toBlob`.
    pub fn begin_export(&mut self) -> Result<JsTicket, JsValue> {
        self.inner
            .begin_export()
            .map(|inner| JsTicket { inner })
            .map_err(js_error)
    }

    /// Report the blob the page encoded. Returns `false` when the ticket
    /// was stale.
    pub fn finish_export(&mut self, ticket: &JsTicket, bytes: Vec<u8>, mime: &str) -> Result<bool, JsValue> {
        let format = parse_format(mime).map_err(js_error)?;
        let blob = EncodedBlob {
            bytes,
            mime: format.mime(),
        };
        self.inner
            .finish_export(ticket.inner, Ok(blob))
            .map(|applied| !applied.is_stale())
            .map_err(js_error)
    }

    /// Render and encode in one step. Returns the encoded bytes; the MIME
    /// type is the one passed in.
    pub fn export_now(&mut self, mime: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
        let format = parse_format(mime).map_err(js_error)?;
        self.inner
            .export_now(format, quality)
            .map(|blob| blob.bytes)
            .map_err(js_error)
    }
}

impl JsCropTool {
    pub(crate) fn with_config(config: ToolConfig) -> Self {
        Self {
            inner: CropTool::new(config),
        }
    }

    #[cfg(test)]
    fn session(&self) -> &CropTool {
        &self.inner
    }
}

fn state_name(state: ToolState) -> &'static str {
    match state {
        ToolState::Empty => "empty",
        ToolState::Loaded => "loaded",
        ToolState::Editing => "editing",
        ToolState::Exporting => "exporting",
    }
}

fn parse_handle(name: &str) -> Result<ResizeHandle, ToolError> {
    ResizeHandle::parse(name).ok_or_else(|| ToolError::InvalidInput(format!("Unknown resize handle: {}", name)))
}

pub(crate) fn parse_format(mime: &str) -> Result<ExportFormat, ToolError> {
    ExportFormat::from_mime(mime).ok_or_else(|| ToolError::InvalidInput(format!("Unsupported export format: {}", mime)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use webtoolbox_core::encode::{export, ExportFormat};
    use webtoolbox_core::RasterSurface;

    fn png(width: u32, height: u32) -> Vec<u8> {
        export(&RasterSurface::filled(width, height, [9, 9, 9, 255]), ExportFormat::Png, 90)
            .unwrap()
            .bytes
    }

    fn square_tool() -> JsCropTool {
        let config = ToolConfig {
            default_aspect: AspectConstraint::Ratio(1.0),
            ..ToolConfig::default()
        };
        JsCropTool::with_config(config)
    }

    #[test]
    fn test_state_names() {
        assert_eq!(state_name(ToolState::Empty), "empty");
        assert_eq!(state_name(ToolState::Exporting), "exporting");
    }

    #[test]
    fn test_load_and_preview() {
        let mut tool = square_tool();
        assert_eq!(tool.state(), "empty");
        tool.load(&png(200, 100), 200.0, 100.0).unwrap();
        assert_eq!(tool.state(), "loaded");

        let preview = tool.preview().unwrap();
        assert_eq!(preview.width(), preview.height());
        assert_eq!(tool.aspect_ratio(), Some(1.0));
    }

    #[test]
    fn test_stale_ticket_returns_false() {
        let mut tool = square_tool();
        let old = tool.begin_load();
        let current = tool.begin_load();
        assert!(!tool.finish_load(&old, &png(10, 10), 10.0, 10.0).unwrap());
        assert!(tool.finish_load(&current, &png(10, 10), 10.0, 10.0).unwrap());
        assert!(current.generation() > old.generation());
    }

    #[test]
    fn test_stale_ticket_skips_decode() {
        let mut tool = square_tool();
        let old = tool.begin_load();
        let current = tool.begin_load();
        // Garbage bytes would fail to decode; a stale ticket never gets that far.
        assert!(!tool.finish_load(&old, &[1, 2, 3, 4], 10.0, 10.0).unwrap());
        assert!(tool.finish_load(&current, &png(10, 10), 10.0, 10.0).unwrap());
        assert!(!tool.finish_load(&current, &[1, 2, 3, 4], 10.0, 10.0).unwrap());
        assert_eq!(tool.state(), "loaded");
    }

    #[test]
    fn test_interactions() {
        let mut tool = square_tool();
        tool.load(&png(200, 100), 200.0, 100.0).unwrap();
        tool.drag(10.0, 0.0).unwrap();
        tool.resize("se", -5.0, -5.0, true).unwrap();
        tool.center_horizontally().unwrap();
        tool.set_aspect_preset("16:9").unwrap();
        tool.set_aspect_ratio(f64::NAN).unwrap();
        assert_eq!(tool.state(), "editing");

        let rect = tool.session().pixel_rect().unwrap();
        let ratio = rect.width as f64 / rect.height as f64;
        assert!((ratio - 16.0 / 9.0).abs() < 0.05, "ratio {}", ratio);
    }

    #[test]
    fn test_free_aspect() {
        let mut tool = square_tool();
        tool.load(&png(50, 50), 50.0, 50.0).unwrap();
        tool.set_free_aspect().unwrap();
        assert_eq!(tool.aspect_ratio(), None);
    }

    #[test]
    fn test_export_cycle() {
        let mut tool = square_tool();
        tool.load(&png(40, 20), 40.0, 20.0).unwrap();
        let ticket = tool.begin_export().unwrap();
        assert_eq!(tool.state(), "exporting");
        assert!(tool.finish_export(&ticket, vec![1, 2, 3], "image/png").unwrap());
        assert_eq!(tool.state(), "loaded");
    }

    #[test]
    fn test_export_now_jpeg() {
        let mut tool = square_tool();
        tool.load(&png(40, 20), 40.0, 20.0).unwrap();
        let bytes = tool.export_now("image/jpeg", 80).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_handle("nw").unwrap(), ResizeHandle::NorthWest);
        assert!(parse_handle("middle").is_err());
        assert_eq!(parse_format("image/webp").unwrap(), ExportFormat::WebP);
        assert!(parse_format("image/tiff").is_err());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_constructor_reads_config_object() {
        let config = js_sys::Object::new();
        let aspect = js_sys::Object::new();
        js_sys::Reflect::set(&aspect, &"ratio".into(), &JsValue::from_f64(1.5)).unwrap();
        js_sys::Reflect::set(&config, &"defaultAspect".into(), &aspect).unwrap();

        let tool = JsCropTool::new(config.into()).unwrap();
        assert_eq!(tool.session().config().default_aspect, AspectConstraint::Ratio(1.5));
    }

    #[wasm_bindgen_test]
    fn test_constructor_accepts_undefined() {
        let tool = JsCropTool::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(tool.state(), "empty");
    }

    #[wasm_bindgen_test]
    fn test_interaction_before_load_is_rejected() {
        let mut tool = JsCropTool::new(JsValue::UNDEFINED).unwrap();
        let err = tool.drag(1.0, 1.0).unwrap_err();
        assert_eq!(err.as_string().unwrap(), "Please upload an image first.");
    }

    #[wasm_bindgen_test]
    fn test_crop_rect_shape() {
        let mut tool = JsCropTool::new(JsValue::UNDEFINED).unwrap();
        assert!(tool.crop_rect().unwrap().is_undefined());
        let png = webtoolbox_core::encode::export(
            &webtoolbox_core::RasterSurface::filled(10, 10, [0, 0, 0, 255]),
            ExportFormat::Png,
            90,
        )
        .unwrap();
        tool.load(&png.bytes, 10.0, 10.0).unwrap();
        let rect = tool.crop_rect().unwrap();
        let width = js_sys::Reflect::get(&rect, &"width".into()).unwrap();
        assert!((width.as_f64().unwrap() - 80.0).abs() < 1e-9);
    }
}
