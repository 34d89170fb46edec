//! Zoom and pan of the editing viewport.
//!
//! Purely presentational: nothing here feeds into `PixelCropRect`.

use serde::{Deserialize, Serialize};

use super::usable;

pub const DEFAULT_MIN_ZOOM: f64 = 0.5;
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;

/// Pan offset in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

/// Viewport transform applied to the image element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    zoom: f64,
    pan: Pan,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

impl ViewState {
    /// Create a view at zoom 1.0 with the given limits.
    ///
    /// Swapped or invalid limits fall back to the defaults.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        let (min_zoom, max_zoom) = if usable(min_zoom) && usable(max_zoom) && min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
        };
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Pan::default(),
            min_zoom,
            max_zoom,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Set an absolute zoom, clamped to the limits. Invalid values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if usable(zoom) {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Multiply the zoom (wheel / pinch). Invalid factors are ignored.
    pub fn zoom_by(&mut self, factor: f64) {
        if usable(factor) {
            self.set_zoom(self.zoom * factor);
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.pan.x += dx;
            self.pan.y += dy;
        }
    }

    /// Back to zoom 1.0 and no pan, keeping the limits.
    pub fn reset(&mut self) {
        *self = Self::new(self.min_zoom, self.max_zoom);
    }
}
