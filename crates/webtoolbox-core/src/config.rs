//! Per-tool configuration.
//!
//! Each page passes a plain object (or JSON) when it creates a tool. Every
//! field is optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::crop::DEFAULT_MIN_SIZE;
use crate::decode::DecodeLimits;
use crate::encode::ExportOptions;
use crate::geometry::{AspectConstraint, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};

/// Share of the largest fitting rectangle the initial crop covers.
pub const DEFAULT_COVERAGE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    pub decode: DecodeLimits,
    /// Aspect applied when an image loads.
    pub default_aspect: AspectConstraint,
    pub initial_coverage: f64,
    /// Smallest crop edge, in percent of the display.
    pub min_crop_percent: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub export: ExportOptions,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            decode: DecodeLimits::default(),
            default_aspect: AspectConstraint::Free,
            initial_coverage: DEFAULT_COVERAGE,
            min_crop_percent: DEFAULT_MIN_SIZE,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            export: ExportOptions::default(),
        }
    }
}

impl ToolConfig {
    /// Parse a JSON config. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
