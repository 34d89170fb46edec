//! Crop-rectangle state and the aspect presets offered by the crop tools.
//!
//! The controller works purely in percentage space; use
//! [`crate::geometry::to_natural_pixels`] to get the rectangle the compositor
//! copies.

mod controller;

use serde::{Deserialize, Serialize};

use crate::geometry::AspectConstraint;

pub use controller::{CropStateController, ResizeHandle, DEFAULT_MIN_SIZE};

/// Aspect choices shown in the cropper's preset bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectPreset {
    #[default]
    Free,
    Square,
    FourThree,
    ThreeFour,
    SixteenNine,
    NineSixteen,
    ThreeTwo,
    TwoThree,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 8] = [
        AspectPreset::Free,
        AspectPreset::Square,
        AspectPreset::FourThree,
        AspectPreset::ThreeFour,
        AspectPreset::SixteenNine,
        AspectPreset::NineSixteen,
        AspectPreset::ThreeTwo,
        AspectPreset::TwoThree,
    ];

    /// Width and height parts, `None` for free.
    pub fn parts(self) -> Option<(f64, f64)> {
        match self {
            AspectPreset::Free => None,
            AspectPreset::Square => Some((1.0, 1.0)),
            AspectPreset::FourThree => Some((4.0, 3.0)),
            AspectPreset::ThreeFour => Some((3.0, 4.0)),
            AspectPreset::SixteenNine => Some((16.0, 9.0)),
            AspectPreset::NineSixteen => Some((9.0, 16.0)),
            AspectPreset::ThreeTwo => Some((3.0, 2.0)),
            AspectPreset::TwoThree => Some((2.0, 3.0)),
        }
    }

    pub fn constraint(self) -> AspectConstraint {
        self.parts()
            .and_then(|(w, h)| AspectConstraint::from_parts(w, h))
            .unwrap_or(AspectConstraint::Free)
    }

    /// Button label, e.g. "16:9".
    pub fn label(self) -> &'static str {
        match self {
            AspectPreset::Free => "Free",
            AspectPreset::Square => "1:1",
            AspectPreset::FourThree => "4:3",
            AspectPreset::ThreeFour => "3:4",
            AspectPreset::SixteenNine => "16:9",
            AspectPreset::NineSixteen => "9:16",
            AspectPreset::ThreeTwo => "3:2",
            AspectPreset::TwoThree => "2:3",
        }
    }

    /// Parse a label back into a preset, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label))
    }
}
