//! Interactive crop state: drag, resize handles, aspect lock, centring.
//!
//! All operations are in-memory transforms of a [`CropRect`]. None of them
//! can fail; out-of-range or non-finite input is clamped or ignored.
//!
//! # Aspect Ratios
//!
//! An [`AspectConstraint`] is expressed in natural pixels (a 1:1 lock means a
//! square output file). Percentage space is stretched by the source aspect,
//! so internally the lock is converted with
//!
//! ```text
//! width% / height% = R * natural_height / natural_width
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::{
    to_percentage, usable, AspectConstraint, CropRect, GeometryError, PixelCropRect, SourceImage, FULL,
};

/// Smallest width/height (in percent) a resize may produce.
pub const DEFAULT_MIN_SIZE: f64 = 1.0;

/// A drag handle on the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "se")]
    SouthEast,
    #[serde(rename = "sw")]
    SouthWest,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::North,
        ResizeHandle::South,
        ResizeHandle::East,
        ResizeHandle::West,
        ResizeHandle::NorthEast,
        ResizeHandle::NorthWest,
        ResizeHandle::SouthEast,
        ResizeHandle::SouthWest,
    ];

    /// Parse the short names used by the page ("n", "se", ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "n" => Some(Self::North),
            "s" => Some(Self::South),
            "e" => Some(Self::East),
            "w" => Some(Self::West),
            "ne" => Some(Self::NorthEast),
            "nw" => Some(Self::NorthWest),
            "se" => Some(Self::SouthEast),
            "sw" => Some(Self::SouthWest),
            _ => None,
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    /// Top or bottom edge only; under an aspect lock height drives width.
    fn is_vertical_only(self) -> bool {
        matches!(self, Self::North | Self::South)
    }
}

/// The fixed point a resize grows away from, on one axis.
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Start(f64),
    End(f64),
    Center(f64),
}

impl Anchor {
    fn horizontal(handle: ResizeHandle, rect: &CropRect) -> Self {
        if handle.moves_right() {
            Anchor::Start(rect.x)
        } else if handle.moves_left() {
            Anchor::End(rect.right())
        } else {
            Anchor::Center(rect.center().0)
        }
    }

    fn vertical(handle: ResizeHandle, rect: &CropRect) -> Self {
        if handle.moves_bottom() {
            Anchor::Start(rect.y)
        } else if handle.moves_top() {
            Anchor::End(rect.bottom())
        } else {
            Anchor::Center(rect.center().1)
        }
    }

    /// Largest extent that keeps the anchor fixed and stays inside [0, 100].
    fn room(self) -> f64 {
        match self {
            Anchor::Start(a) => FULL - a,
            Anchor::End(b) => b,
            Anchor::Center(c) => 2.0 * c.min(FULL - c),
        }
        .max(0.0)
    }

    fn origin(self, extent: f64) -> f64 {
        match self {
            Anchor::Start(a) => a,
            Anchor::End(b) => b - extent,
            Anchor::Center(c) => c - extent / 2.0,
        }
    }
}

/// Owns the crop rectangle and its aspect lock for one tool instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CropStateController {
    rect: CropRect,
    aspect: AspectConstraint,
    source_aspect: f64,
    min_size: f64,
    /// One natural pixel per axis, in percent. Zero until a source is known.
    pixel_floor: (f64, f64),
}

impl CropStateController {
    /// Full-image crop for a source with the given natural width / height.
    ///
    /// An unusable aspect is treated as square.
    pub fn new(source_aspect: f64) -> Self {
        Self {
            rect: CropRect::full(),
            aspect: AspectConstraint::Free,
            source_aspect: if usable(source_aspect) { source_aspect } else { 1.0 },
            min_size: DEFAULT_MIN_SIZE,
            pixel_floor: (0.0, 0.0),
        }
    }

    /// Initial state after an image loads: a centred rectangle of the default
    /// aspect covering `coverage` (0-1] of the largest rectangle that fits.
    pub fn for_source(source: &SourceImage, default_aspect: AspectConstraint, coverage: f64) -> Self {
        let mut controller = Self::new(source.natural_aspect().unwrap_or(1.0));
        if usable(source.natural_width) && usable(source.natural_height) {
            controller.pixel_floor = (
                (FULL / source.natural_width).min(FULL),
                (FULL / source.natural_height).min(FULL),
            );
        }
        controller.set_aspect(default_aspect);
        if controller.aspect.is_free() {
            controller.rect = CropRect::full();
        }

        let coverage = if usable(coverage) { coverage.min(1.0) } else { 1.0 };
        let (cx, cy) = controller.rect.center();
        let width = controller.rect.width * coverage;
        let height = controller.rect.height * coverage;
        controller.rect = CropRect::new(cx - width / 2.0, cy - height / 2.0, width, height).clamped();
        controller
    }

    /// Override the smallest size a resize may shrink to.
    pub fn with_min_size(mut self, min_size: f64) -> Self {
        if usable(min_size) {
            self.min_size = min_size.min(FULL);
        }
        self
    }

    pub fn rect(&self) -> CropRect {
        self.rect
    }

    pub fn aspect(&self) -> AspectConstraint {
        self.aspect
    }

    pub fn source_aspect(&self) -> f64 {
        self.source_aspect
    }

    /// Set or clear the aspect lock.
    ///
    /// A concrete ratio immediately reflows the rectangle to the largest
    /// centred rectangle of that ratio. `Free` keeps the current rectangle.
    /// Invalid ratios are ignored.
    pub fn set_aspect(&mut self, aspect: AspectConstraint) {
        match aspect {
            AspectConstraint::Free => self.aspect = AspectConstraint::Free,
            AspectConstraint::Ratio(r) => {
                if !usable(r) {
                    log::debug!("ignoring invalid aspect ratio {}", r);
                    return;
                }
                self.aspect = aspect;
                self.rect = self.largest_centered(self.percent_ratio(r));
            }
        }
    }

    /// Raw numeric entry point for [`set_aspect`](Self::set_aspect).
    pub fn set_aspect_ratio(&mut self, ratio: f64) {
        if let Some(aspect) = AspectConstraint::ratio(ratio) {
            self.set_aspect(aspect);
        }
    }

    /// Translate the rectangle by a percentage delta, clamped to bounds.
    pub fn apply_drag(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let rect = self.rect;
        self.rect = CropRect::new(
            (rect.x + dx).clamp(0.0, FULL - rect.width),
            (rect.y + dy).clamp(0.0, FULL - rect.height),
            rect.width,
            rect.height,
        );
    }

    /// Move one handle by a percentage delta.
    ///
    /// The opposite edge (or corner) stays fixed. When `aspect_locked` is set
    /// the dimension not being dragged is recomputed from the active ratio:
    /// width drives height, except for the top/bottom handles where height
    /// drives width. Without an active ratio the current rectangle's shape is
    /// locked instead. The result is shrunk as needed to stay inside bounds.
    pub fn apply_resize(&mut self, handle: ResizeHandle, dx: f64, dy: f64, aspect_locked: bool) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let rect = self.rect;

        let mut width = rect.width;
        if handle.moves_right() {
            width += dx;
        } else if handle.moves_left() {
            width -= dx;
        }
        let mut height = rect.height;
        if handle.moves_bottom() {
            height += dy;
        } else if handle.moves_top() {
            height -= dy;
        }

        let h_anchor = Anchor::horizontal(handle, &rect);
        let v_anchor = Anchor::vertical(handle, &rect);
        let room_w = h_anchor.room();
        let room_h = v_anchor.room();

        let ratio = if aspect_locked { self.locked_ratio() } else { None };
        let (width, height) = match ratio {
            Some(r) => {
                let driven = if handle.is_vertical_only() { height * r } else { width };
                let max_w = room_w.min(room_h * r);
                let min_w = self.min_width().max(self.min_height() * r).min(max_w);
                let w = driven.clamp(min_w, max_w);
                (w, w / r)
            }
            None => {
                let w = if handle.moves_left() || handle.moves_right() {
                    width.clamp(self.min_width().min(room_w), room_w)
                } else {
                    rect.width
                };
                let h = if handle.moves_top() || handle.moves_bottom() {
                    height.clamp(self.min_height().min(room_h), room_h)
                } else {
                    rect.height
                };
                (w, h)
            }
        };

        self.rect = CropRect::new(h_anchor.origin(width), v_anchor.origin(height), width, height).clamped();
    }

    /// `x = (100 - width) / 2`.
    pub fn center_horizontally(&mut self) {
        self.rect.x = (FULL - self.rect.width) / 2.0;
    }

    /// `y = (100 - height) / 2`.
    pub fn center_vertically(&mut self) {
        self.rect.y = (FULL - self.rect.height) / 2.0;
    }

    /// Replace the rectangle from numeric entry.
    ///
    /// The rectangle is clamped; under an aspect lock the height is derived
    /// from the width and both shrink if that would overflow the bottom edge.
    /// Sizes below the minimum grow to it, shifting the origin if needed.
    pub fn set_rect(&mut self, rect: CropRect) {
        let rect = rect.clamped();
        let (min_w, min_h) = (self.min_width(), self.min_height());
        self.rect = match self.aspect.value().map(|r| self.percent_ratio(r)) {
            Some(r) => {
                let mut width = rect.width;
                let mut height = width / r;
                if rect.y + height > FULL {
                    height = FULL - rect.y;
                    width = height * r;
                }
                let max_w = FULL.min(FULL * r);
                let floor_w = min_w.max(min_h * r).min(max_w);
                if width < floor_w {
                    width = floor_w;
                    height = width / r;
                }
                CropRect::new(rect.x, rect.y, width, height).clamped()
            }
            None => CropRect::new(rect.x, rect.y, rect.width.max(min_w), rect.height.max(min_h)).clamped(),
        };
    }

    /// Replace the rectangle from exact natural-pixel values.
    pub fn set_pixel_rect(&mut self, rect: &PixelCropRect, source: &SourceImage) -> Result<(), GeometryError> {
        let crop = to_percentage(rect, source)?;
        self.set_rect(crop);
        Ok(())
    }

    /// Back to the whole image, reflowed to the active aspect.
    pub fn reset(&mut self) {
        self.rect = match self.aspect.value() {
            Some(r) => self.largest_centered(self.percent_ratio(r)),
            None => CropRect::full(),
        };
    }

    fn min_width(&self) -> f64 {
        self.min_size.max(self.pixel_floor.0)
    }

    fn min_height(&self) -> f64 {
        self.min_size.max(self.pixel_floor.1)
    }

    /// Ratio used by a locked resize, in percentage space.
    fn locked_ratio(&self) -> Option<f64> {
        match self.aspect.value() {
            Some(r) => Some(self.percent_ratio(r)),
            None if self.rect.width > 0.0 && self.rect.height > 0.0 => {
                Some(self.rect.width / self.rect.height)
            }
            None => None,
        }
    }

    fn percent_ratio(&self, pixel_ratio: f64) -> f64 {
        pixel_ratio / self.source_aspect
    }

    fn largest_centered(&self, percent_ratio: f64) -> CropRect {
        let (width, height) = if percent_ratio >= 1.0 {
            (FULL, FULL / percent_ratio)
        } else {
            (FULL * percent_ratio, FULL)
        };
        CropRect::new((FULL - width) / 2.0, (FULL - height) / 2.0, width, height)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Drag(f64, f64),
        Resize(ResizeHandle, f64, f64),
        CenterH,
        CenterV,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-150.0f64..=150.0, -150.0f64..=150.0).prop_map(|(dx, dy)| Op::Drag(dx, dy)),
            (0usize..8, -150.0f64..=150.0, -150.0f64..=150.0)
                .prop_map(|(i, dx, dy)| Op::Resize(ResizeHandle::ALL[i], dx, dy)),
            Just(Op::CenterH),
            Just(Op::CenterV),
        ]
    }

    fn apply(c: &mut CropStateController, op: &Op, locked: bool) {
        match *op {
            Op::Drag(dx, dy) => c.apply_drag(dx, dy),
            Op::Resize(h, dx, dy) => c.apply_resize(h, dx, dy, locked),
            Op::CenterH => c.center_horizontally(),
            Op::CenterV => c.center_vertically(),
        }
    }

    proptest! {
        /// Property: Under an aspect lock the natural-pixel ratio survives
        /// any sequence of drags and locked resizes.
        #[test]
        fn prop_locked_ratio_preserved(
            (w, h) in (1u32..=5000, 1u32..=5000),
            ratio in 0.1f64..=10.0,
            ops in prop::collection::vec(op_strategy(), 1..30),
        ) {
            let mut c = CropStateController::new(w as f64 / h as f64);
            c.set_aspect(AspectConstraint::Ratio(ratio));
            for op in &ops {
                apply(&mut c, op, true);
                let rect = c.rect();
                let got = rect.width / rect.height * c.source_aspect();
                prop_assert!(
                    (got - ratio).abs() <= ratio * 1e-6,
                    "ratio drifted to {} (wanted {}) after {:?}", got, ratio, op
                );
            }
        }

        /// Property: Drag never leaves the [0, 100] box.
        #[test]
        fn prop_drag_stays_in_bounds(
            (x, y, w, h) in (0.0f64..=100.0, 0.0f64..=100.0, 0.0f64..=100.0, 0.0f64..=100.0),
            (dx, dy) in (-500.0f64..=500.0, -500.0f64..=500.0),
        ) {
            let mut c = CropStateController::new(1.5);
            c.set_rect(CropRect::new(x, y, w, h));
            c.apply_drag(dx, dy);
            let rect = c.rect();
            prop_assert!(rect.x >= 0.0 && rect.y >= 0.0);
            prop_assert!(rect.right() <= FULL + 1e-9 && rect.bottom() <= FULL + 1e-9);
        }

        /// Property: Every operation keeps the rectangle within bounds.
        #[test]
        fn prop_any_op_stays_in_bounds(
            ops in prop::collection::vec(op_strategy(), 1..30),
            locked in any::<bool>(),
        ) {
            let mut c = CropStateController::new(0.75);
            for op in &ops {
                apply(&mut c, op, locked);
                prop_assert!(c.rect().is_within_bounds(), "{:?} after {:?}", c.rect(), op);
            }
        }

        /// Property: set_aspect always yields a centred, maximal rectangle.
        #[test]
        fn prop_set_aspect_centered_and_maximal(
            (w, h) in (1u32..=5000, 1u32..=5000),
            ratio in 0.05f64..=20.0,
        ) {
            let mut c = CropStateController::new(w as f64 / h as f64);
            c.set_aspect(AspectConstraint::Ratio(ratio));
            let rect = c.rect();
            prop_assert!(rect.is_within_bounds());
            prop_assert!((rect.x - (FULL - rect.width) / 2.0).abs() < 1e-9);
            prop_assert!((rect.y - (FULL - rect.height) / 2.0).abs() < 1e-9);
            prop_assert!((rect.width - FULL).abs() < 1e-9 || (rect.height - FULL).abs() < 1e-9);
        }
    }
}
