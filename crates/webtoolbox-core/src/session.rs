//! Crop tool session: ties the controller, mapper, compositor and export
//! together and owns the tool's state machine.
//!
//! ```text
//! Empty ──load──▶ Loaded ──edit──▶ Editing ──begin_export──▶ Exporting
//!                   ▲                                           │
//!                   └──────────────── finish_export ────────────┘
//! ```
//!
//! Decoding and encoding run asynchronously on the page. Each one is started
//! with a [`Ticket`] and completed by handing the ticket back. A completion
//! whose ticket is no longer current (the user picked another file, reset
//! the tool or started a newer export) is dropped without touching state.

use serde::{Deserialize, Serialize};

use crate::compositor::{self, PostProcess};
use crate::config::ToolConfig;
use crate::crop::{CropStateController, ResizeHandle};
use crate::decode::{DecodeError, RasterSurface};
use crate::encode::{self, EncodeError, EncodedBlob, ExportFormat, ExportOptions};
use crate::error::ToolError;
use crate::geometry::{
    display_delta_to_percent, to_natural_pixels, AspectConstraint, CropRect, PixelCropRect, SourceImage,
    ViewState,
};

const NOT_LOADED: &str = "Please upload an image first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolState {
    #[default]
    Empty,
    Loaded,
    Editing,
    Exporting,
}

/// Identity of the current image. Bumped by every load and reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketKind {
    Load,
    Export(u64),
}

/// Handle for an in-flight decode or encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: Generation,
    kind: TicketKind,
}

impl Ticket {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Outcome of handing a completion back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Applied<T> {
    Applied(T),
    /// The ticket was superseded; nothing changed.
    Stale,
}

impl<T> Applied<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Applied::Applied(value) => Some(value),
            Applied::Stale => None,
        }
    }
}

#[derive(Debug, Clone)]
struct LoadedImage {
    raster: RasterSurface,
    source: SourceImage,
    controller: CropStateController,
}

/// One crop tool instance on a page.
#[derive(Debug, Clone)]
pub struct CropTool {
    config: ToolConfig,
    state: ToolState,
    generation: Generation,
    pending_load: Option<Generation>,
    export_seq: u64,
    pending_export: Option<u64>,
    image: Option<LoadedImage>,
    view: ViewState,
}

impl Default for CropTool {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}

impl CropTool {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            view: ViewState::new(config.min_zoom, config.max_zoom),
            config,
            state: ToolState::Empty,
            generation: Generation::default(),
            pending_load: None,
            export_seq: 0,
            pending_export: None,
            image: None,
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn source(&self) -> Option<SourceImage> {
        self.image.as_ref().map(|image| image.source)
    }

    pub fn raster(&self) -> Option<&RasterSurface> {
        self.image.as_ref().map(|image| &image.raster)
    }

    pub fn crop_rect(&self) -> Option<CropRect> {
        self.image.as_ref().map(|image| image.controller.rect())
    }

    pub fn aspect(&self) -> AspectConstraint {
        self.image
            .as_ref()
            .map_or(self.config.default_aspect, |image| image.controller.aspect())
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Whether a completion for `ticket` would still be applied. Callers can
    /// check this to skip decoding or encoding for a superseded request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        match ticket.kind {
            TicketKind::Load => self.pending_load == Some(ticket.generation),
            TicketKind::Export(seq) => ticket.generation == self.generation && self.pending_export == Some(seq),
        }
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Start decoding a new file. Any in-flight decode or export for the
    /// previous image becomes stale.
    pub fn begin_load(&mut self) -> Ticket {
        self.generation = self.generation.next();
        self.pending_load = Some(self.generation);
        self.abandon_export();
        log::debug!("Load started (generation {})", self.generation.value());
        Ticket {
            generation: self.generation,
            kind: TicketKind::Load,
        }
    }

    /// Hand back a decode result together with the size the `<img>` element
    /// was laid out at. A display size of zero means "not laid out yet" and
    /// the natural size is used.
    ///
    /// Each load ticket completes at most once; a repeated completion is
    /// stale. On failure the tool keeps its previous image and state.
    pub fn finish_load(
        &mut self,
        ticket: Ticket,
        result: Result<RasterSurface, DecodeError>,
        display_size: (f64, f64),
    ) -> Result<Applied<()>, ToolError> {
        if !self.claim_load(ticket) {
            return Ok(Applied::Stale);
        }

        let raster = result?;
        if raster.is_empty() {
            return Err(ToolError::Decode("image has no pixels".to_string()));
        }
        let max_pixels = self.config.decode.max_pixels;
        if raster.pixel_count() > max_pixels {
            return Err(DecodeError::TooLarge {
                width: raster.width,
                height: raster.height,
                max_pixels,
            }
            .into());
        }

        let natural = SourceImage::natural(raster.width, raster.height);
        let displayed = natural.with_display_size(display_size.0, display_size.1);
        let source = if displayed.is_loaded() { displayed } else { natural };

        let controller =
            CropStateController::for_source(&source, self.config.default_aspect, self.config.initial_coverage)
                .with_min_size(self.config.min_crop_percent);

        log::info!(
            "Loaded {}x{} image (generation {})",
            raster.width,
            raster.height,
            self.generation.value()
        );
        self.image = Some(LoadedImage {
            raster,
            source,
            controller,
        });
        self.view.reset();
        self.state = ToolState::Loaded;
        Ok(Applied::Applied(()))
    }

    /// Synchronous load for callers that decode inline.
    pub fn load(&mut self, raster: RasterSurface, display_size: (f64, f64)) -> Result<(), ToolError> {
        let ticket = self.begin_load();
        self.finish_load(ticket, Ok(raster), display_size).map(|_| ())
    }

    /// Back to Empty. Pending completions become stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.next();
        self.pending_load = None;
        self.pending_export = None;
        self.image = None;
        self.view.reset();
        self.state = ToolState::Empty;
        log::debug!("Tool reset (generation {})", self.generation.value());
    }

    /// The image element was resized. The percentage rectangle is kept, so
    /// the selection follows the image and the pixel crop doesn't change.
    pub fn relayout(&mut self, display_width: f64, display_height: f64) -> Result<(), ToolError> {
        let image = self.image.as_mut().ok_or_else(not_loaded)?;
        let resized = image.source.with_display_size(display_width, display_height);
        if resized.is_loaded() {
            image.source = resized;
        } else {
            log::debug!("Ignoring relayout to {}x{}", display_width, display_height);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Interaction
    // ---------------------------------------------------------------------

    /// Move the selection by a pointer delta in display pixels.
    pub fn drag(&mut self, dx: f64, dy: f64) -> Result<(), ToolError> {
        self.edit(|image| {
            let (px, py) = display_delta_to_percent(dx, dy, &image.source)?;
            image.controller.apply_drag(px, py);
            Ok(())
        })
    }

    /// Drag a resize handle by a pointer delta in display pixels.
    pub fn resize(&mut self, handle: ResizeHandle, dx: f64, dy: f64, aspect_locked: bool) -> Result<(), ToolError> {
        self.edit(|image| {
            let (px, py) = display_delta_to_percent(dx, dy, &image.source)?;
            image.controller.apply_resize(handle, px, py, aspect_locked);
            Ok(())
        })
    }

    pub fn set_aspect(&mut self, aspect: AspectConstraint) -> Result<(), ToolError> {
        self.edit(|image| {
            image.controller.set_aspect(aspect);
            Ok(())
        })
    }

    pub fn center_horizontally(&mut self) -> Result<(), ToolError> {
        self.edit(|image| {
            image.controller.center_horizontally();
            Ok(())
        })
    }

    pub fn center_vertically(&mut self) -> Result<(), ToolError> {
        self.edit(|image| {
            image.controller.center_vertically();
            Ok(())
        })
    }

    /// Numeric entry in percent.
    pub fn set_rect(&mut self, rect: CropRect) -> Result<(), ToolError> {
        self.edit(|image| {
            image.controller.set_rect(rect);
            Ok(())
        })
    }

    /// Numeric entry in natural pixels.
    pub fn set_pixel_rect(&mut self, rect: PixelCropRect) -> Result<(), ToolError> {
        self.edit(|image| {
            let source = image.source;
            image.controller.set_pixel_rect(&rect, &source)?;
            Ok(())
        })
    }

    /// Selection back to its initial shape for the active aspect.
    pub fn reset_crop(&mut self) -> Result<(), ToolError> {
        self.edit(|image| {
            image.controller.reset();
            Ok(())
        })
    }

    pub fn zoom_by(&mut self, factor: f64) -> Result<(), ToolError> {
        self.edit_view(|view| view.zoom_by(factor))
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), ToolError> {
        self.edit_view(|view| view.set_zoom(zoom))
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Result<(), ToolError> {
        self.edit_view(|view| view.pan_by(dx, dy))
    }

    pub fn reset_view(&mut self) -> Result<(), ToolError> {
        self.edit_view(ViewState::reset)
    }

    // ---------------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------------

    /// Current selection in natural pixels.
    pub fn pixel_rect(&self) -> Result<PixelCropRect, ToolError> {
        let image = self.image.as_ref().ok_or_else(not_loaded)?;
        Ok(to_natural_pixels(&image.controller.rect(), &image.source)?)
    }

    /// Render the current selection at 1:1.
    pub fn preview(&self) -> Result<RasterSurface, ToolError> {
        self.preview_with(&[])
    }

    /// Render the current selection, then apply post-process steps.
    pub fn preview_with(&self, steps: &[PostProcess]) -> Result<RasterSurface, ToolError> {
        let rect = self.pixel_rect()?;
        let image = self.image.as_ref().ok_or_else(not_loaded)?;
        Ok(compositor::render_with(&image.raster, &rect, steps)?)
    }

    /// Enter Exporting. Starting a second export supersedes the first.
    pub fn begin_export(&mut self) -> Result<Ticket, ToolError> {
        if self.image.is_none() {
            return Err(not_loaded());
        }
        self.export_seq = self.export_seq.wrapping_add(1);
        self.pending_export = Some(self.export_seq);
        self.state = ToolState::Exporting;
        log::debug!("Export {} started", self.export_seq);
        Ok(Ticket {
            generation: self.generation,
            kind: TicketKind::Export(self.export_seq),
        })
    }

    /// Hand back an encode result. Success or failure both return the tool
    /// to Loaded.
    pub fn finish_export(
        &mut self,
        ticket: Ticket,
        result: Result<EncodedBlob, EncodeError>,
    ) -> Result<Applied<EncodedBlob>, ToolError> {
        let current = matches!(ticket.kind, TicketKind::Export(_)) && self.is_current(ticket);
        if !current {
            log::warn!("Discarding stale export (generation {})", ticket.generation.value());
            return Ok(Applied::Stale);
        }

        self.pending_export = None;
        self.state = ToolState::Loaded;
        Ok(Applied::Applied(result?))
    }

    /// Render and encode in one step, using the configured background.
    pub fn export_now(&mut self, format: ExportFormat, quality: u8) -> Result<EncodedBlob, ToolError> {
        let ticket = self.begin_export()?;
        let options = ExportOptions {
            format,
            quality,
            ..self.config.export
        };
        let result = match self.preview() {
            Ok(surface) => encode::export_with(&surface, &options),
            Err(e) => {
                self.abandon_export();
                return Err(e);
            }
        };
        match self.finish_export(ticket, result)? {
            Applied::Applied(blob) => Ok(blob),
            Applied::Stale => Err(ToolError::Encode("export superseded".to_string())),
        }
    }

    /// Export with the configured format and quality.
    pub fn export_default(&mut self) -> Result<EncodedBlob, ToolError> {
        let ExportOptions { format, quality, .. } = self.config.export;
        self.export_now(format, quality)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn edit<T>(&mut self, f: impl FnOnce(&mut LoadedImage) -> Result<T, ToolError>) -> Result<T, ToolError> {
        let image = self.image.as_mut().ok_or_else(not_loaded)?;
        let out = f(image)?;
        self.mark_edited();
        Ok(out)
    }

    fn edit_view(&mut self, f: impl FnOnce(&mut ViewState)) -> Result<(), ToolError> {
        if self.image.is_none() {
            return Err(not_loaded());
        }
        f(&mut self.view);
        self.mark_edited();
        Ok(())
    }

    fn mark_edited(&mut self) {
        if self.state == ToolState::Loaded {
            log::debug!("Loaded -> Editing");
            self.state = ToolState::Editing;
        }
    }

    /// Consume the pending load if `ticket` is it.
    fn claim_load(&mut self, ticket: Ticket) -> bool {
        let current = ticket.kind == TicketKind::Load && self.is_current(ticket);
        if current {
            self.pending_load = None;
        } else {
            log::warn!(
                "Discarding stale decode (generation {}, current {})",
                ticket.generation.value(),
                self.generation.value()
            );
        }
        current
    }

    fn abandon_export(&mut self) {
        if self.pending_export.take().is_some() && self.state == ToolState::Exporting {
            self.state = ToolState::Loaded;
        }
    }
}

fn not_loaded() -> ToolError {
    ToolError::InvalidInput(NOT_LOADED.to_string())
}
