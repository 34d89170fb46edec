//! Web Toolbox Core - logic behind the browser image and text tools
//!
//! This crate provides the non-UI half of the toolbox: crop geometry and
//! state, preview compositing, decode and export, file-type checks, and the
//! text tools (encryption, hashing, encoding, YouTube thumbnails).
//!
//! Nothing here touches JavaScript. The `webtoolbox-wasm` crate wraps these
//! types for the pages.

pub mod compositor;
pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod input;
pub mod session;
pub mod text;
pub mod youtube;

pub use config::ToolConfig;
pub use crop::{AspectPreset, CropStateController, ResizeHandle};
pub use decode::RasterSurface;
pub use encode::{EncodedBlob, ExportFormat};
pub use error::ToolError;
pub use geometry::{AspectConstraint, CropRect, PixelCropRect, SourceImage, ViewState};
pub use session::{Applied, CropTool, ToolState};
