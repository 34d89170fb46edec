//! Image decoding for the toolbox.
//!
//! This module provides functionality for:
//! - Sniffing and decoding PNG, JPEG, WebP, GIF and BMP files into RGBA
//! - Reading header dimensions without decoding pixels
//! - Applying EXIF orientation so pixels match the browser's `<img>` view
//!
//! # Architecture
//!
//! Decoding is synchronous. The page runs it off the main thread and hands
//! the result back through the session's ticket API, see
//! [`crate::session::CropTool::finish_load`].
//!
//! # Examples
//!
//! ```ignore
//! use webtoolbox_core::decode::{decode_image, DecodeLimits};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let surface = decode_image(&bytes, &DecodeLimits::default()).unwrap();
//! println!("Decoded {}x{} image", surface.width, surface.height);
//! ```

mod reader;
mod types;

pub use reader::{decode_image, display_dimensions, probe_dimensions, read_orientation};
pub use types::{DecodeError, DecodeLimits, FilterType, Orientation, RasterSurface, CHANNELS};
