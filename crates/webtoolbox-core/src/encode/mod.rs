//! Image export for the toolbox.
//!
//! This module provides functionality for:
//! - Encoding a composited surface to PNG, JPEG or WebP
//! - Mapping formats to MIME types and file extensions
//!
//! # Examples
//!
//! ```ignore
//! use webtoolbox_core::encode::{export, ExportFormat};
//!
//! let blob = export(&surface, ExportFormat::Jpeg, 90).unwrap();
//! println!("Encoded {} bytes as {}", blob.bytes.len(), blob.mime);
//! ```

mod writer;

pub use writer::{export, export_with, EncodeError, EncodedBlob, ExportFormat, ExportOptions, DEFAULT_QUALITY};
