//! Web Toolbox WASM - WebAssembly bindings for the toolbox pages
//!
//! This crate exposes webtoolbox-core to the React pages. The pages keep
//! their own chrome and call in here for state, pixels and text transforms.
//!
//! # Module Structure
//!
//! - `types` - `JsRasterSurface` and the shared error conversion
//! - `crop` - `JsCropTool`, the session behind the cropper and resizer
//! - `image` - Stateless decode, crop, resize, watermark and export
//! - `text` - Encryption, hashing and base64
//! - `files` - File-type checks, download names, YouTube thumbnails
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropTool, output_file_name } from '@webtoolbox/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const tool = new JsCropTool();
//! const ticket = tool.begin_load();
//! tool.finish_load(ticket, new Uint8Array(await file.arrayBuffer()), 640, 480);
//! const name = output_file_name('cropped', file.name);
//! ```
//!
//! Errors reject with a string that can be shown to the user as-is.

use wasm_bindgen::prelude::*;

mod crop;
mod files;
mod image;
mod text;
mod types;

// Re-export public types
pub use crop::{JsCropTool, JsTicket};
pub use files::{
    accept_attribute, accepts_mime, dimension_file_name, output_file_name, replace_extension, youtube_thumbnails,
    youtube_video_id,
};
pub use image::{
    apply_watermark, decode_image, export_surface, probe_dimensions, render_crop, resize, resize_to_fit,
    resize_to_preset, social_presets,
};
pub use text::{
    base64_decode, base64_encode, bcrypt_hash, bcrypt_verify, decrypt_text, encrypt_text, hash_algorithms, hash_text,
    hex_encode,
};
pub use types::JsRasterSurface;

/// Initialize the WASM module (called automatically on load)
///
/// Routes panics and `log` output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) finds the logger already set.
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
