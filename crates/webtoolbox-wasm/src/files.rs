//! File-picker checks, download names and YouTube thumbnail lookup.

use wasm_bindgen::prelude::*;
use webtoolbox_core::input::{self, AcceptList};
use webtoolbox_core::youtube;

use crate::types::{js_error, serde_error};

/// Whether `mime` passes a tool's allow-list.
///
/// `preset` is one of `images`, `pdf`, `webp` or `exif`. Unknown presets
/// accept nothing.
#[wasm_bindgen]
pub fn accepts_mime(preset: &str, mime: &str) -> bool {
    accept_list(preset).is_some_and(|list| list.accepts(mime))
}

/// The `accept` attribute for a preset, e.g. `image/*`.
#[wasm_bindgen]
pub fn accept_attribute(preset: &str) -> String {
    accept_list(preset).map(|list| list.to_string()).unwrap_or_default()
}

/// `<prefix>-<original>`, e.g. `cropped-photo.jpg`.
#[wasm_bindgen]
pub fn output_file_name(prefix: &str, original: &str) -> String {
    input::output_file_name(prefix, original)
}

/// `<stem>-<width>x<height>.<extension>`.
#[wasm_bindgen]
pub fn dimension_file_name(original: &str, width: u32, height: u32, extension: &str) -> String {
    input::dimension_file_name(original, width, height, extension)
}

#[wasm_bindgen]
pub fn replace_extension(name: &str, extension: &str) -> String {
    input::replace_extension(name, extension)
}

/// Thumbnail URLs for a YouTube link as `[{variant, label, url, width, height}]`.
///
/// ```typescript
/// const thumbs = youtube_thumbnails('https://youtu.be/dQw4w9WgXcQ');
/// thumbs[2].url; // 'https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg'
/// ```
#[wasm_bindgen]
pub fn youtube_thumbnails(url: &str) -> Result<JsValue, JsValue> {
    let thumbnails = youtube::thumbnails_for_url(url).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&thumbnails).map_err(serde_error)
}

/// The 11-character video ID of a YouTube link.
#[wasm_bindgen]
pub fn youtube_video_id(url: &str) -> Result<String, JsValue> {
    youtube::extract_video_id(url)
        .map(|id| id.as_str().to_string())
        .map_err(js_error)
}

fn accept_list(preset: &str) -> Option<AcceptList> {
    match preset.trim().to_ascii_lowercase().as_str() {
        "images" | "image" => Some(AcceptList::IMAGES),
        "pdf" => Some(AcceptList::PDF),
        "webp" => Some(AcceptList::WEBP),
        "exif" => Some(AcceptList::EXIF_EDITABLE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mime_presets() {
        assert!(accepts_mime("images", "image/png"));
        assert!(accepts_mime("pdf", "application/pdf"));
        assert!(!accepts_mime("webp", "image/png"));
        assert!(accepts_mime("exif", "image/jpeg"));
        assert!(!accepts_mime("exif", "image/png"));
        assert!(!accepts_mime("video", "video/mp4"));
    }

    #[test]
    fn test_accept_attribute() {
        assert_eq!(accept_attribute("images"), "image/*");
        assert_eq!(accept_attribute("nope"), "");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(output_file_name("cropped", "photo.jpg"), "cropped-photo.jpg");
        assert_eq!(dimension_file_name("photo.jpg", 1080, 1920, "png"), "photo-1080x1920.png");
        assert_eq!(replace_extension("photo.jpg", "webp"), "photo.webp");
    }

    #[test]
    fn test_youtube_video_id() {
        assert_eq!(youtube_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_youtube_thumbnails_array() {
        let thumbs = youtube_thumbnails("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        let thumbs = js_sys::Array::from(&thumbs);
        assert_eq!(thumbs.length(), 5);
        let first = thumbs.get(0);
        let url = js_sys::Reflect::get(&first, &JsValue::from_str("url")).unwrap();
        assert_eq!(
            url.as_string().unwrap(),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/default.jpg"
        );
    }

    #[wasm_bindgen_test]
    fn test_malformed_url_rejected() {
        assert!(youtube_thumbnails("https://example.com/watch?v=nope").is_err());
    }
}
