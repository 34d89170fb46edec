//! File-picker allow-lists and download file naming.

use std::fmt;

use thiserror::Error;

/// Name used when the original has no usable stem.
pub const FALLBACK_NAME: &str = "image";

/// Errors raised while validating user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The selected file's MIME type is not accepted by the tool.
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// The URL is not a recognised video link.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required field was left empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// A MIME allow-list such as an `<input accept>` attribute.
///
/// Entries are either exact types (`image/jpeg`) or wildcards
/// (`image/*`). Matching is case-insensitive and ignores MIME parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptList {
    entries: &'static [&'static str],
}

impl AcceptList {
    /// Any image type.
    pub const IMAGES: AcceptList = AcceptList::new(&["image/*"]);
    pub const PDF: AcceptList = AcceptList::new(&["application/pdf"]);
    pub const WEBP: AcceptList = AcceptList::new(&["image/webp"]);
    /// Formats whose EXIF block the metadata editor can rewrite.
    pub const EXIF_EDITABLE: AcceptList = AcceptList::new(&["image/jpeg"]);

    pub const fn new(entries: &'static [&'static str]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [&'static str] {
        self.entries
    }

    pub fn accepts(&self, mime: &str) -> bool {
        let mime = essence(mime);
        if mime.is_empty() {
            return false;
        }
        self.entries.iter().any(|entry| match entry.strip_suffix("/*") {
            Some(top) => mime
                .split_once('/')
                .is_some_and(|(t, sub)| t.eq_ignore_ascii_case(top) && !sub.is_empty()),
            None => mime.eq_ignore_ascii_case(entry),
        })
    }

    /// # Errors
    ///
    /// Returns `InputError::UnsupportedType` carrying the rejected type.
    pub fn check(&self, mime: &str) -> Result<(), InputError> {
        if self.accepts(mime) {
            Ok(())
        } else {
            log::warn!("Rejected file of type {:?}", mime);
            Err(InputError::UnsupportedType(mime.to_string()))
        }
    }
}

/// Comma-separated, ready for an `accept` attribute.
impl fmt::Display for AcceptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join(","))
    }
}

fn essence(mime: &str) -> &str {
    mime.split(';').next().unwrap_or_default().trim()
}

/// `<prefix>-<original>`, e.g. `cropped-photo.jpg`.
pub fn output_file_name(prefix: &str, original: &str) -> String {
    let original = base_name(original);
    let original = if original.is_empty() { FALLBACK_NAME } else { original };
    let prefix = prefix.trim();
    if prefix.is_empty() {
        original.to_string()
    } else {
        format!("{}-{}", prefix, original)
    }
}

/// `<stem>-<w>x<h>.<ext>`, e.g. `photo-1080x1080.png`.
pub fn dimension_file_name(original: &str, width: u32, height: u32, extension: &str) -> String {
    let (stem, _) = split_extension(base_name(original));
    let stem = if stem.is_empty() { FALLBACK_NAME } else { stem };
    format!("{}-{}x{}.{}", stem, width, height, extension.trim_start_matches('.'))
}

/// Swap the extension, adding one if there is none.
pub fn replace_extension(name: &str, extension: &str) -> String {
    let (stem, _) = split_extension(base_name(name));
    let stem = if stem.is_empty() { FALLBACK_NAME } else { stem };
    format!("{}.{}", stem, extension.trim_start_matches('.'))
}

/// Strip any directory part a browser or drag source left in the name.
fn base_name(name: &str) -> &str {
    name.trim().rsplit(['/', '\\']).next().unwrap_or_default()
}

/// Split at the last dot. A leading dot (`.env`) is part of the stem.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(i) => (&name[..i], Some(&name[i + 1..])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_accepts_any_image() {
        assert!(AcceptList::IMAGES.accepts("image/png"));
        assert!(AcceptList::IMAGES.accepts("image/jpeg"));
        assert!(AcceptList::IMAGES.accepts("IMAGE/WebP"));
        assert!(!AcceptList::IMAGES.accepts("application/pdf"));
        assert!(!AcceptList::IMAGES.accepts("image/"));
        assert!(!AcceptList::IMAGES.accepts(""));
    }

    #[test]
    fn test_exif_editable_rejects_png() {
        assert_eq!(
            AcceptList::EXIF_EDITABLE.check("image/png"),
            Err(InputError::UnsupportedType("image/png".into()))
        );
        assert!(AcceptList::EXIF_EDITABLE.check("image/jpeg").is_ok());
    }

    #[test]
    fn test_mime_parameters_ignored() {
        assert!(AcceptList::PDF.accepts("application/pdf; charset=binary"));
        assert!(AcceptList::WEBP.accepts(" image/webp "));
    }

    #[test]
    fn test_accept_attribute() {
        let list = AcceptList::new(&["image/png", "image/jpeg"]);
        assert_eq!(list.to_string(), "image/png,image/jpeg");
        assert_eq!(AcceptList::IMAGES.to_string(), "image/*");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("cropped", "photo.jpg"), "cropped-photo.jpg");
        assert_eq!(output_file_name("cropped", ""), "cropped-image");
        assert_eq!(output_file_name("", "photo.jpg"), "photo.jpg");
        assert_eq!(output_file_name("watermarked", "C:\\fake\\pic.png"), "watermarked-pic.png");
    }

    #[test]
    fn test_dimension_file_name() {
        assert_eq!(dimension_file_name("photo.jpg", 1080, 1080, "png"), "photo-1080x1080.png");
        assert_eq!(dimension_file_name("archive.tar.gz", 10, 20, ".jpg"), "archive.tar-10x20.jpg");
        assert_eq!(dimension_file_name("", 1, 2, "webp"), "image-1x2.webp");
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("photo.png", "webp"), "photo.webp");
        assert_eq!(replace_extension("photo", "jpg"), "photo.jpg");
        assert_eq!(replace_extension(".hidden", "png"), ".hidden.png");
        assert_eq!(replace_extension("  ", "png"), "image.png");
    }
}
