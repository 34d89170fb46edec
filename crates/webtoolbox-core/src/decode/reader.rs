//! Content-sniffed image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, DecodeLimits, Orientation, RasterSurface};

/// Decode an image file into an RGBA surface.
///
/// The format is guessed from the content, not the file name, so a `.jpg`
/// that is really a PNG still loads. Header dimensions are checked against
/// `limits` before any pixel data is decoded. EXIF orientation is applied so
/// the surface matches what the browser shows in an `<img>` element.
///
/// # Errors
///
/// - `DecodeError::InvalidFormat` if the bytes are not a recognised image
/// - `DecodeError::TooLarge` if the header exceeds `limits.max_pixels`
/// - `DecodeError::CorruptedFile` if decoding fails part way
pub fn decode_image(bytes: &[u8], limits: &DecodeLimits) -> Result<RasterSurface, DecodeError> {
    let (width, height) = probe_dimensions(bytes)?;
    let pixels = width as u64 * height as u64;
    if pixels > limits.max_pixels {
        log::warn!(
            "rejecting {}x{} image, budget is {} pixels",
            width,
            height,
            limits.max_pixels
        );
        return Err(DecodeError::TooLarge {
            width,
            height,
            max_pixels: limits.max_pixels,
        });
    }

    let orientation = read_orientation(bytes);

    let img = guessed_reader(bytes)?
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    let surface = RasterSurface::from_rgba_image(oriented.into_rgba8());

    log::debug!(
        "decoded {}x{} image ({:?})",
        surface.width,
        surface.height,
        orientation
    );
    Ok(surface)
}

/// Read the stored dimensions from the image header without decoding pixels.
///
/// These are the dimensions before EXIF orientation is applied.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    guessed_reader(bytes)?
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Header dimensions after EXIF orientation, i.e. the size the decoded
/// surface and the browser's `<img>` will have.
pub fn display_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let stored = probe_dimensions(bytes)?;
    Ok(oriented_size(stored, read_orientation(bytes)))
}

/// Extract the EXIF orientation from an image file.
///
/// Returns `Orientation::Normal` if there is no EXIF block or no
/// orientation tag.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(reader)
}

fn oriented_size((width, height): (u32, u32), orientation: Orientation) -> (u32, u32) {
    if orientation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
