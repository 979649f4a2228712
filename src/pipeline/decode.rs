//! Image decoding: file → `printpdf::RawImage` at native resolution.
//!
//! The pixels are embedded as decoded, without resampling. Images with an
//! alpha channel keep it (printpdf writes it as a soft mask); everything
//! else is flattened to 8-bit RGB or grayscale.

use crate::error::{Img2PdfError, Result};
use image::{DynamicImage, ImageError, ImageReader};
use printpdf::{RawImage, RawImageData, RawImageFormat};
use std::path::Path;
use tracing::debug;

/// Decode `path` into a raw image ready to add to a PDF document.
pub fn load_raw_image(path: &Path) -> Result<RawImage> {
    let decoded = ImageReader::open(path)
        .map_err(|e| Img2PdfError::from_read(path, e))?
        .with_guessed_format()
        .map_err(|e| Img2PdfError::from_read(path, e))?
        .decode()
        .map_err(|e| map_image_error(path, e))?;

    let raw = to_raw_image(decoded);
    debug!(
        "Decoded {} → {}x{} px ({:?})",
        path.display(),
        raw.width,
        raw.height,
        raw.data_format
    );
    Ok(raw)
}

/// Convert a decoded image into printpdf's pixel container.
pub fn to_raw_image(img: DynamicImage) -> RawImage {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let (pixels, data_format) = match img {
        DynamicImage::ImageLuma8(gray) => (gray.into_raw(), RawImageFormat::R8),
        other if other.color().has_alpha() => (other.to_rgba8().into_raw(), RawImageFormat::RGBA8),
        other => (other.to_rgb8().into_raw(), RawImageFormat::RGB8),
    };

    RawImage {
        pixels: RawImageData::U8(pixels),
        width,
        height,
        data_format,
        tag: Vec::new(),
    }
}

/// Map an `image` crate error onto the library error for `path`.
pub(crate) fn map_image_error(path: &Path, err: ImageError) -> Img2PdfError {
    match err {
        ImageError::IoError(e) => Img2PdfError::from_read(path, e),
        other => Img2PdfError::ImageDecode {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    }
}
