//! Input resolution: validate image paths and enumerate image directories.
//!
//! Only the file extension decides whether a path is eligible; the decoder
//! later sniffs the real format from the file header, so a PNG saved as
//! `.jpg` still converts.

use crate::error::{Img2PdfError, Result};
use crate::pipeline::decode::map_image_error;
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lower-cased extensions (with the leading dot) the converter accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".tif", ".gif", ".webp",
];

/// A path plus its pixel dimensions, read from the image header on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    /// Read the dimensions of `path` without decoding the pixel data.
    pub fn read_header(path: &Path) -> Result<Self> {
        let reader = ImageReader::open(path)
            .map_err(|e| Img2PdfError::from_read(path, e))?
            .with_guessed_format()
            .map_err(|e| Img2PdfError::from_read(path, e))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| map_image_error(path, e))?;
        debug!("Read header of {} → {}x{} px", path.display(), width, height);
        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
        })
    }
}

/// The extension of `path` lower-cased with a leading dot, or `""` if none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Whether `path` carries one of the [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    let ext = extension_of(path);
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Check that `path` exists and has a supported extension.
pub fn validate_image_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Img2PdfError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !is_supported(path) {
        return Err(Img2PdfError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension_of(path),
        });
    }
    Ok(())
}

/// `photo.jpg` → `photo.pdf`, next to the image.
pub fn default_output_path(image: &Path) -> PathBuf {
    image.with_extension("pdf")
}

/// `<dir>/<image stem>.pdf`.
pub fn output_in_dir(dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "image".into());
    let mut name = stem;
    name.push(".pdf");
    dir.join(name)
}

/// List the supported image files directly inside `dir`.
///
/// Each directory entry is visited once, so a file can never be listed
/// twice regardless of extension case. Subdirectories are not descended
/// into. The result is sorted by file name; the raw `read_dir` order is
/// filesystem-dependent.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Img2PdfError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(Img2PdfError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| Img2PdfError::from_read(dir, e))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_supported(&path) {
            images.push(path);
        }
    }

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} images in {}", images.len(), dir.display());
    Ok(images)
}
