//! Error types for the edgequake-img2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Img2PdfError`] — **Fatal**: the requested operation cannot produce
//!   anything (missing input, unsupported format on an explicit single-image
//!   conversion, invalid page configuration, nothing left to merge). Returned
//!   as `Err(Img2PdfError)` from the [`crate::Converter`] methods.
//!
//! * [`ItemError`] — **Non-fatal**: one image inside a merge or batch could
//!   not be used, but the others are fine. Stored inside
//!   [`crate::output::SkippedImage`] / [`crate::output::FailedImage`] so
//!   callers can report partial success instead of losing the whole run.
//!
//! [`ErrorKind`] collapses both onto the five coarse categories front ends
//! report to the user.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-img2pdf library.
#[derive(Debug, Error)]
pub enum Img2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input image or directory was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The path exists but is not a directory (directory batch/merge).
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Process does not have read permission on the input.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// File extension is outside the supported raster set.
    #[error(
        "Unsupported image format '{extension}' for '{path}'\n\
Supported: .jpg .jpeg .png .bmp .tiff .tif .gif .webp"
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// A merge or batch had nothing left to convert after filtering.
    #[error("No valid image files found ({skipped} skipped)")]
    NoValidImages { skipped: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Page size / margin combination leaves no drawable area, or the
    /// margin is not a usable number.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Decode / I/O errors ───────────────────────────────────────────────
    /// The file has a supported extension but could not be decoded.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// Reading an input failed below the decoder.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Img2PdfError {
    /// Coarse category used by front ends for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Img2PdfError::FileNotFound { .. } | Img2PdfError::NotADirectory { .. } => {
                ErrorKind::NotFound
            }
            Img2PdfError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Img2PdfError::NoValidImages { .. } => ErrorKind::NoValidImages,
            Img2PdfError::InvalidConfig(_) => ErrorKind::InvalidConfiguration,
            Img2PdfError::PermissionDenied { .. }
            | Img2PdfError::ImageDecode { .. }
            | Img2PdfError::Io { .. }
            | Img2PdfError::OutputWriteFailed { .. }
            | Img2PdfError::Internal(_) => ErrorKind::IoFailure,
        }
    }

    /// Build an error from an `io::Error` raised while reading `path`.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Img2PdfError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Img2PdfError::PermissionDenied { path },
            _ => Img2PdfError::Io { path, source },
        }
    }
}

/// The five error categories a conversion can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    UnsupportedFormat,
    NoValidImages,
    InvalidConfiguration,
    IoFailure,
}

/// A non-fatal error for a single image inside a merge or batch.
///
/// Carries only strings so it can be serialised into `--json` output and
/// sent across the worker channel.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ItemError {
    /// The path does not exist.
    #[error("file not found")]
    NotFound,

    /// The extension is outside the supported set.
    #[error("unsupported format '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Decoding, layout, or writing failed.
    #[error("{detail}")]
    Failed { kind: ErrorKind, detail: String },
}

impl ItemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ItemError::NotFound => ErrorKind::NotFound,
            ItemError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ItemError::Failed { kind, .. } => *kind,
        }
    }
}

impl From<&Img2PdfError> for ItemError {
    fn from(err: &Img2PdfError) -> Self {
        match err {
            Img2PdfError::FileNotFound { .. } => ItemError::NotFound,
            Img2PdfError::UnsupportedFormat { extension, .. } => ItemError::UnsupportedFormat {
                extension: extension.clone(),
            },
            other => ItemError::Failed {
                kind: other.kind(),
                detail: other.to_string(),
            },
        }
    }
}

/// Alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Img2PdfError>;
