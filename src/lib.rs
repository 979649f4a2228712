//! # edgequake-img2pdf
//!
//! Convert raster images (JPEG, PNG, BMP, TIFF, GIF, WebP) into PDF
//! documents: one PDF per image, or many images merged into one multi-page
//! PDF.
//!
//! Every image gets its own page of a fixed size (A4 or Letter). It is
//! scaled uniformly to fill the area inside the margins and centred, so the
//! aspect ratio is always preserved and the image never crosses a margin.
//! Pixels are embedded at native resolution; only the placement is scaled.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image paths
//!  │
//!  ├─ 1. Input   extension filter, existence check, directory discovery
//!  ├─ 2. Decode  file → RGB / RGBA / grayscale pixel buffer
//!  ├─ 3. Layout  scale = min(avail_w / w, avail_h / h), centred
//!  ├─ 4. Render  one PDF page per image (printpdf)
//!  └─ 5. Output  atomic write + per-item skipped / failed records
//! ```
//!
//! In a merge or batch a bad image is logged and skipped; the rest still
//! convert. Whole-operation failures (nothing valid to convert, a bad page
//! configuration, an explicit single image that cannot be read) are
//! returned as [`Img2PdfError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_img2pdf::{ConversionConfig, Converter, PageSize};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .page_size(PageSize::Letter)
//!         .margin(36.0)
//!         .build()?;
//!     let converter = Converter::new(config)?;
//!
//!     let merged = converter.merge_images(
//!         &["scan-1.jpg", "scan-2.jpg", "scan-3.png"],
//!         Path::new("scans.pdf"),
//!     )?;
//!     eprintln!("{} pages, {} skipped", merged.page_count(), merged.skipped.len());
//!
//!     let batch = converter.convert_directory(Path::new("photos"), None)?;
//!     eprintln!("created {} PDFs", batch.created.len());
//!     Ok(())
//! }
//! ```
//!
//! Interactive front ends run jobs through [`worker::ConversionWorker`] and
//! keep their form state in a [`session::Session`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-img2pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## Page Sizes
//!
//! | Size | Points (w × h) | Drawable area at the default 50 pt margin |
//! |------|----------------|-------------------------------------------|
//! | `A4`     | 595 × 842 | 495 × 742 |
//! | `Letter` | 612 × 792 | 512 × 692 |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod worker;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageConfig, PageSize};
pub use convert::Converter;
pub use error::{ErrorKind, Img2PdfError, ItemError};
pub use job::{ConversionJob, JobOutcome};
pub use output::{BatchOutput, FailedImage, MergeOutput, SkippedImage};
pub use pipeline::input::SUPPORTED_EXTENSIONS;
pub use pipeline::layout::{fit_to_page, Placement};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{ConversionMode, Session};
pub use worker::{ConversionWorker, WorkerEvent, WorkerHandle};
