//! Progress-callback trait for per-image conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as a merge or batch works through its images. The CLI drives an
//! `indicatif` bar from these events; [`crate::worker`] forwards them onto
//! its channel.
//!
//! # Example
//!
//! ```rust
//! use edgequake_img2pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, source: &Path) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index, total, source.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the converter as it processes each image of a merge or batch.
///
/// Conversion is sequential, so events arrive in order, but implementations
/// must be `Send + Sync` because the converter may run on a worker thread.
/// All methods have default no-op implementations.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after filtering, before the first image is processed.
    ///
    /// # Arguments
    /// * `total` — number of images that will be attempted
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an image is decoded.
    ///
    /// # Arguments
    /// * `index`  — 1-indexed position in the batch
    /// * `total`  — images in the batch
    /// * `source` — image path
    fn on_item_start(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called when an image has been placed (merge) or written (batch).
    fn on_item_complete(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called when an image is skipped or fails; the batch continues.
    ///
    /// # Arguments
    /// * `error` — human-readable error description
    fn on_item_error(&self, index: usize, total: usize, source: &Path, error: &str) {
        let _ = (index, total, source, error);
    }

    /// Called once after every image has been attempted.
    ///
    /// # Arguments
    /// * `total`         — images attempted
    /// * `success_count` — images that made it into the output
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
