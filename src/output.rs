//! Result records returned by the [`crate::Converter`] operations.
//!
//! All types are `Serialize` so the CLI can emit them with `--json`.

use crate::error::ItemError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An input dropped by a merge before or while drawing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: ItemError,
}

/// An input whose separate PDF could not be produced in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedImage {
    pub path: PathBuf,
    pub error: ItemError,
}

/// Outcome of merging several images into one PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutput {
    /// The multi-page PDF that was written.
    pub output_path: PathBuf,
    /// Source images in page order.
    pub pages: Vec<PathBuf>,
    /// Inputs left out, in input order.
    pub skipped: Vec<SkippedImage>,
}

impl MergeOutput {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Outcome of converting several images into one PDF each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutput {
    /// PDFs that were written, in processing order.
    pub created: Vec<PathBuf>,
    /// Images that failed; the batch continued past each of them.
    pub failed: Vec<FailedImage>,
}

impl BatchOutput {
    /// Images attempted.
    pub fn total(&self) -> usize {
        self.created.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}
