//! A fully resolved conversion request.
//!
//! Front ends (the CLI flags, the [`crate::session::Session`] form) reduce
//! their inputs to exactly one [`ConversionJob`] and hand it to a
//! [`Converter`], either directly or through [`crate::worker`].

use crate::convert::Converter;
use crate::error::Result;
use crate::output::{BatchOutput, MergeOutput};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name when merging without an explicit output on the CLI.
pub const DEFAULT_MERGED_NAME: &str = "merged_images.pdf";

/// One conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConversionJob {
    /// One image → one PDF (`output` defaults to `<image>.pdf`).
    Single {
        image: PathBuf,
        output: Option<PathBuf>,
    },
    /// Each listed image → its own PDF, in `output_dir` or beside the image.
    Separate {
        images: Vec<PathBuf>,
        output_dir: Option<PathBuf>,
    },
    /// Listed images → one multi-page PDF.
    Merge { images: Vec<PathBuf>, output: PathBuf },
    /// Every supported image in `dir` → its own PDF.
    Directory {
        dir: PathBuf,
        output_dir: Option<PathBuf>,
    },
    /// Every supported image in `dir` → one multi-page PDF.
    MergeDirectory { dir: PathBuf, output: PathBuf },
}

impl ConversionJob {
    /// Number of inputs known up front; `None` for directory jobs.
    pub fn input_count(&self) -> Option<usize> {
        match self {
            ConversionJob::Single { .. } => Some(1),
            ConversionJob::Separate { images, .. } | ConversionJob::Merge { images, .. } => {
                Some(images.len())
            }
            ConversionJob::Directory { .. } | ConversionJob::MergeDirectory { .. } => None,
        }
    }

    /// Run the job to completion on the calling thread.
    pub fn run(&self, converter: &Converter) -> Result<JobOutcome> {
        match self {
            ConversionJob::Single { image, output } => converter
                .convert_image(image, output.as_deref())
                .map(|output| JobOutcome::Single { output }),
            ConversionJob::Separate { images, output_dir } => converter
                .convert_images(images, output_dir.as_deref())
                .map(JobOutcome::Batch),
            ConversionJob::Merge { images, output } => converter
                .merge_images(images, output)
                .map(JobOutcome::Merged),
            ConversionJob::Directory { dir, output_dir } => converter
                .convert_directory(dir, output_dir.as_deref())
                .map(JobOutcome::Batch),
            ConversionJob::MergeDirectory { dir, output } => converter
                .merge_directory(dir, output)
                .map(JobOutcome::Merged),
        }
    }
}

/// What a finished [`ConversionJob`] produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobOutcome {
    Single { output: PathBuf },
    Merged(MergeOutput),
    Batch(BatchOutput),
}

impl JobOutcome {
    /// PDF files written.
    pub fn created(&self) -> Vec<PathBuf> {
        match self {
            JobOutcome::Single { output } => vec![output.clone()],
            JobOutcome::Merged(m) => vec![m.output_path.clone()],
            JobOutcome::Batch(b) => b.created.clone(),
        }
    }

    /// Inputs that were skipped or failed.
    pub fn problem_count(&self) -> usize {
        match self {
            JobOutcome::Single { .. } => 0,
            JobOutcome::Merged(m) => m.skipped.len(),
            JobOutcome::Batch(b) => b.failed.len(),
        }
    }

    /// One-line status for display.
    pub fn status_text(&self) -> String {
        match self {
            JobOutcome::Single { output } => format!("Created: {}", output.display()),
            JobOutcome::Merged(m) => format!("Created: {}", m.output_path.display()),
            JobOutcome::Batch(b) => format!(
                "Conversion completed! Created {} PDF files.",
                b.created.len()
            ),
        }
    }
}
