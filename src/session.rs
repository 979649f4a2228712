//! Front-end session state: what a user has picked and how to convert it.
//!
//! A [`Session`] is the model behind an interactive front end minus the
//! widgets: a deduplicated [`Selection`] of images, the page-size / margin /
//! mode / output form, and a status line. [`Session::prepare`] turns the
//! form into a [`Converter`] plus a [`ConversionJob`]; [`Session::start`]
//! does the same and hands the job to a [`ConversionWorker`]. Worker events
//! fed back through [`Session::apply_event`] keep the status line and the
//! converting flag current.

use crate::config::{ConversionConfig, PageSize, DEFAULT_MARGIN_PT};
use crate::convert::Converter;
use crate::error::{Img2PdfError, Result};
use crate::job::ConversionJob;
use crate::pipeline::input;
use crate::worker::{ConversionWorker, WorkerEvent, WorkerHandle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output file used in single-PDF mode when no output is chosen.
pub const DEFAULT_SINGLE_OUTPUT: &str = "converted_images.pdf";

/// Parse margin text as a whole, non-negative number of points.
pub fn parse_margin(text: &str) -> Result<f32> {
    text.trim()
        .parse::<u32>()
        .map(|m| m as f32)
        .map_err(|_| {
            Img2PdfError::InvalidConfig("Invalid margin value. Please enter a number.".into())
        })
}

// ── Selection ───────────────────────────────────────────────────────────────

/// Ordered list of selected images without duplicates.
///
/// Two paths count as the same image when they canonicalise to the same
/// file; paths that cannot be canonicalised are compared as given.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    images: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `paths` not already selected; returns how many were added.
    pub fn add_images<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            let path = path.as_ref();
            let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            if self.seen.insert(key) {
                self.images.push(path.to_path_buf());
                added += 1;
            }
        }
        added
    }

    /// Append every supported image directly inside `dir`.
    pub fn add_directory(&mut self, dir: &Path) -> Result<usize> {
        let found = input::discover_images(dir)?;
        Ok(self.add_images(found))
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.seen.clear();
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

// ── Session ─────────────────────────────────────────────────────────────────

/// One PDF per image, or all images in one PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    #[default]
    Separate,
    Single,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub selection: Selection,
    pub page_size: PageSize,
    /// Raw margin text as typed; parsed by [`Session::prepare`].
    pub margin_text: String,
    pub mode: ConversionMode,
    /// Output directory (separate mode) or file (single mode).
    pub output: Option<PathBuf>,
    status: String,
    converting: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            selection: Selection::new(),
            page_size: PageSize::default(),
            margin_text: format!("{}", DEFAULT_MARGIN_PT as u32),
            mode: ConversionMode::default(),
            output: None,
            status: "Ready".to_string(),
            converting: false,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// True between a successful [`start`](Self::start) and the terminal
    /// worker event.
    pub fn is_converting(&self) -> bool {
        self.converting
    }

    pub fn add_images<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let added = self.selection.add_images(paths);
        self.status = format!("Selected {} images", self.selection.len());
        added
    }

    /// Add the supported images of `dir`.
    ///
    /// # Errors
    /// `NoValidImages` when the directory holds no supported image that is
    /// not already selected.
    pub fn add_directory(&mut self, dir: &Path) -> Result<usize> {
        let added = self.selection.add_directory(dir)?;
        if added == 0 {
            return Err(Img2PdfError::NoValidImages { skipped: 0 });
        }
        self.status = format!("Added {added} images from directory");
        Ok(added)
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        self.status = "Cleared all images".to_string();
    }

    /// Validate the form and build the converter and job to run.
    ///
    /// Separate mode writes `<output or cwd>/<stem>.pdf` per image; single
    /// mode merges into `output` or [`DEFAULT_SINGLE_OUTPUT`].
    ///
    /// # Errors
    /// * `NoValidImages` when nothing is selected.
    /// * `InvalidConfig` for bad margin text or a margin too large for the
    ///   page.
    pub fn prepare(&self) -> Result<(Converter, ConversionJob)> {
        if self.selection.is_empty() {
            return Err(Img2PdfError::NoValidImages { skipped: 0 });
        }
        let margin = parse_margin(&self.margin_text)?;
        let config = ConversionConfig::builder()
            .page_size(self.page_size)
            .margin(margin)
            .build()?;
        let converter = Converter::new(config)?;

        let images = self.selection.images().to_vec();
        let job = match self.mode {
            ConversionMode::Single => ConversionJob::Merge {
                images,
                output: self
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SINGLE_OUTPUT)),
            },
            ConversionMode::Separate => {
                let output_dir = match self.output.clone() {
                    Some(dir) => dir,
                    None => std::env::current_dir()
                        .map_err(|e| Img2PdfError::from_read(".", e))?,
                };
                ConversionJob::Separate {
                    images,
                    output_dir: Some(output_dir),
                }
            }
        };

        debug!(?job, "Prepared conversion job");
        Ok((converter, job))
    }

    /// Prepare the job and run it on `worker`.
    ///
    /// The session is marked converting only once the worker has accepted
    /// the job; on any error the flag and status are left as they were,
    /// except that a busy worker is reported on the status line.
    ///
    /// # Errors
    /// Everything [`prepare`](Self::prepare) returns, plus `Internal` when
    /// this session or `worker` already has a conversion running.
    pub fn start(&mut self, worker: &ConversionWorker) -> Result<WorkerHandle> {
        if self.converting {
            return Err(Img2PdfError::Internal("A conversion is already running".into()));
        }
        let (converter, job) = self.prepare()?;
        match worker.start(converter, job) {
            Ok(handle) => {
                self.converting = true;
                self.status = "Converting...".to_string();
                Ok(handle)
            }
            Err(busy) => {
                self.status = busy.to_string();
                Err(Img2PdfError::Internal(busy.to_string()))
            }
        }
    }

    /// Fold a worker event into the status line.
    pub fn apply_event(&mut self, event: &WorkerEvent) {
        if let Some(text) = event.status_text() {
            self.status = text;
        }
        if event.is_terminal() {
            self.converting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::job::JobOutcome;
    use crate::output::BatchOutput;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(3, 3, Rgb([0, 0, 0])).save(&path).unwrap();
        path
    }

    #[test]
    fn margin_text_parsing() {
        assert_eq!(parse_margin("50").unwrap(), 50.0);
        assert_eq!(parse_margin(" 0 ").unwrap(), 0.0);
        for bad in ["", "abc", "12.5", "-5"] {
            let err = parse_margin(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
            assert!(err.to_string().contains("Invalid margin value"));
        }
    }

    #[test]
    fn selection_deduplicates_by_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png");
        let dotted = dir.path().join(".").join("a.png");

        let mut sel = Selection::new();
        assert_eq!(sel.add_images([&a, &dotted, &a]), 1);
        assert_eq!(sel.images(), &[a]);
    }

    #[test]
    fn adding_a_directory_skips_already_selected_images() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png");
        write_png(dir.path(), "B.JPG");
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut session = Session::new();
        session.add_images([&a]);
        assert_eq!(session.status(), "Selected 1 images");

        assert_eq!(session.add_directory(dir.path()).unwrap(), 1);
        assert_eq!(session.status(), "Added 1 images from directory");
        assert_eq!(session.selection.len(), 2);

        let err = session.add_directory(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoValidImages);

        session.clear();
        assert!(session.selection.is_empty());
        assert_eq!(session.status(), "Cleared all images");
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = Session::new().prepare().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoValidImages);
    }

    #[test]
    fn bad_margin_is_rejected_before_converting() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.add_images([write_png(dir.path(), "a.png")]);

        session.margin_text = "wide".into();
        assert!(session.prepare().is_err());
        session.margin_text = "400".into();
        let err = session.prepare().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(!session.is_converting());
    }

    #[test]
    fn single_mode_defaults_to_converted_images_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.add_images([write_png(dir.path(), "a.png")]);
        session.mode = ConversionMode::Single;
        session.page_size = PageSize::Letter;

        let (converter, job) = session.prepare().unwrap();
        assert_eq!(converter.page().page_size, PageSize::Letter);
        match job {
            ConversionJob::Merge { output, .. } => {
                assert_eq!(output, PathBuf::from(DEFAULT_SINGLE_OUTPUT))
            }
            other => panic!("unexpected job {other:?}"),
        }
        assert!(!session.is_converting());
    }

    #[test]
    fn separate_mode_uses_chosen_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.add_images([write_png(dir.path(), "a.png")]);
        session.output = Some(dir.path().join("pdfs"));

        let (_, job) = session.prepare().unwrap();
        assert_eq!(
            job,
            ConversionJob::Separate {
                images: vec![dir.path().join("a.png")],
                output_dir: Some(dir.path().join("pdfs")),
            }
        );
    }

    #[test]
    fn busy_worker_leaves_session_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.add_images([write_png(dir.path(), "a.png")]);
        session.output = Some(dir.path().to_path_buf());

        let worker = ConversionWorker::new();
        worker.mark_busy();
        let err = session.start(&worker).unwrap_err();
        assert!(matches!(err, Img2PdfError::Internal(_)));
        assert!(!session.is_converting());
        assert_eq!(session.status(), "A conversion is already running");
        assert!(!dir.path().join("a.pdf").exists());
    }

    #[test]
    fn terminal_events_reset_converting_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.add_images([write_png(dir.path(), "a.png")]);
        session.output = Some(dir.path().to_path_buf());
        let worker = ConversionWorker::new();

        let mut handle = session.start(&worker).unwrap();
        assert!(session.is_converting());
        assert_eq!(session.status(), "Converting...");
        assert!(session.start(&worker).is_err());
        handle.join();

        session.apply_event(&WorkerEvent::Finished(JobOutcome::Batch(BatchOutput {
            created: vec![PathBuf::from("a.pdf")],
            failed: vec![],
        })));
        assert!(!session.is_converting());
        assert_eq!(
            session.status(),
            "Conversion completed! Created 1 PDF files."
        );

        session.start(&worker).unwrap().join();
        session.apply_event(&WorkerEvent::Failed(Img2PdfError::Internal("boom".into())));
        assert_eq!(session.status(), "Conversion failed");
        assert!(!session.is_converting());
    }
}
