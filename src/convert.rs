//! Conversion entry points.
//!
//! [`Converter`] holds an immutable [`ConversionConfig`] and exposes the
//! operations front ends call:
//!
//! | Operation | Output | Per-item failure |
//! |-----------|--------|------------------|
//! | [`Converter::convert_image`] | one PDF | fatal |
//! | [`Converter::merge_images`] | one multi-page PDF | skipped + logged |
//! | [`Converter::convert_images`] | one PDF per image | recorded, batch continues |
//! | [`Converter::convert_directory`] | one PDF per image in a directory | recorded, batch continues |
//! | [`Converter::merge_directory`] | one multi-page PDF from a directory | skipped + logged |
//!
//! Everything runs synchronously on the calling thread. Use
//! [`crate::worker`] to keep an interactive front end responsive.

use crate::config::{ConversionConfig, PageConfig};
use crate::error::{Img2PdfError, ItemError, Result};
use crate::output::{BatchOutput, FailedImage, MergeOutput, SkippedImage};
use crate::pipeline::layout::{fit_to_page, Placement};
use crate::pipeline::{decode, input, render};
use crate::progress::ProgressCallback;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Converts raster images to PDF pages of a fixed size and margin.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    /// Create a converter, re-validating the page geometry.
    pub fn new(config: ConversionConfig) -> Result<Self> {
        config.page.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn page(&self) -> PageConfig {
        self.config.page
    }

    /// A copy of this converter reporting to `cb` instead.
    pub fn with_progress_callback(&self, cb: ProgressCallback) -> Self {
        let mut config = self.config.clone();
        config.progress_callback = Some(cb);
        Self { config }
    }

    /// The placement `image` would get, without writing anything.
    pub fn layout_for(&self, image: &Path) -> Result<Placement> {
        input::validate_image_path(image)?;
        let header = input::ImageRef::read_header(image)?;
        fit_to_page(header.width, header.height, &self.config.page)
    }

    // ── Single image ──────────────────────────────────────────────────────

    /// Convert one image into a one-page PDF.
    ///
    /// `output` defaults to the image path with a `.pdf` extension. An
    /// existing file at the output path is overwritten.
    ///
    /// # Errors
    /// `FileNotFound`, `UnsupportedFormat`, decode and write failures.
    pub fn convert_image(&self, image: &Path, output: Option<&Path>) -> Result<PathBuf> {
        input::validate_image_path(image)?;
        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input::default_output_path(image));

        let raw = decode::load_raw_image(image)?;
        let mut assembler = render::PdfAssembler::new(&document_title(image), self.config.page);
        assembler.add_image_page(&raw)?;
        assembler.finish(&output_path)?;

        info!("Converted: {} → {}", image.display(), output_path.display());
        Ok(output_path)
    }

    // ── Merge ─────────────────────────────────────────────────────────────

    /// Merge `images` into one PDF at `output`, one page per image in input
    /// order.
    ///
    /// Missing files, unsupported extensions, and images that fail to decode
    /// are skipped with a warning. The file is written once, after the last
    /// page has been drawn.
    ///
    /// # Errors
    /// `NoValidImages` when nothing survives; write failures.
    pub fn merge_images<P: AsRef<Path>>(&self, images: &[P], output: &Path) -> Result<MergeOutput> {
        let mut rejected: Vec<Option<ItemError>> = Vec::with_capacity(images.len());
        for image in images {
            let image = image.as_ref();
            let verdict = input::validate_image_path(image).err().map(|e| {
                warn!("Skipping {}: {}", image.display(), ItemError::from(&e));
                ItemError::from(&e)
            });
            rejected.push(verdict);
        }

        let valid_count = rejected.iter().filter(|r| r.is_none()).count();
        if valid_count == 0 {
            return Err(Img2PdfError::NoValidImages {
                skipped: images.len(),
            });
        }

        let total = images.len();
        self.notify(|cb| cb.on_batch_start(total));

        let mut assembler = render::PdfAssembler::new(&document_title(output), self.config.page);
        let mut pages = Vec::with_capacity(valid_count);
        let mut skipped = Vec::new();

        for (i, (image, verdict)) in images.iter().zip(rejected).enumerate() {
            let image = image.as_ref();
            let index = i + 1;

            if let Some(reason) = verdict {
                self.notify(|cb| cb.on_item_error(index, total, image, &reason.to_string()));
                skipped.push(SkippedImage {
                    path: image.to_path_buf(),
                    reason,
                });
                continue;
            }

            self.notify(|cb| cb.on_item_start(index, total, image));
            let placed = decode::load_raw_image(image)
                .and_then(|raw| assembler.add_image_page(&raw).map(|_| ()));

            match placed {
                Ok(()) => {
                    info!("Added to PDF: {}", image.display());
                    self.notify(|cb| cb.on_item_complete(index, total, image));
                    pages.push(image.to_path_buf());
                }
                Err(e) => {
                    warn!("Skipping {}: {}", image.display(), e);
                    self.notify(|cb| cb.on_item_error(index, total, image, &e.to_string()));
                    skipped.push(SkippedImage {
                        path: image.to_path_buf(),
                        reason: ItemError::from(&e),
                    });
                }
            }
        }

        if pages.is_empty() {
            self.notify(|cb| cb.on_batch_complete(total, 0));
            return Err(Img2PdfError::NoValidImages {
                skipped: skipped.len(),
            });
        }

        let result = assembler.finish(output);
        self.notify(|cb| cb.on_batch_complete(total, if result.is_ok() { pages.len() } else { 0 }));
        result?;

        info!(
            "Created multi-page PDF: {} ({} pages, {} skipped)",
            output.display(),
            pages.len(),
            skipped.len()
        );
        Ok(MergeOutput {
            output_path: output.to_path_buf(),
            pages,
            skipped,
        })
    }

    /// Merge every supported image directly inside `dir` into `output`.
    ///
    /// Images are taken in file-name order.
    pub fn merge_directory(&self, dir: &Path, output: &Path) -> Result<MergeOutput> {
        let images = input::discover_images(dir)?;
        if images.is_empty() {
            info!("No supported image files found in: {}", dir.display());
            return Err(Img2PdfError::NoValidImages { skipped: 0 });
        }
        self.merge_images(&images, output)
    }

    // ── Batch ─────────────────────────────────────────────────────────────

    /// Convert each image into its own PDF.
    ///
    /// With `output_dir`, each PDF is written as `<output_dir>/<stem>.pdf`
    /// (the directory is created if needed); otherwise next to its image.
    /// A failing image is recorded and the batch moves on.
    ///
    /// # Errors
    /// Only when `output_dir` cannot be created.
    pub fn convert_images<P: AsRef<Path>>(
        &self,
        images: &[P],
        output_dir: Option<&Path>,
    ) -> Result<BatchOutput> {
        if let Some(dir) = output_dir {
            std::fs::create_dir_all(dir).map_err(|e| Img2PdfError::OutputWriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let total = images.len();
        self.notify(|cb| cb.on_batch_start(total));

        let mut out = BatchOutput::default();
        let mut targets: HashSet<PathBuf> = HashSet::new();

        for (i, image) in images.iter().enumerate() {
            let image = image.as_ref();
            let index = i + 1;
            let target = match output_dir {
                Some(dir) => input::output_in_dir(dir, image),
                None => input::default_output_path(image),
            };
            if !targets.insert(target.clone()) {
                warn!(
                    "{} overwrites an earlier output of this batch: {}",
                    image.display(),
                    target.display()
                );
            }

            self.notify(|cb| cb.on_item_start(index, total, image));
            match self.convert_image(image, Some(&target)) {
                Ok(path) => {
                    self.notify(|cb| cb.on_item_complete(index, total, image));
                    out.created.push(path);
                }
                Err(e) => {
                    warn!("Error converting {}: {}", image.display(), e);
                    self.notify(|cb| cb.on_item_error(index, total, image, &e.to_string()));
                    out.failed.push(FailedImage {
                        path: image.to_path_buf(),
                        error: ItemError::from(&e),
                    });
                }
            }
        }

        self.notify(|cb| cb.on_batch_complete(total, out.created.len()));
        info!(
            "Batch conversion completed. Created {} PDF files ({} failed).",
            out.created.len(),
            out.failed.len()
        );
        Ok(out)
    }

    /// Convert every supported image directly inside `dir` to its own PDF.
    ///
    /// `output_dir` defaults to `dir` itself.
    ///
    /// # Errors
    /// `FileNotFound` / `NotADirectory` for `dir`; `NoValidImages` when it
    /// holds no supported file. Failures of individual images are recorded
    /// in the returned [`BatchOutput`].
    pub fn convert_directory(&self, dir: &Path, output_dir: Option<&Path>) -> Result<BatchOutput> {
        let images = input::discover_images(dir)?;
        if images.is_empty() {
            info!("No supported image files found in: {}", dir.display());
            return Err(Img2PdfError::NoValidImages { skipped: 0 });
        }
        debug!("Batch over {} images from {}", images.len(), dir.display());
        self.convert_images(&images, Some(output_dir.unwrap_or(dir)))
    }

    fn notify(&self, f: impl FnOnce(&ProgressCallback)) {
        if let Some(ref cb) = self.config.progress_callback {
            f(cb);
        }
    }
}

/// PDF /Title: the file stem of `path`.
fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Images".to_string())
}
