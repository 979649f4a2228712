//! PDF assembly: one page per image, serialised once at the end.
//!
//! printpdf 0.8 uses a data-oriented API: every page is a `PdfPage` holding a
//! `Vec<Op>`, and images are registered once as XObjects on the document.
//! [`PdfAssembler`] collects pages in memory and only serialises the document
//! in [`PdfAssembler::finish`], so a multi-page merge is never written half
//! done.
//!
//! The output file is written atomically (temp file + rename). An existing
//! file at the destination is replaced.

use crate::config::PageConfig;
use crate::error::{Img2PdfError, Result};
use crate::pipeline::layout::{fit_to_page, Placement};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, XObjectTransform,
};
use std::path::Path;
use tracing::{debug, info};

/// Images are placed at 72 DPI so one pixel is one point before scaling.
const PLACEMENT_DPI: f32 = 72.0;

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Accumulates image pages for one output PDF.
pub struct PdfAssembler {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    page: PageConfig,
}

impl PdfAssembler {
    /// Start a new document titled `title`.
    pub fn new(title: &str, page: PageConfig) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            page,
        }
    }

    /// Add a page showing `image` fitted and centred per the page config.
    pub fn add_image_page(&mut self, image: &RawImage) -> Result<Placement> {
        let placement = fit_to_page(image.width as u32, image.height as u32, &self.page)?;
        let xobject_id = self.doc.add_image(image);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x)),
                translate_y: Some(Pt(placement.y)),
                rotate: None,
                scale_x: Some(placement.scale),
                scale_y: Some(placement.scale),
                dpi: Some(PLACEMENT_DPI),
            },
        }];

        let (page_w, page_h) = self.page.dimensions_pt();
        self.pages
            .push(PdfPage::new(pt_to_mm(page_w), pt_to_mm(page_h), ops));

        debug!(
            page = self.pages.len(),
            width_pt = placement.width,
            height_pt = placement.height,
            x = placement.x,
            y = placement.y,
            scale = placement.scale,
            "Image placed on page"
        );
        Ok(placement)
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialise the document and write it to `output`.
    pub fn finish(mut self, output: &Path) -> Result<usize> {
        if self.pages.is_empty() {
            return Err(Img2PdfError::Internal(
                "refusing to write a PDF without pages".into(),
            ));
        }
        let page_count = self.pages.len();
        self.doc.with_pages(self.pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = self.doc.save(&save_options(), &mut warnings);
        if !warnings.is_empty() {
            debug!("printpdf reported {} warning(s) while saving", warnings.len());
        }

        write_atomic(output, &bytes)?;
        info!(
            "Wrote {} page(s) ({} bytes) to {}",
            page_count,
            bytes.len(),
            output.display()
        );
        Ok(page_count)
    }
}

/// Images are stored as decoded: no downscaling or lossy re-encoding.
fn save_options() -> PdfSaveOptions {
    PdfSaveOptions {
        image_optimization: None,
        ..PdfSaveOptions::default()
    }
}

/// Write `bytes` to `path` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source| Img2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    std::fs::write(&tmp_path, bytes).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}
