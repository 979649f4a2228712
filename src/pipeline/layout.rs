//! Page geometry: fit an image into the drawable area and centre it.
//!
//! One uniform scale factor is applied to both axes, chosen so the image
//! exactly fills the tighter axis of the drawable area. Small images are
//! scaled up to fill it as well; the image never crosses the margins.
//!
//! Offsets are measured from the page's lower-left corner (PDF user space).
//! Because the image is centred, the same numbers hold from the top-left.

use crate::config::PageConfig;
use crate::error::{Img2PdfError, Result};
use serde::{Deserialize, Serialize};

/// Where and how large an image is drawn on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Points per source pixel.
    pub scale: f32,
}

/// Compute the placement of an `img_w` × `img_h` pixel image on `page`.
///
/// # Errors
/// * `InvalidConfig` when the margin leaves no positive drawable area.
/// * `Internal` when either image dimension is zero.
pub fn fit_to_page(img_w: u32, img_h: u32, page: &PageConfig) -> Result<Placement> {
    let (page_w, page_h) = page.dimensions_pt();
    let (avail_w, avail_h) = page.drawable_area();

    if !(avail_w > 0.0 && avail_h > 0.0) {
        return Err(Img2PdfError::InvalidConfig(format!(
            "Margin {}pt leaves no drawable area on a {} page",
            page.margin, page.page_size
        )));
    }
    if img_w == 0 || img_h == 0 {
        return Err(Img2PdfError::Internal(format!(
            "Image has zero size ({img_w}x{img_h})"
        )));
    }

    let scale = (avail_w / img_w as f32).min(avail_h / img_h as f32);
    // Clamp away float overshoot on the constrained axis.
    let width = (img_w as f32 * scale).min(avail_w);
    let height = (img_h as f32 * scale).min(avail_h);

    Ok(Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
        scale,
    })
}
