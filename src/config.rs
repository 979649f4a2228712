//! Configuration types for image-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The page geometry lives in a small
//! `Copy` value, [`PageConfig`], which is fixed for the lifetime of a
//! [`crate::Converter`]: there are no process-wide defaults to mutate.

use crate::error::Img2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default page margin in points.
pub const DEFAULT_MARGIN_PT: f32 = 50.0;

/// Output page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4, 595 × 842 pt. (default)
    #[default]
    A4,
    /// US Letter, 612 × 792 pt.
    Letter,
}

impl PageSize {
    /// Page dimensions in PDF points (width, height), portrait.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageSize {
    type Err = Img2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(Img2PdfError::InvalidConfig(format!(
                "Unknown page size '{other}' (expected A4 or Letter)"
            ))),
        }
    }
}

/// Page size plus margin: everything the layout step needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_size: PageSize,
    /// Margin on every side, in points.
    pub margin: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: DEFAULT_MARGIN_PT,
        }
    }
}

impl PageConfig {
    /// Page dimensions in points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        self.page_size.dimensions_pt()
    }

    /// Page dimensions minus twice the margin on each axis.
    ///
    /// May be zero or negative for an oversized margin; see [`Self::validate`].
    pub fn drawable_area(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_pt();
        (w - 2.0 * self.margin, h - 2.0 * self.margin)
    }

    /// Reject margins that are negative, non-finite, or leave no drawable area.
    pub fn validate(&self) -> Result<(), Img2PdfError> {
        if !self.margin.is_finite() {
            return Err(Img2PdfError::InvalidConfig(format!(
                "Margin must be a finite number, got {}",
                self.margin
            )));
        }
        if self.margin < 0.0 {
            return Err(Img2PdfError::InvalidConfig(format!(
                "Margin must be ≥ 0, got {}",
                self.margin
            )));
        }
        let (avail_w, avail_h) = self.drawable_area();
        if avail_w <= 0.0 || avail_h <= 0.0 {
            let (w, h) = self.dimensions_pt();
            return Err(Img2PdfError::InvalidConfig(format!(
                "Margin {}pt leaves no drawable area on a {} page ({}×{}pt)",
                self.margin, self.page_size, w, h
            )));
        }
        Ok(())
    }
}

/// Configuration for a [`crate::Converter`].
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`] (A4, 50 pt margin).
///
/// # Example
/// ```rust
/// use edgequake_img2pdf::{ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::Letter)
///     .margin(36.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.page.margin, 36.0);
/// ```
#[derive(Clone, Default)]
pub struct ConversionConfig {
    /// Page size and margin applied to every page.
    pub page: PageConfig,

    /// Progress callback for per-image events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("page", &self.page)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page.page_size = size;
        self
    }

    pub fn margin(mut self, points: f32) -> Self {
        self.config.page.margin = points;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating the page geometry.
    pub fn build(self) -> Result<ConversionConfig, Img2PdfError> {
        self.config.page.validate()?;
        Ok(self.config)
    }
}
