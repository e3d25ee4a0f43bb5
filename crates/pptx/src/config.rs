//! Renderer configuration.

use serde::{Deserialize, Serialize};
use slides_core::{Error, Result};
use std::path::Path;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Convert inches to EMUs.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH).round() as i64
}

/// Page geometry, fonts, theme and footer settings for PPTX output.
///
/// Every field has a default, so a YAML config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PptxConfig {
    /// Aspect ratio label, e.g. "16:9".
    pub aspect_ratio: String,

    /// Nominal image resolution. Stored with the configuration only.
    pub dpi: u32,

    /// Font for all non-code text.
    pub default_font: String,

    /// Monospace font for code slides.
    pub code_font: String,

    /// Name of the color theme.
    pub theme: String,

    /// Whether slides get a footer.
    pub include_footer: bool,

    /// Whether the footer shows "n/total".
    pub include_slide_numbers: bool,

    /// Page width in inches.
    pub page_width: f64,

    /// Page height in inches.
    pub page_height: f64,

    /// Left/right page margin in inches.
    pub margin: f64,
}

impl Default for PptxConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: "16:9".to_string(),
            dpi: 300,
            default_font: "San Francisco".to_string(),
            code_font: "Monaco".to_string(),
            theme: "technical".to_string(),
            include_footer: true,
            include_slide_numbers: true,
            page_width: 10.0,
            page_height: 5.625,
            margin: 0.5,
        }
    }
}

impl PptxConfig {
    /// Create a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Set the color theme by name.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Set the aspect ratio ("W:H"), recomputing the page height from the width.
    ///
    /// An unparseable ratio is rejected and the current geometry is kept.
    pub fn with_aspect_ratio(mut self, ratio: &str) -> Result<Self> {
        let (w, h) = parse_ratio(ratio)
            .ok_or_else(|| Error::ConfigError(format!("Invalid aspect ratio: {}", ratio)))?;

        self.aspect_ratio = ratio.trim().to_string();
        self.page_height = self.page_width * h / w;
        Ok(self)
    }

    /// Set the font for non-code text.
    pub fn with_default_font(mut self, font: impl Into<String>) -> Self {
        self.default_font = font.into();
        self
    }

    /// Set the font for code listings.
    pub fn with_code_font(mut self, font: impl Into<String>) -> Self {
        self.code_font = font.into();
        self
    }

    /// Enable or disable the footer.
    pub fn with_footer(mut self, include: bool) -> Self {
        self.include_footer = include;
        self
    }

    /// Enable or disable slide numbers in the footer.
    pub fn with_slide_numbers(mut self, include: bool) -> Self {
        self.include_slide_numbers = include;
        self
    }

    /// Width available between the margins, in inches.
    pub fn content_width(&self) -> f64 {
        (self.page_width - 2.0 * self.margin).max(0.0)
    }

    /// Slide size in EMUs.
    pub fn slide_size_emu(&self) -> (i64, i64) {
        (inches(self.page_width), inches(self.page_height))
    }
}

/// Parse "W:H" into positive numbers.
fn parse_ratio(ratio: &str) -> Option<(f64, f64)> {
    let (w, h) = ratio.trim().split_once(':')?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;

    (w > 0.0 && h > 0.0).then_some((w, h))
}
