//! Configuration structures for the dominant color pipeline.
//!
//! All tunable parameters, grouped by pipeline stage. Configuration can be
//! loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use dominant_colors::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), dominant_colors::DominantColorError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`MaskConfig`]: region mark rasterization and forced foreground
//! - [`SegmenterConfig`]: solver iteration hint
//! - [`QuantizerConfig`]: k-means and color removal

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{constants, DominantColorError, Result};

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Target pixel count of the working image; `0` disables downscaling
    pub max_pixels: u32,

    #[serde(default)]
    pub mask: MaskConfig,

    #[serde(default)]
    pub segmenter: SegmenterConfig,

    #[serde(default)]
    pub quantizer: QuantizerConfig,
}

/// Region mark rasterization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Fraction by which marked rectangles grow; the ring becomes background
    pub border_percent: f32,

    /// Margin left outside the default area on each side of the image
    pub default_area_margin_percent: f32,

    /// Side fraction of the centered sub-rectangle that may be forced to foreground
    pub force_foreground_rect_percent: f32,

    /// Foreground coverage of a mark below which the sub-rectangle is forced
    pub force_foreground_pixel_percent: f32,
}

/// Segmentation solver parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Iteration hint passed to the solver
    pub iterations: u32,
}

/// K-means and color removal parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizerConfig {
    /// Upper bound on k-means rounds
    pub max_iterations: usize,

    /// Removal tally / pixel count ratio above which a swatch is removed
    pub color_removal_ratio: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pixels: constants::working::MAX_PIXELS,
            mask: MaskConfig::default(),
            segmenter: SegmenterConfig::default(),
            quantizer: QuantizerConfig::default(),
        }
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            border_percent: constants::mask::BORDER_PERCENT,
            default_area_margin_percent: constants::mask::DEFAULT_AREA_MARGIN_PERCENT,
            force_foreground_rect_percent: constants::mask::FORCE_FOREGROUND_RECT_PERCENT,
            force_foreground_pixel_percent: constants::mask::FORCE_FOREGROUND_PIXEL_PERCENT,
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            iterations: constants::segmentation::DEFAULT_ITERATIONS,
        }
    }
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: constants::quantizer::MAX_ITERATIONS,
            color_removal_ratio: constants::quantizer::COLOR_REMOVAL_RATIO,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DominantColorError::config(format!("Failed to read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            DominantColorError::config(format!("Failed to parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DominantColorError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            DominantColorError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Reject parameters outside their meaningful ranges
    pub fn validate(&self) -> Result<()> {
        let fraction = |name: &str, value: f32, max: f32| {
            if (0.0..=max).contains(&value) {
                Ok(())
            } else {
                Err(DominantColorError::invalid_parameter(name, value))
            }
        };

        fraction("mask.border_percent", self.mask.border_percent, 0.5)?;
        fraction(
            "mask.default_area_margin_percent",
            self.mask.default_area_margin_percent,
            0.49,
        )?;
        fraction(
            "mask.force_foreground_rect_percent",
            self.mask.force_foreground_rect_percent,
            1.0,
        )?;
        fraction(
            "mask.force_foreground_pixel_percent",
            self.mask.force_foreground_pixel_percent,
            1.0,
        )?;
        if !(self.quantizer.color_removal_ratio >= 0.0) {
            return Err(DominantColorError::invalid_parameter(
                "quantizer.color_removal_ratio",
                self.quantizer.color_removal_ratio,
            ));
        }
        if self.quantizer.max_iterations == 0 {
            return Err(DominantColorError::invalid_parameter(
                "quantizer.max_iterations",
                0,
            ));
        }
        Ok(())
    }
}
