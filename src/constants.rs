//! Reference values and default tuning parameters for dominant color extraction
//!
//! Compile-time constants grouped by pipeline stage. Runtime overrides live in
//! [`crate::config::PipelineConfig`], whose defaults are taken from here.

/// D65 Standard Illuminant Reference
///
/// CIE Standard Illuminant D65 represents average daylight. All LAB values in
/// this crate are relative to this white point.
pub mod d65 {
    /// D65 white point in CIE XYZ color space (Y normalized to 1.0)
    /// Source: CIE 15:2004 Colorimetry, 3rd edition
    pub const WHITE_POINT_XYZ: [f32; 3] = [0.95047, 1.00000, 1.08883];
}

/// Re-export D65 white point at top level for convenience
pub const D65_WHITE_POINT_XYZ: [f32; 3] = d65::WHITE_POINT_XYZ;

/// Region mask construction
pub mod mask {
    /// Fraction by which a marked rectangle grows before rasterization.
    /// The growth ring is marked as background.
    pub const BORDER_PERCENT: f32 = 0.03;

    /// Margin on each side of the image left outside the default area
    pub const DEFAULT_AREA_MARGIN_PERCENT: f32 = 0.03;

    /// Side fraction of the centered sub-rectangle that may be forced to foreground
    pub const FORCE_FOREGROUND_RECT_PERCENT: f32 = 0.5;

    /// Foreground coverage below which the forced sub-rectangle kicks in
    pub const FORCE_FOREGROUND_PIXEL_PERCENT: f32 = 0.1;
}

/// Working image size
pub mod working {
    /// Target pixel count of the analyzed image; larger inputs are downscaled
    pub const MAX_PIXELS: u32 = 30_000;
}

/// Segmentation solver defaults
pub mod segmentation {
    /// Iterations used when the caller gives no hint
    pub const DEFAULT_ITERATIONS: u32 = 5;
}

/// K-means clustering
pub mod quantizer {
    /// Upper bound on reassignment/recompute rounds
    pub const MAX_ITERATIONS: usize = 20;

    /// Default number of clusters for callers without a preference
    pub const DEFAULT_CLUSTERS: usize = 8;

    /// A swatch is removed when its color-removal tally exceeds this
    /// fraction of its pixel count
    pub const COLOR_REMOVAL_RATIO: f32 = 0.5;
}

/// Perceptual merging
pub mod merge {
    /// CIE94 distance between pure black and pure white
    pub const MAX_DISTANCE: f32 = 116.0;

    /// Threshold suggested for collapsing barely distinguishable swatches
    pub const DEFAULT_THRESHOLD: f32 = 10.0;
}
