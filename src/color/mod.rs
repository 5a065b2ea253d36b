//! Color value type and perceptual distance
//!
//! This module holds the free-standing [`Color`] type used throughout the
//! pipeline, its RGB/HSB/LAB conversions and the CIE94 metric used to merge
//! similar swatches.

pub mod conversion;
pub mod distance;

pub use conversion::{Color, Hsb};
pub use distance::cie94;
