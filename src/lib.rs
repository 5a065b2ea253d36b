//! # Dominant Colors
//!
//! A Rust crate for extracting the dominant colors of a photograph's subject.
//!
//! The pipeline:
//! - Collects caller hints (rectangles, points, detected faces) into a seed mask
//! - Separates subject from background with a pluggable segmentation solver
//! - Clusters the subject's pixels with deterministic k-means, setting aside skin
//! - Merges clusters that are perceptually indistinguishable under CIE94
//!
//! ## Example
//!
//! ```rust,no_run
//! use dominant_colors::{image_loader::load_image, DominantColor};
//! use std::path::Path;
//!
//! let mut analysis = DominantColor::new();
//! analysis.set_image(load_image(Path::new("photo.jpg"))?);
//! analysis.mark_default_area();
//! analysis.grab_cut()?;
//! analysis.k_means(8);
//! analysis.minimize_colors_with_distance_threshold(10.0);
//!
//! for color in analysis.color_array() {
//!     println!("{}", color.to_hex());
//! }
//! # Ok::<(), dominant_colors::DominantColorError>(())
//! ```

pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod image_loader;
pub mod mask;
pub mod pipeline;
pub mod quantize;
pub mod render;

pub use color::{Color, Hsb};
pub use config::{MaskConfig, PipelineConfig, QuantizerConfig, SegmenterConfig};
pub use detection::{ColorModelSegmenter, FaceDetector, NoFaceDetector, SeedSegmenter, Segmenter};
pub use error::{DominantColorError, Result};
pub use mask::{ForegroundMask, MaskLabel, Point, Rect, RegionMark, RegionMask};
pub use pipeline::{DominantColor, PipelineState, Segmentation, Stage};
pub use quantize::Swatch;

#[cfg(feature = "opencv")]
pub use detection::{CascadeFaceDetector, GrabCutSegmenter};
