//! Color quantization: k-means clustering, swatch bookkeeping and merging

pub mod kmeans;
pub mod merge;
pub mod swatch;

pub use kmeans::{Quantization, Quantizer};
pub use merge::merge_swatches;
pub use swatch::{palette_indices, resolve_survivor, Swatch, IMPORTANCE_UNSET};
