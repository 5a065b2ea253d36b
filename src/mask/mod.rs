//! Region marking and mask rasterization
//!
//! Callers describe the subject with [`RegionMark`]s; the marks are overlaid
//! in insertion order into a [`RegionMask`] that seeds the segmentation
//! solver, which in turn produces a [`ForegroundMask`].

pub mod mark;
pub mod region_mask;

pub use mark::{Point, Rect, RegionMark};
pub use region_mask::{ForegroundMask, MaskLabel, RegionMask};
