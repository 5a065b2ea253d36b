//! External collaborator boundaries: segmentation and face detection
//!
//! The pipeline only depends on the [`Segmenter`] and [`FaceDetector`]
//! contracts. Pure-Rust defaults live here; OpenCV implementations are
//! available behind the `opencv` feature.

pub mod face;
pub mod segmenter;

#[cfg(feature = "opencv")]
pub mod cv;

pub use face::{FaceDetector, NoFaceDetector};
pub use segmenter::{ColorModelSegmenter, SeedSegmenter, Segmenter};

#[cfg(feature = "opencv")]
pub use cv::{CascadeFaceDetector, GrabCutSegmenter};
