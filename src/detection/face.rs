//! Face detection boundary
//!
//! Faces are only used to locate skin: each detected box becomes a
//! color-removal region. Detection is advisory, so the pipeline downgrades any
//! detector error to "no faces".

use image::RgbImage;

use crate::{mask::Rect, Result};

/// Pluggable face detection backend.
///
/// Implement this trait to provide a detector (OpenCV cascade, ONNX, etc.) and
/// pass it to [`crate::DominantColor::with_face_detector`]. Closures of the
/// matching signature implement it too.
pub trait FaceDetector: Send + Sync {
    /// Bounding boxes of the faces found in `image`, in its pixel coordinates
    fn detect_faces(&self, image: &RgbImage) -> Result<Vec<Rect>>;
}

/// Detector that never finds anything; the default backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect_faces(&self, _image: &RgbImage) -> Result<Vec<Rect>> {
        Ok(Vec::new())
    }
}

impl<F> FaceDetector for F
where
    F: Fn(&RgbImage) -> Result<Vec<Rect>> + Send + Sync,
{
    fn detect_faces(&self, image: &RgbImage) -> Result<Vec<Rect>> {
        self(image)
    }
}
