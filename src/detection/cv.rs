//! OpenCV-backed collaborators (feature `opencv`)
//!
//! - [`GrabCutSegmenter`]: `cv::grabCut` initialized from the seed mask
//! - [`CascadeFaceDetector`]: Haar cascade frontal face detection

use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use log::debug;
use opencv::{
    core::{Mat, Rect as CvRect, Size, Vec3b, Vector, CV_8UC1, CV_8UC3},
    imgproc, objdetect,
    prelude::*,
};

use super::{FaceDetector, Segmenter};
use crate::{
    mask::{ForegroundMask, MaskLabel, Rect, RegionMask},
    DominantColorError, Result,
};

/// Convert an RGB image to an OpenCV BGR Mat
fn rgb_to_bgr_mat(image: &RgbImage) -> opencv::Result<Mat> {
    let (width, height) = image.dimensions();
    let mut mat = Mat::zeros(height as i32, width as i32, CV_8UC3)?.to_mat()?;
    for (x, y, rgb) in image.enumerate_pixels() {
        let pixel = mat.at_2d_mut::<Vec3b>(y as i32, x as i32)?;
        pixel[0] = rgb[2];
        pixel[1] = rgb[1];
        pixel[2] = rgb[0];
    }
    Ok(mat)
}

fn label_to_gc(label: MaskLabel) -> u8 {
    let value = match label {
        MaskLabel::Background => imgproc::GC_BGD,
        MaskLabel::ProbableBackground => imgproc::GC_PR_BGD,
        MaskLabel::ProbableForeground => imgproc::GC_PR_FGD,
        MaskLabel::Foreground => imgproc::GC_FGD,
    };
    value as u8
}

/// Segmenter running OpenCV's GrabCut with mask initialization
#[derive(Debug, Clone, Copy, Default)]
pub struct GrabCutSegmenter;

impl GrabCutSegmenter {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, image: &RgbImage, mask: &RegionMask, iterations: u32) -> opencv::Result<Vec<bool>> {
        let (width, height) = image.dimensions();
        let bgr = rgb_to_bgr_mat(image)?;

        let mut gc_mask = Mat::zeros(height as i32, width as i32, CV_8UC1)?.to_mat()?;
        for y in 0..height {
            for x in 0..width {
                *gc_mask.at_2d_mut::<u8>(y as i32, x as i32)? = label_to_gc(mask.label(x, y));
            }
        }

        let mut bgd_model = Mat::default();
        let mut fgd_model = Mat::default();
        imgproc::grab_cut(
            &bgr,
            &mut gc_mask,
            CvRect::default(),
            &mut bgd_model,
            &mut fgd_model,
            iterations.max(1) as i32,
            imgproc::GC_INIT_WITH_MASK,
        )?;

        let fgd = imgproc::GC_FGD as u8;
        let pr_fgd = imgproc::GC_PR_FGD as u8;
        let mut result = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let value = *gc_mask.at_2d::<u8>(y as i32, x as i32)?;
                result.push(value == fgd || value == pr_fgd);
            }
        }
        Ok(result)
    }
}

impl Segmenter for GrabCutSegmenter {
    fn refine(&self, image: &RgbImage, mask: &RegionMask, iterations: u32) -> Result<ForegroundMask> {
        let (width, height) = image.dimensions();
        if mask.width() != width || mask.height() != height {
            return Err(DominantColorError::MaskDimensions {
                width,
                height,
                actual_width: mask.width(),
                actual_height: mask.height(),
            });
        }
        if !mask.has_foreground() {
            return Ok(ForegroundMask::background(width, height));
        }
        // GrabCut needs samples of both classes to fit its color models
        if mask.labels().iter().all(|label| label.is_foreground()) {
            debug!("grabCut skipped: seed mask has no background samples");
            return Ok(ForegroundMask::from_seed(mask));
        }

        let data = self
            .run(image, mask, iterations)
            .map_err(|e| DominantColorError::segmentation("cv::grabCut failed", e))?;
        ForegroundMask::from_vec(width, height, data)
            .ok_or_else(|| DominantColorError::Processing("grabCut mask size".into()))
    }
}

/// Haar cascade face detector
pub struct CascadeFaceDetector {
    classifier: Mutex<objdetect::CascadeClassifier>,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: i32,
}

impl CascadeFaceDetector {
    /// Load a cascade file such as `haarcascade_frontalface_alt2.xml`
    ///
    /// # Errors
    ///
    /// Returns `DominantColorError::FaceDetection` if the file cannot be
    /// loaded or holds no cascade.
    pub fn new(cascade_path: &Path) -> Result<Self> {
        let path = cascade_path.to_str().ok_or_else(|| {
            DominantColorError::invalid_parameter("cascade_path", cascade_path.display())
        })?;
        let classifier = objdetect::CascadeClassifier::new(path)
            .map_err(|e| DominantColorError::face_detection("Failed to load cascade", e))?;
        let empty = classifier
            .empty()
            .map_err(|e| DominantColorError::face_detection("Failed to inspect cascade", e))?;
        if empty {
            return Err(DominantColorError::FaceDetection {
                message: format!("No cascade found in {}", cascade_path.display()),
                source: None,
            });
        }
        Ok(Self {
            classifier: Mutex::new(classifier),
            scale_factor: 1.1,
            min_neighbors: 3,
            min_size: 30,
        })
    }

    /// Override the detection window parameters
    pub fn with_params(mut self, scale_factor: f64, min_neighbors: i32, min_size: i32) -> Self {
        self.scale_factor = scale_factor;
        self.min_neighbors = min_neighbors;
        self.min_size = min_size;
        self
    }

    fn run(&self, image: &RgbImage) -> opencv::Result<Vec<Rect>> {
        let bgr = rgb_to_bgr_mat(image)?;
        let mut gray = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        let mut equalized = Mat::default();
        imgproc::equalize_hist(&gray, &mut equalized)?;

        let mut faces = Vector::<CvRect>::new();
        let mut classifier = self
            .classifier
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        classifier.detect_multi_scale(
            &equalized,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(self.min_size, self.min_size),
            Size::default(),
        )?;

        Ok(faces
            .iter()
            .map(|face| Rect::new(face.x, face.y, face.width, face.height))
            .collect())
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect_faces(&self, image: &RgbImage) -> Result<Vec<Rect>> {
        self.run(image)
            .map_err(|e| DominantColorError::face_detection("cascade detection failed", e))
    }
}
