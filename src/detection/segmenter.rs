//! Segmentation solver boundary
//!
//! A [`Segmenter`] turns the four-level seed mask into a binary foreground
//! mask. The contract every implementation honors:
//! - definite labels are never reassigned
//! - a seed without any foreground label yields an all-background mask
//!
//! [`ColorModelSegmenter`] is the built-in solver: it resolves probable pixels
//! against mean-color models of the current foreground and background. The
//! `opencv` feature adds a GrabCut-backed solver.

use image::RgbImage;
use log::debug;
use rayon::prelude::*;

use crate::{
    mask::{ForegroundMask, MaskLabel, RegionMask},
    DominantColorError, Result,
};

/// Refines a seed mask into a binary foreground mask
pub trait Segmenter: Send + Sync {
    /// Resolve the probable labels of `mask` over `image`
    ///
    /// # Arguments
    ///
    /// * `image` - Working image, same size as `mask`
    /// * `mask` - Four-level seed mask
    /// * `iterations` - Iteration hint; solvers may stop earlier
    ///
    /// # Errors
    ///
    /// Returns `DominantColorError::Segmentation` when the solver fails.
    fn refine(&self, image: &RgbImage, mask: &RegionMask, iterations: u32) -> Result<ForegroundMask>;
}

/// Resolves probable labels without looking at the image
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedSegmenter;

impl Segmenter for SeedSegmenter {
    fn refine(&self, image: &RgbImage, mask: &RegionMask, _iterations: u32) -> Result<ForegroundMask> {
        check_dimensions(image, mask)?;
        Ok(ForegroundMask::from_seed(mask))
    }
}

/// Two-class nearest-mean solver
///
/// Each round computes the mean RGB color of the current foreground and
/// background, then moves every probable pixel to the side whose mean is
/// strictly closer. Pixels equidistant from both means keep their side. Stops
/// after `iterations` rounds or once no pixel moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorModelSegmenter;

impl ColorModelSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl Segmenter for ColorModelSegmenter {
    fn refine(&self, image: &RgbImage, mask: &RegionMask, iterations: u32) -> Result<ForegroundMask> {
        check_dimensions(image, mask)?;

        let (width, height) = image.dimensions();
        if !mask.has_foreground() {
            return Ok(ForegroundMask::background(width, height));
        }

        let mut current = ForegroundMask::from_seed(mask);
        for round in 0..iterations {
            let Some((fg_mean, bg_mean)) = class_means(image, &current) else {
                debug!("segmenter round {round}: single class, nothing to separate");
                break;
            };

            let next: Vec<bool> = mask
                .labels()
                .par_iter()
                .zip(image.as_raw().par_chunks_exact(3))
                .zip(current.as_slice().par_iter())
                .map(|((label, pixel), &was_foreground)| {
                    if label.is_definite() {
                        return *label == MaskLabel::Foreground;
                    }
                    let d_fg = squared_distance(pixel, fg_mean);
                    let d_bg = squared_distance(pixel, bg_mean);
                    if d_fg < d_bg {
                        true
                    } else if d_bg < d_fg {
                        false
                    } else {
                        was_foreground
                    }
                })
                .collect();

            let changed = next
                .iter()
                .zip(current.as_slice())
                .filter(|(a, b)| a != b)
                .count();
            current = ForegroundMask::from_vec(width, height, next)
                .ok_or_else(|| DominantColorError::Processing("segmenter mask size".into()))?;

            debug!("segmenter round {round}: {changed} pixels changed side");
            if changed == 0 {
                break;
            }
        }

        Ok(current)
    }
}

fn check_dimensions(image: &RgbImage, mask: &RegionMask) -> Result<()> {
    let (width, height) = image.dimensions();
    if mask.width() != width || mask.height() != height {
        return Err(DominantColorError::MaskDimensions {
            width,
            height,
            actual_width: mask.width(),
            actual_height: mask.height(),
        });
    }
    Ok(())
}

/// Mean colors of the foreground and background, if both are non-empty
fn class_means(image: &RgbImage, mask: &ForegroundMask) -> Option<([f64; 3], [f64; 3])> {
    let mut sums = [[0.0f64; 3]; 2];
    let mut counts = [0usize; 2];
    for (pixel, &fg) in image.as_raw().chunks_exact(3).zip(mask.as_slice()) {
        let class = usize::from(fg);
        counts[class] += 1;
        for channel in 0..3 {
            sums[class][channel] += pixel[channel] as f64;
        }
    }
    if counts[0] == 0 || counts[1] == 0 {
        return None;
    }
    let mean = |class: usize| sums[class].map(|s| s / counts[class] as f64);
    Some((mean(1), mean(0)))
}

fn squared_distance(pixel: &[u8], mean: [f64; 3]) -> f64 {
    pixel
        .iter()
        .zip(mean)
        .map(|(&p, m)| (p as f64 - m).powi(2))
        .sum()
}
