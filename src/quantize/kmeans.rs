//! Deterministic k-means clustering in RGB
//!
//! Seeding sorts the pixel population by luminance (ties broken by the raw
//! channels) and picks the centers of `k` equal-sized strata, so identical
//! input always yields identical swatches. Each round reassigns every pixel
//! to its nearest centroid (Euclidean RGB, ties to the lower index) and then
//! recomputes the centroids. Iteration stops once no pixel changes cluster or
//! the round cap is hit. A cluster that loses all its pixels keeps its last
//! centroid and ends with a zero pixel count.

use log::debug;
use rayon::prelude::*;

use super::swatch::Swatch;
use crate::{color::Color, config::QuantizerConfig, constants};

/// K-means quantizer over foreground pixels
#[derive(Debug, Clone)]
pub struct Quantizer {
    max_iterations: usize,
    color_removal_ratio: f32,
}

/// Quantizer output
#[derive(Debug, Clone, PartialEq)]
pub struct Quantization {
    /// One swatch per cluster, `k` in total (empty for empty input)
    pub swatches: Vec<Swatch>,
    /// Cluster index of every input pixel
    pub labels: Vec<usize>,
    /// Nearest cluster of every color-removal pixel
    pub removal_labels: Vec<usize>,
    /// Rounds actually run
    pub iterations: usize,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Quantizer {
    /// Create a quantizer with default parameters
    pub fn new() -> Self {
        Self {
            max_iterations: constants::quantizer::MAX_ITERATIONS,
            color_removal_ratio: constants::quantizer::COLOR_REMOVAL_RATIO,
        }
    }

    /// Create a quantizer with custom parameters
    pub fn with_params(max_iterations: usize, color_removal_ratio: f32) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            color_removal_ratio,
        }
    }

    pub fn from_config(config: &QuantizerConfig) -> Self {
        Self::with_params(config.max_iterations, config.color_removal_ratio)
    }

    /// Cluster `pixels` into `k` swatches
    ///
    /// # Arguments
    ///
    /// * `pixels` - Foreground pixels, color-removal pixels excluded
    /// * `removal_pixels` - Foreground pixels inside color-removal regions;
    ///   tallied against the nearest centroid without moving it
    /// * `k` - Number of clusters
    ///
    /// # Returns
    ///
    /// `Quantization` with `k` swatches whose pixel counts sum to
    /// `pixels.len()`, or no swatches at all when `pixels` is empty or `k` is 0
    pub fn quantize(&self, pixels: &[[u8; 3]], removal_pixels: &[[u8; 3]], k: usize) -> Quantization {
        if pixels.is_empty() || k == 0 {
            return Quantization {
                swatches: Vec::new(),
                labels: Vec::new(),
                removal_labels: Vec::new(),
                iterations: 0,
            };
        }

        let mut centroids = seed_centroids(pixels, k);
        let mut labels = assign(pixels, &centroids);
        let mut iterations = 1;

        while iterations < self.max_iterations {
            centroids = recompute_centroids(pixels, &labels, &centroids);
            let next = assign(pixels, &centroids);
            iterations += 1;
            let changed = next.iter().zip(&labels).filter(|(a, b)| a != b).count();
            labels = next;
            if changed == 0 {
                break;
            }
        }
        centroids = recompute_centroids(pixels, &labels, &centroids);

        let mut swatches: Vec<Swatch> = centroids
            .iter()
            .map(|c| {
                let [r, g, b] = c.map(|channel| (channel / 255.0) as f32);
                Swatch::new(Color::new(r, g, b))
            })
            .collect();
        for &label in &labels {
            swatches[label].pixel_count += 1;
        }

        let removal_labels = assign(removal_pixels, &centroids);
        for &label in &removal_labels {
            swatches[label].color_removal_pixel_count += 1;
        }

        for swatch in &mut swatches {
            swatch.apply_color_removal(self.color_removal_ratio);
            swatch.compute_importance();
        }

        debug!(
            "k-means: {} pixels, k = {}, {} rounds, {} removed swatches",
            pixels.len(),
            k,
            iterations,
            swatches.iter().filter(|s| s.removed).count()
        );

        Quantization {
            swatches,
            labels,
            removal_labels,
            iterations,
        }
    }
}

fn luma(pixel: &[u8; 3]) -> u32 {
    // Rec. 601 weights scaled by 1000
    299 * pixel[0] as u32 + 587 * pixel[1] as u32 + 114 * pixel[2] as u32
}

/// Centers of `k` equal strata of the luminance-sorted population
fn seed_centroids(pixels: &[[u8; 3]], k: usize) -> Vec<[f64; 3]> {
    let mut sorted: Vec<&[u8; 3]> = pixels.iter().collect();
    sorted.sort_unstable_by_key(|p| (luma(p), p[0], p[1], p[2]));

    let n = sorted.len();
    (0..k)
        .map(|j| {
            let index = ((2 * j + 1) * n / (2 * k)).min(n - 1);
            let p = sorted[index];
            [p[0] as f64, p[1] as f64, p[2] as f64]
        })
        .collect()
}

fn nearest(pixel: &[u8; 3], centroids: &[[f64; 3]]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance: f64 = (0..3)
            .map(|c| (pixel[c] as f64 - centroid[c]).powi(2))
            .sum();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

fn assign(pixels: &[[u8; 3]], centroids: &[[f64; 3]]) -> Vec<usize> {
    pixels.par_iter().map(|p| nearest(p, centroids)).collect()
}

fn recompute_centroids(pixels: &[[u8; 3]], labels: &[usize], previous: &[[f64; 3]]) -> Vec<[f64; 3]> {
    let mut sums = vec![[0.0f64; 3]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (pixel, &label) in pixels.iter().zip(labels) {
        counts[label] += 1;
        for c in 0..3 {
            sums[label][c] += pixel[c] as f64;
        }
    }
    sums.iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count == 0 {
                *prev
            } else {
                sum.map(|s| s / count as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    #[test]
    fn test_empty_input_yields_no_swatches() {
        let result = Quantizer::new().quantize(&[], &[RED], 3);
        assert!(result.swatches.is_empty());
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_uniform_input_fills_first_cluster() {
        let pixels = vec![RED; 100];
        let result = Quantizer::new().quantize(&pixels, &[], 3);

        assert_eq!(result.swatches.len(), 3);
        assert_eq!(result.swatches[0].pixel_count, 100);
        assert_eq!(result.swatches[1].pixel_count, 0);
        assert_eq!(result.swatches[2].pixel_count, 0);
        assert_eq!(result.swatches[0].color.to_rgb8(), RED);
        assert_eq!(result.swatches[0].importance, 100);
    }

    #[test]
    fn test_two_colors_split_cleanly() {
        let mut pixels = vec![RED; 30];
        pixels.extend(vec![BLUE; 70]);
        let result = Quantizer::new().quantize(&pixels, &[], 2);

        let mut counts: Vec<(u64, [u8; 3])> = result
            .swatches
            .iter()
            .map(|s| (s.pixel_count, s.color.to_rgb8()))
            .collect();
        counts.sort();
        assert_eq!(counts, vec![(30, RED), (70, BLUE)]);
    }

    #[test]
    fn test_pixel_conservation() {
        let pixels: Vec<[u8; 3]> = (0..500u32)
            .map(|i| [(i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 29 % 256) as u8])
            .collect();
        let result = Quantizer::new().quantize(&pixels, &[], 6);
        let total: u64 = result.swatches.iter().map(|s| s.pixel_count).sum();
        assert_eq!(total, 500);
        assert_eq!(result.labels.len(), 500);
        assert!(result.iterations <= constants::quantizer::MAX_ITERATIONS);
    }

    #[test]
    fn test_deterministic() {
        let pixels: Vec<[u8; 3]> = (0..300u32)
            .map(|i| [(i * 31 % 256) as u8, (i * 17 % 256) as u8, (i * 3 % 256) as u8])
            .collect();
        let a = Quantizer::new().quantize(&pixels, &[], 4);
        let b = Quantizer::new().quantize(&pixels, &[], 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_removal_pixels_tallied_not_counted() {
        let mut pixels = vec![RED; 10];
        pixels.extend(vec![BLUE; 10]);
        let skin = vec![[250, 10, 10]; 8];
        let result = Quantizer::new().quantize(&pixels, &skin, 2);

        let red = result
            .swatches
            .iter()
            .find(|s| s.color.to_rgb8() == RED)
            .unwrap();
        assert_eq!(red.pixel_count, 10);
        assert_eq!(red.color_removal_pixel_count, 8);
        assert!(red.removed);
        assert_eq!(red.importance, 0);

        let blue = result
            .swatches
            .iter()
            .find(|s| s.color.to_rgb8() == BLUE)
            .unwrap();
        assert!(!blue.removed);
        assert_eq!(blue.importance, 10);
    }

    #[test]
    fn test_iteration_cap() {
        let pixels: Vec<[u8; 3]> = (0..256u32).map(|i| [i as u8, (255 - i) as u8, 128]).collect();
        let result = Quantizer::with_params(1, 0.5).quantize(&pixels, &[], 4);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.swatches.iter().map(|s| s.pixel_count).sum::<u64>(), 256);
    }
}
