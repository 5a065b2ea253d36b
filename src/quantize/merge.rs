//! Perceptual merging of near-identical swatches
//!
//! Greedy and order-independent: every round finds the globally closest pair
//! of candidate swatches under CIE94 and folds the smaller one into the
//! larger while that distance stays strictly below the threshold.

use log::debug;

use super::swatch::Swatch;
use crate::color::Color;

/// Fold swatches closer than `threshold` into each other, in place
///
/// Candidates are swatches that are neither removed nor merged and hold at
/// least one pixel. The survivor of a pair is the one with more pixels, or
/// the lower index on a tie. It takes the pixel-weighted average color and
/// both tallies; the absorbed swatch keeps its own data but records
/// `merge_target`. Importance of the surviving swatches is refreshed.
///
/// # Returns
///
/// Number of merges performed. A NaN threshold merges nothing.
pub fn merge_swatches(swatches: &mut [Swatch], threshold: f32) -> usize {
    let mut merges = 0;

    while let Some((a, b, distance)) = closest_pair(swatches) {
        if threshold.is_nan() || distance >= threshold {
            break;
        }

        let (survivor, absorbed) = if swatches[b].pixel_count > swatches[a].pixel_count {
            (b, a)
        } else {
            (a, b)
        };

        let absorbed_swatch = swatches[absorbed].clone();
        let target = &mut swatches[survivor];
        target.color = Color::weighted_average(
            target.color,
            target.pixel_count,
            absorbed_swatch.color,
            absorbed_swatch.pixel_count,
        );
        target.pixel_count += absorbed_swatch.pixel_count;
        target.color_removal_pixel_count += absorbed_swatch.color_removal_pixel_count;
        swatches[absorbed].merge_target = Some(survivor);

        debug!("merged swatch {absorbed} into {survivor} (distance {distance:.2})");
        merges += 1;
    }

    for swatch in swatches.iter_mut().filter(|s| s.is_active()) {
        swatch.compute_importance();
    }

    merges
}

/// Closest candidate pair `(i, j, distance)` with `i < j`; earliest pair wins ties
fn closest_pair(swatches: &[Swatch]) -> Option<(usize, usize, f32)> {
    let candidates: Vec<usize> = swatches
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_active() && s.pixel_count > 0)
        .map(|(i, _)| i)
        .collect();

    let mut best: Option<(usize, usize, f32)> = None;
    for (n, &i) in candidates.iter().enumerate() {
        for &j in &candidates[n + 1..] {
            let distance = swatches[i].color.distance(&swatches[j].color);
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some((i, j, distance));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::swatch::{palette_indices, resolve_survivor};

    fn swatch(rgb: [u8; 3], pixels: u64) -> Swatch {
        let mut s = Swatch::new(Color::from_rgb8(rgb[0], rgb[1], rgb[2]));
        s.pixel_count = pixels;
        s.compute_importance();
        s
    }

    #[test]
    fn test_zero_threshold_is_noop() {
        let mut swatches = vec![swatch([255, 0, 0], 10), swatch([255, 0, 0], 10)];
        assert_eq!(merge_swatches(&mut swatches, 0.0), 0);
        assert!(swatches.iter().all(Swatch::is_active));
    }

    #[test]
    fn test_nan_threshold_is_noop() {
        let mut swatches = vec![swatch([255, 0, 0], 10), swatch([0, 0, 255], 10)];
        assert_eq!(merge_swatches(&mut swatches, f32::NAN), 0);
        assert_eq!(palette_indices(&swatches), vec![0, 1]);
    }

    #[test]
    fn test_near_colors_merge_into_larger() {
        let mut swatches = vec![swatch([250, 0, 0], 10), swatch([255, 0, 0], 30)];
        assert_eq!(merge_swatches(&mut swatches, 10.0), 1);

        assert_eq!(swatches[0].merge_target, Some(1));
        assert!(swatches[0].is_merged());
        assert!(!swatches[1].is_merged());
        assert_eq!(swatches[1].pixel_count, 40);
        assert_eq!(swatches[1].importance, 40);
        let [r, g, b] = swatches[1].color.to_rgb8();
        assert!((253..=254).contains(&r), "weighted red {r}");
        assert_eq!((g, b), (0, 0));
    }

    #[test]
    fn test_tie_keeps_lower_index() {
        let mut swatches = vec![swatch([255, 0, 0], 50), swatch([252, 2, 0], 50)];
        merge_swatches(&mut swatches, 10.0);
        assert!(swatches[0].is_active());
        assert_eq!(swatches[1].merge_target, Some(0));
        assert_eq!(swatches[0].pixel_count, 100);
    }

    #[test]
    fn test_distinct_colors_survive() {
        let mut swatches = vec![
            swatch([255, 0, 0], 10),
            swatch([0, 0, 255], 10),
            swatch([0, 255, 0], 10),
        ];
        assert_eq!(merge_swatches(&mut swatches, 10.0), 0);
    }

    #[test]
    fn test_removed_and_empty_are_skipped() {
        let mut removed = swatch([254, 0, 0], 100);
        removed.removed = true;
        removed.compute_importance();
        let mut swatches = vec![swatch([255, 0, 0], 10), removed, swatch([253, 0, 0], 0)];

        assert_eq!(merge_swatches(&mut swatches, 50.0), 0);
        assert_eq!(swatches[1].importance, 0);
        assert_eq!(swatches[0].pixel_count, 10);
    }

    #[test]
    fn test_chains_resolve_to_final_survivor() {
        let mut swatches = vec![
            swatch([200, 0, 0], 5),
            swatch([205, 0, 0], 10),
            swatch([210, 0, 0], 40),
        ];
        assert_eq!(merge_swatches(&mut swatches, 20.0), 2);
        assert_eq!(palette_indices(&swatches), vec![2]);
        assert_eq!(resolve_survivor(&swatches, 0), 2);
        assert_eq!(swatches[2].pixel_count, 55);
    }
}
