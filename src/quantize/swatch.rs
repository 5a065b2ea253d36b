//! Per-cluster bookkeeping

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Importance value of a swatch that has never been scored
pub const IMPORTANCE_UNSET: i64 = -1;

/// One color cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    /// Cluster centroid, or the weighted average after merges
    pub color: Color,
    /// Foreground pixels assigned to this swatch
    pub pixel_count: u64,
    /// Color-removal pixels nearest to this swatch
    pub color_removal_pixel_count: u64,
    /// Skin-colored cluster excluded from the palette
    pub removed: bool,
    /// `0` when removed, `-1` when unset, otherwise a `pixel_count` snapshot
    pub importance: i64,
    /// Index of the swatch this one was folded into
    pub merge_target: Option<usize>,
}

impl Swatch {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            pixel_count: 0,
            color_removal_pixel_count: 0,
            removed: false,
            importance: IMPORTANCE_UNSET,
            merge_target: None,
        }
    }

    /// Neither removed nor merged into another swatch
    pub fn is_active(&self) -> bool {
        !self.removed && !self.is_merged()
    }

    /// Folded into another swatch by the merger
    pub fn is_merged(&self) -> bool {
        self.merge_target.is_some()
    }

    /// Snapshot the current pixel count as importance
    pub fn compute_importance(&mut self) {
        self.importance = if self.removed {
            0
        } else {
            self.pixel_count as i64
        };
    }

    /// Flag as removed when removal pixels outweigh `ratio` of the cluster
    pub fn apply_color_removal(&mut self, ratio: f32) {
        self.removed = self.color_removal_pixel_count as f64 > ratio as f64 * self.pixel_count as f64;
    }
}

/// Follow merge links from `index` to the swatch that finally absorbed it
///
/// Walks at most `swatches.len()` links, so a malformed chain cannot loop.
pub fn resolve_survivor(swatches: &[Swatch], index: usize) -> usize {
    let mut current = index;
    for _ in 0..swatches.len() {
        match swatches.get(current).and_then(|s| s.merge_target) {
            Some(next) if next != current && next < swatches.len() => current = next,
            _ => break,
        }
    }
    current
}

/// Indices of the palette swatches: active, non-empty, by descending pixel
/// count with ties in list order
pub fn palette_indices(swatches: &[Swatch]) -> Vec<usize> {
    let mut indices: Vec<usize> = swatches
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_active() && s.pixel_count > 0)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by(|&a, &b| swatches[b].pixel_count.cmp(&swatches[a].pixel_count));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swatch(pixels: u64) -> Swatch {
        let mut s = Swatch::new(Color::BLACK);
        s.pixel_count = pixels;
        s
    }

    #[test]
    fn test_importance_lifecycle() {
        let mut s = swatch(42);
        assert_eq!(s.importance, IMPORTANCE_UNSET);
        s.compute_importance();
        assert_eq!(s.importance, 42);

        s.pixel_count = 50;
        assert_eq!(s.importance, 42, "importance is a snapshot");

        s.removed = true;
        s.compute_importance();
        assert_eq!(s.importance, 0);
    }

    #[test]
    fn test_color_removal_ratio() {
        let mut s = swatch(10);
        s.color_removal_pixel_count = 5;
        s.apply_color_removal(0.5);
        assert!(!s.removed);

        s.color_removal_pixel_count = 6;
        s.apply_color_removal(0.5);
        assert!(s.removed);

        let mut empty = swatch(0);
        empty.apply_color_removal(0.5);
        assert!(!empty.removed);
    }

    #[test]
    fn test_resolve_survivor_follows_chain() {
        let mut swatches = vec![swatch(1), swatch(1), swatch(1), swatch(1)];
        swatches[3].merge_target = Some(1);
        swatches[1].merge_target = Some(0);
        assert_eq!(resolve_survivor(&swatches, 3), 0);
        assert_eq!(resolve_survivor(&swatches, 2), 2);
    }

    #[test]
    fn test_resolve_survivor_terminates_on_cycle() {
        let mut swatches = vec![swatch(1), swatch(1)];
        swatches[0].merge_target = Some(1);
        swatches[1].merge_target = Some(0);
        let end = resolve_survivor(&swatches, 0);
        assert!(end < 2);
    }

    #[test]
    fn test_palette_order() {
        let mut swatches = vec![swatch(5), swatch(9), swatch(0), swatch(9), swatch(20)];
        swatches[4].removed = true;
        assert_eq!(palette_indices(&swatches), vec![1, 3, 0]);

        swatches[1].merge_target = Some(3);
        assert_eq!(palette_indices(&swatches), vec![3, 0]);
    }
}
