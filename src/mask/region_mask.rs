//! Four-level segmentation seed mask and the binary foreground mask
//!
//! [`RegionMask`] is the solver input: every pixel carries exactly one
//! [`MaskLabel`], plus a flag marking it as a color-removal (skin) pixel.
//! [`ForegroundMask`] is the solver output.

use serde::{Deserialize, Serialize};

use super::mark::{Point, Rect, RegionMark};
use crate::config::MaskConfig;

/// Per-pixel seed label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaskLabel {
    /// Hard constraint; never reassigned by the solver
    #[default]
    Background,
    ProbableBackground,
    ProbableForeground,
    /// Hard constraint; never reassigned by the solver
    Foreground,
}

impl MaskLabel {
    pub fn is_definite(self) -> bool {
        matches!(self, MaskLabel::Background | MaskLabel::Foreground)
    }

    pub fn is_foreground(self) -> bool {
        matches!(self, MaskLabel::Foreground | MaskLabel::ProbableForeground)
    }
}

/// Seed mask built from region marks
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    width: u32,
    height: u32,
    labels: Vec<MaskLabel>,
    removal: Vec<bool>,
}

impl RegionMask {
    /// All-background mask with no color-removal pixels
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            labels: vec![MaskLabel::Background; len],
            removal: vec![false; len],
        }
    }

    /// Rasterize `marks` in order; later marks win on overlap
    pub fn from_marks(width: u32, height: u32, marks: &[RegionMark], config: &MaskConfig) -> Self {
        let mut mask = Self::new(width, height);
        for mark in marks {
            mask.apply(mark, config);
        }
        mask
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn label(&self, x: u32, y: u32) -> MaskLabel {
        self.labels[self.index(x, y)]
    }

    /// Row-major labels
    pub fn labels(&self) -> &[MaskLabel] {
        &self.labels
    }

    pub fn is_color_removal(&self, x: u32, y: u32) -> bool {
        self.removal[self.index(x, y)]
    }

    /// Row-major color-removal flags
    pub fn removal(&self) -> &[bool] {
        &self.removal
    }

    /// Whether any pixel carries a foreground label
    pub fn has_foreground(&self) -> bool {
        self.labels.iter().any(|label| label.is_foreground())
    }

    pub fn count(&self, label: MaskLabel) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Rasterize a single mark on top of the current labels
    pub fn apply(&mut self, mark: &RegionMark, config: &MaskConfig) {
        match *mark {
            RegionMark::Rect {
                rect,
                color_removal: true,
                ..
            }
            | RegionMark::Face { rect } => self.fill_removal(rect),
            RegionMark::Rect {
                rect, foreground, ..
            } => {
                let border = rect.border_size(config.border_percent);
                self.fill_rect(rect.grow(border), MaskLabel::Background);
                if foreground {
                    self.fill_rect(rect, MaskLabel::ProbableForeground);
                }
            }
            RegionMark::Point {
                center,
                radius,
                foreground,
            } => {
                let label = if foreground {
                    MaskLabel::Foreground
                } else {
                    MaskLabel::Background
                };
                self.fill_disc(center, radius, label);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, label: MaskLabel) {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * self.width as usize;
            let start = row + clipped.x as usize;
            let end = row + clipped.right() as usize;
            self.labels[start..end].fill(label);
        }
    }

    fn fill_removal(&mut self, rect: Rect) {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * self.width as usize;
            let start = row + clipped.x as usize;
            let end = row + clipped.right() as usize;
            self.removal[start..end].fill(true);
        }
    }

    fn fill_disc(&mut self, center: Point, radius: i32, label: MaskLabel) {
        if radius < 0 {
            return;
        }
        // Bounds in i64 so huge radii or far-off centers cannot overflow
        let (cx, cy, r) = (center.x as i64, center.y as i64, radius as i64);
        let x0 = (cx - r).max(0);
        let y0 = (cy - r).max(0);
        let x1 = (cx + r + 1).min(self.width as i64);
        let y1 = (cy + r + 1).min(self.height as i64);
        let r_sq = r * r;
        for y in y0..y1 {
            for x in x0..x1 {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r_sq {
                    let index = self.index(x as u32, y as u32);
                    self.labels[index] = label;
                }
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Binary segmentation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl ForegroundMask {
    /// All-background mask
    pub fn background(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Wrap a row-major buffer; `None` when the length does not match
    pub fn from_vec(width: u32, height: u32, data: Vec<bool>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Resolve every probable label to its side without refinement
    pub fn from_seed(mask: &RegionMask) -> Self {
        Self {
            width: mask.width,
            height: mask.height,
            data: mask.labels.iter().map(|label| label.is_foreground()).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        let index = y as usize * self.width as usize + x as usize;
        self.data[index] = foreground;
    }

    /// Row-major foreground flags
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Number of foreground pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&fg| fg).count()
    }

    /// Number of foreground pixels inside `rect`
    pub fn count_in(&self, rect: Rect) -> usize {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return 0;
        };
        (clipped.y..clipped.bottom())
            .map(|y| {
                (clipped.x..clipped.right())
                    .filter(|&x| self.get(x as u32, y as u32))
                    .count()
            })
            .sum()
    }

    /// Mark every pixel of `rect` as foreground
    pub fn fill(&mut self, rect: Rect) {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * self.width as usize;
            self.data[row + clipped.x as usize..row + clipped.right() as usize].fill(true);
        }
    }

    /// Re-impose the definite labels of `seed`
    pub fn enforce_definite(&mut self, seed: &RegionMask) {
        for (fg, label) in self.data.iter_mut().zip(seed.labels()) {
            match label {
                MaskLabel::Foreground => *fg = true,
                MaskLabel::Background => *fg = false,
                _ => {}
            }
        }
    }
}
