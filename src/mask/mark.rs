//! Region marks: the caller's hints about where the subject is
//!
//! Marks are recorded in working-image pixel coordinates and rasterized in
//! insertion order by [`super::RegionMask`].

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle; may extend past the image bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// True for zero or negative width/height
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with the `width` x `height` image, if any pixel overlaps
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(width.min(i32::MAX as u32) as i32);
        let y1 = self.bottom().min(height.min(i32::MAX as u32) as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Width of the background ring for this rectangle
    pub fn border_size(&self, border_percent: f32) -> i32 {
        (self.width.max(self.height) as f32 * border_percent).round() as i32
    }

    /// Grow by `border` pixels on every side, saturating at the `i32` range
    pub fn grow(&self, border: i32) -> Rect {
        let twice = border.saturating_mul(2);
        Rect::new(
            self.x.saturating_sub(border),
            self.y.saturating_sub(border),
            self.width.saturating_add(twice),
            self.height.saturating_add(twice),
        )
    }

    /// Centered sub-rectangle whose sides are `percent` of this one's
    pub fn centered_fraction(&self, percent: f32) -> Rect {
        let width = (self.width as f32 * percent).round() as i32;
        let height = (self.height as f32 * percent).round() as i32;
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }

    /// Map from source-image to working-image coordinates
    pub fn scaled(&self, scale: f64) -> Rect {
        if scale == 1.0 {
            return *self;
        }
        let x0 = (self.x as f64 * scale).floor() as i32;
        let y0 = (self.y as f64 * scale).floor() as i32;
        let x1 = (self.right() as f64 * scale).ceil() as i32;
        let y1 = (self.bottom() as f64 * scale).ceil() as i32;
        Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// One caller-supplied hint, rasterized in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RegionMark {
    /// Rectangle grown by the border percentage; the growth ring is background
    Rect {
        rect: Rect,
        foreground: bool,
        /// Only feeds the color-removal mask, leaving labels alone
        color_removal: bool,
        /// Allow the centered sub-rectangle to be forced to foreground after
        /// segmentation
        force_foreground: bool,
    },
    /// Disc of definite foreground or background
    Point {
        center: Point,
        radius: i32,
        foreground: bool,
    },
    /// Face bounding box; always a color-removal region
    Face { rect: Rect },
}

impl RegionMark {
    pub fn is_foreground(&self) -> bool {
        match self {
            RegionMark::Rect {
                foreground,
                color_removal,
                ..
            } => *foreground && !*color_removal,
            RegionMark::Point { foreground, .. } => *foreground,
            RegionMark::Face { .. } => false,
        }
    }

    pub fn is_color_removal(&self) -> bool {
        match self {
            RegionMark::Rect { color_removal, .. } => *color_removal,
            RegionMark::Point { .. } => false,
            RegionMark::Face { .. } => true,
        }
    }
}
