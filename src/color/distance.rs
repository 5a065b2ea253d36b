//! CIE94 color difference
//!
//! Graphic-arts weighting (kL = kC = kH = 1, K1 = 0.045, K2 = 0.015). The
//! chroma weights use the geometric mean of both chromas, which makes the
//! metric symmetric in its arguments.

use palette::Lab;

use super::Color;

const K1: f32 = 0.045;
const K2: f32 = 0.015;

/// CIE94 (ΔE94) distance between two LAB colors
pub fn cie94(lab1: Lab, lab2: Lab) -> f32 {
    let dl = lab1.l - lab2.l;
    let c1 = (lab1.a * lab1.a + lab1.b * lab1.b).sqrt();
    let c2 = (lab2.a * lab2.a + lab2.b * lab2.b).sqrt();
    let dc = c1 - c2;

    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    let dh_sq = (da * da + db * db - dc * dc).max(0.0);

    let chroma = (c1 * c2).sqrt();
    let sc = 1.0 + K1 * chroma;
    let sh = 1.0 + K2 * chroma;

    (dl * dl + (dc / sc).powi(2) + dh_sq / (sh * sh)).sqrt()
}

impl Color {
    /// Perceptual CIE94 distance to `other`
    ///
    /// Zero for identical colors and 116 between black and white.
    pub fn distance(&self, other: &Color) -> f32 {
        cie94(self.to_lab(), other.to_lab())
    }

    /// Closest palette entry and its distance
    ///
    /// Ties resolve to the earliest entry. Returns `None` for an empty palette.
    pub fn closest_in(&self, palette: &[Color]) -> Option<(usize, f32)> {
        let lab = self.to_lab();
        let mut best: Option<(usize, f32)> = None;
        for (index, candidate) in palette.iter().enumerate() {
            let distance = cie94(lab, candidate.to_lab());
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best
    }

    /// The palette color closest to this one
    pub fn closest_color_in(&self, palette: &[Color]) -> Option<Color> {
        self.closest_in(palette).map(|(index, _)| palette[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_color() {
        let color = Color::from_rgb8(90, 160, 30);
        assert_eq!(color.distance(&color), 0.0);
    }

    #[test]
    fn test_distance_black_white() {
        let d = Color::BLACK.distance(&Color::WHITE);
        assert!((d - crate::constants::merge::MAX_DISTANCE).abs() < 0.05, "got {d}");
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Color::from_rgb8(200, 30, 60);
        let b = Color::from_rgb8(20, 90, 220);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn test_lightness_only_difference() {
        let d = cie94(Lab::new(50.0, 0.0, 0.0), Lab::new(60.0, 0.0, 0.0));
        assert!((d - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_chroma_is_compressed() {
        // The same Euclidean step counts for less at high chroma
        let low = cie94(Lab::new(50.0, 0.0, 0.0), Lab::new(50.0, 10.0, 0.0));
        let high = cie94(Lab::new(50.0, 60.0, 0.0), Lab::new(50.0, 70.0, 0.0));
        assert!(high < low);
    }

    #[test]
    fn test_closest_in_palette() {
        let palette = [
            Color::from_rgb8(0, 0, 255),
            Color::from_rgb8(250, 10, 10),
            Color::from_rgb8(0, 255, 0),
        ];
        let red = Color::from_rgb8(255, 0, 0);
        let (index, distance) = red.closest_in(&palette).unwrap();
        assert_eq!(index, 1);
        assert!(distance < 5.0);
        assert_eq!(red.closest_color_in(&palette), Some(palette[1]));
    }

    #[test]
    fn test_closest_in_tie_prefers_first() {
        let gray = Color::from_rgb8(128, 128, 128);
        let palette = [gray, gray];
        assert_eq!(gray.closest_in(&palette), Some((0, 0.0)));
        assert_eq!(gray.closest_in(&[]), None);
    }
}
