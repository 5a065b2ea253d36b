//! The [`Color`] value type and its color space conversions
//!
//! Colors are stored as gamma-encoded sRGB components in `[0, 1]`. Conversions
//! provided:
//! - sRGB ↔ HSB (hue in degrees, saturation and brightness in `[0, 1]`)
//! - sRGB ↔ CIE L*a*b* through CIE XYZ, relative to the D65 white point
//! - sRGB ↔ hexadecimal strings
//!
//! The LAB transform uses plain cube-root companding without the linear toe,
//! so pure black maps to `L* = -16`. Above a relative luminance of 0.008856 the
//! result is identical to the textbook transform; below it the scale stretches
//! so that black and white sit 116 units apart.

use palette::{FromColor, Hsv, Lab, LinSrgb, Srgb, Xyz};
use serde::{Deserialize, Serialize};

use crate::{constants::D65_WHITE_POINT_XYZ, DominantColorError, Result};

/// An opaque color in gamma-encoded sRGB
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Hue, saturation, brightness triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsb {
    /// Hue in degrees, `[0, 360)`
    pub hue: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    pub const WHITE: Color = Color {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    /// Create a color from sRGB components, clamping each to `[0, 1]`
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
        }
    }

    /// Create a color from 8-bit sRGB components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            red: r as f32 / 255.0,
            green: g as f32 / 255.0,
            blue: b as f32 / 255.0,
        }
    }

    /// Quantize to 8-bit sRGB components
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        ]
    }

    pub fn to_srgb(&self) -> Srgb {
        Srgb::new(self.red, self.green, self.blue)
    }

    pub fn from_srgb(srgb: Srgb) -> Self {
        Self::new(srgb.red, srgb.green, srgb.blue)
    }

    /// Convert to hue/saturation/brightness
    pub fn to_hsb(&self) -> Hsb {
        let hsv: Hsv = Hsv::from_color(self.to_srgb());
        Hsb {
            hue: hsv.hue.into_positive_degrees(),
            saturation: hsv.saturation,
            brightness: hsv.value,
        }
    }

    /// Build a color from hue/saturation/brightness
    pub fn from_hsb(hsb: Hsb) -> Self {
        let hsv: Hsv = Hsv::new(hsb.hue, hsb.saturation, hsb.brightness);
        Self::from_srgb(Srgb::from_color(hsv))
    }

    /// Convert to CIE L*a*b* (D65)
    pub fn to_lab(&self) -> Lab {
        let linear: LinSrgb = self.to_srgb().into_linear();
        let xyz: Xyz = Xyz::from_color(linear);
        let [xn, yn, zn] = D65_WHITE_POINT_XYZ;

        let fx = (xyz.x / xn).max(0.0).cbrt();
        let fy = (xyz.y / yn).max(0.0).cbrt();
        let fz = (xyz.z / zn).max(0.0).cbrt();

        Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }

    /// Build a color from CIE L*a*b* (D65), clamping to the sRGB gamut
    pub fn from_lab(lab: Lab) -> Self {
        let [xn, yn, zn] = D65_WHITE_POINT_XYZ;
        let fy = (lab.l + 16.0) / 116.0;
        let fx = fy + lab.a / 500.0;
        let fz = fy - lab.b / 200.0;

        let xyz: Xyz = Xyz::new(xn * fx.powi(3), yn * fy.powi(3), zn * fz.powi(3));
        let linear = LinSrgb::from_color(xyz);
        let srgb: Srgb = Srgb::from_linear(linear);
        Self::from_srgb(srgb)
    }

    /// Hexadecimal representation (e.g. "#FF0000")
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Parse a hexadecimal color string, with or without the leading `#`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(DominantColorError::invalid_parameter("hex", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| DominantColorError::invalid_parameter("hex", hex))
        };

        Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Pixel-count weighted average of two colors
    ///
    /// Falls back to `a` when both weights are zero.
    pub fn weighted_average(a: Color, weight_a: u64, b: Color, weight_b: u64) -> Color {
        let total = weight_a + weight_b;
        if total == 0 {
            return a;
        }
        let wa = weight_a as f64 / total as f64;
        let wb = weight_b as f64 / total as f64;
        let mix = |x: f32, y: f32| (x as f64 * wa + y as f64 * wb) as f32;
        Color::new(
            mix(a.red, b.red),
            mix(a.green, b.green),
            mix(a.blue, b.blue),
        )
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Color::from_rgb8(r, g, b)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb(color.to_rgb8())
    }
}
