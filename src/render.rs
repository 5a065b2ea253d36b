//! Debug preview of a segmentation and its palette

use image::{Rgb, RgbImage};

use crate::{
    color::Color,
    mask::{ForegroundMask, RegionMask},
    quantize::{resolve_survivor, Quantization, Swatch},
};

/// Clustering outcome to paint over the foreground
#[derive(Debug, Clone, Copy)]
pub struct PreviewPalette<'a> {
    /// Raw k-means output; its labels index into `swatches`
    pub quantization: &'a Quantization,
    /// Swatch list after merging (or the quantized list itself)
    pub swatches: &'a [Swatch],
}

/// Paint the analysis state over `image`
///
/// Background pixels become `background`. Foreground pixels inside a
/// color-removal region, or belonging to a removed swatch, become `removed`.
/// Remaining foreground pixels are blended toward the color of the swatch
/// they finally ended up in, with `alpha` as the swatch weight (clamped to
/// `[0, 1]`). Without a palette the foreground is left untouched.
pub fn render(
    image: &RgbImage,
    region_mask: &RegionMask,
    foreground: &ForegroundMask,
    palette: Option<PreviewPalette<'_>>,
    background: Color,
    removed: Color,
    alpha: f32,
) -> RgbImage {
    let alpha = alpha.clamp(0.0, 1.0);
    let background: Rgb<u8> = background.into();
    let removed: Rgb<u8> = removed.into();

    let mut labels = palette.map(|p| p.quantization.labels.iter());
    let mut output = image.clone();

    for (index, pixel) in output.pixels_mut().enumerate() {
        if !foreground.as_slice()[index] {
            *pixel = background;
            continue;
        }
        if region_mask.removal()[index] {
            *pixel = removed;
            continue;
        }
        let (Some(palette), Some(labels)) = (palette, labels.as_mut()) else {
            continue;
        };
        let Some(&label) = labels.next() else {
            continue;
        };

        let survivor = resolve_survivor(palette.swatches, label);
        let Some(swatch) = palette.swatches.get(survivor) else {
            continue;
        };
        if swatch.removed {
            *pixel = removed;
            continue;
        }

        let target = swatch.color.to_rgb8();
        for (channel, &swatch_value) in pixel.0.iter_mut().zip(&target) {
            let blended = *channel as f32 * (1.0 - alpha) + swatch_value as f32 * alpha;
            *channel = blended.round().clamp(0.0, 255.0) as u8;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MaskConfig,
        mask::{Rect, RegionMark},
        quantize::Quantizer,
    };

    fn fg_rect(rect: Rect) -> RegionMark {
        RegionMark::Rect {
            rect,
            foreground: true,
            color_removal: false,
            force_foreground: false,
        }
    }

    #[test]
    fn test_background_and_removal_colors() {
        let image = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        let marks = [
            fg_rect(Rect::new(0, 0, 2, 4)),
            RegionMark::Face {
                rect: Rect::new(0, 0, 1, 1),
            },
        ];
        let mask = RegionMask::from_marks(4, 4, &marks, &MaskConfig::default());
        let fg = ForegroundMask::from_seed(&mask);

        let out = render(&image, &mask, &fg, None, Color::WHITE, Color::BLACK, 1.0);
        assert_eq!(out.get_pixel(3, 3), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(1, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_foreground_blends_with_swatch() {
        let image = RgbImage::from_pixel(4, 4, Rgb([200, 0, 0]));
        let mask = RegionMask::from_marks(4, 4, &[fg_rect(Rect::new(0, 0, 4, 4))], &MaskConfig::default());
        let fg = ForegroundMask::from_seed(&mask);
        let pixels = vec![[200, 0, 0]; 16];
        let mut quantization = Quantizer::new().quantize(&pixels, &[], 1);
        quantization.swatches[0].color = Color::from_rgb8(100, 0, 0);

        let palette = PreviewPalette {
            quantization: &quantization,
            swatches: &quantization.swatches,
        };
        let out = render(&image, &mask, &fg, Some(palette), Color::WHITE, Color::BLACK, 0.5);
        assert_eq!(out.get_pixel(2, 2), &Rgb([150, 0, 0]));

        let opaque = render(&image, &mask, &fg, Some(palette), Color::WHITE, Color::BLACK, 1.0);
        assert_eq!(opaque.get_pixel(2, 2), &Rgb([100, 0, 0]));
    }
}
