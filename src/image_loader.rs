//! Image loading for the pipeline
//!
//! Every supported file is decoded with the `image` crate and flattened to
//! 8-bit RGB, the only pixel layout the pipeline works on. Alpha is dropped
//! and higher bit depths are truncated.

use image::{DynamicImage, ImageReader, RgbImage};
use log::debug;
use std::path::Path;

use crate::{DominantColorError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// First frame only
    Gif,
    WebP,
    Tiff,
    Bmp,
    Ico,
    Tga,
    /// PBM, PGM and PPM
    Pnm,
    Qoi,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "ico" => Some(ImageFormat::Ico),
            "tga" => Some(ImageFormat::Tga),
            "pbm" | "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            "qoi" => Some(ImageFormat::Qoi),
            _ => None,
        }
    }

    fn decoder_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Ico => image::ImageFormat::Ico,
            ImageFormat::Tga => image::ImageFormat::Tga,
            ImageFormat::Pnm => image::ImageFormat::Pnm,
            ImageFormat::Qoi => image::ImageFormat::Qoi,
        }
    }
}

/// Load an image from disk as 8-bit RGB
///
/// # Errors
///
/// Returns `DominantColorError::ImageLoad` if the file cannot be opened or
/// decoded, and `InvalidParameter` for an unknown extension.
///
/// # Example
///
/// ```rust,no_run
/// use dominant_colors::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("photo.jpg"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), dominant_colors::DominantColorError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| {
        DominantColorError::invalid_parameter("image format", path.display())
    })?;

    let mut reader = ImageReader::open(path).map_err(|e| {
        DominantColorError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;
    reader.set_format(format.decoder_format());

    let image: DynamicImage = reader.decode().map_err(|e| {
        DominantColorError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;
    debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    Ok(image.to_rgb8())
}

/// Decode an in-memory image, guessing the format from its header
pub fn load_image_from_memory(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| DominantColorError::image_load("Failed to decode image buffer", e))?;
    Ok(image.to_rgb8())
}

/// Get list of all supported file extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &[
        "jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp", "ico", "tga", "pbm", "pgm",
        "ppm", "pnm", "qoi",
    ]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_extension(Path::new("photo.JPEG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("scan.tif")),
            Some(ImageFormat::Tiff)
        );
        assert_eq!(ImageFormat::from_extension(Path::new("photo.heic")), None);
        assert_eq!(ImageFormat::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("PNG"));
        assert!(is_supported_extension("webp"));
        assert!(!is_supported_extension("doc"));
        for ext in supported_extensions() {
            let path = format!("file.{ext}");
            assert!(ImageFormat::from_extension(Path::new(&path)).is_some(), "{ext}");
        }
    }

    #[test]
    fn test_png_roundtrip_through_disk() {
        let path = std::env::temp_dir().join(format!("dominant_colors_loader_{}.png", std::process::id()));
        let image = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8 * 80, y as u8 * 100, 7]));
        image.save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_missing_file_is_image_load_error() {
        let err = load_image(Path::new("/nonexistent/dominant_colors.png")).unwrap_err();
        assert!(matches!(err, DominantColorError::ImageLoad { .. }));
    }

    #[test]
    fn test_garbage_buffer_fails() {
        assert!(load_image_from_memory(b"not an image").is_err());
    }
}
