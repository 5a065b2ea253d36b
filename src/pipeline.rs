//! The dominant color pipeline
//!
//! [`DominantColor`] owns one image and walks it through
//! `set_image → mark_* → grab_cut → k_means → minimize_colors_with_distance_threshold`.
//! Each step's output lives in the [`PipelineState`] variant that the next
//! step consumes, so an out-of-order call simply finds nothing to work on.

use image::{imageops, RgbImage};
use log::{debug, info, warn};

use crate::{
    color::Color,
    config::PipelineConfig,
    constants,
    detection::{ColorModelSegmenter, FaceDetector, NoFaceDetector, Segmenter},
    mask::{ForegroundMask, Point, Rect, RegionMark, RegionMask},
    quantize::{merge_swatches, palette_indices, Quantization, Quantizer, Swatch},
    render::{self, PreviewPalette},
    DominantColorError, Result,
};

/// Where the pipeline stands; data flows forward through the variants
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Image set, no mark accepted yet
    Unmarked,
    /// At least one mark accepted
    Marked,
    /// Foreground mask computed; marks are closed
    Segmented {
        segmentation: Segmentation,
    },
    /// Swatches clustered from the foreground
    Quantized {
        segmentation: Segmentation,
        quantization: Quantization,
    },
    /// Swatches merged at `threshold`
    Finalized {
        segmentation: Segmentation,
        quantization: Quantization,
        /// Copy of the quantized swatches after merging
        merged: Vec<Swatch>,
        threshold: f32,
    },
}

/// Seed mask and solver output for the working image
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub region_mask: RegionMask,
    pub foreground: ForegroundMask,
}

/// Fieldless view of [`PipelineState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unmarked,
    Marked,
    Segmented,
    Quantized,
    Finalized,
}

impl PipelineState {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineState::Unmarked => Stage::Unmarked,
            PipelineState::Marked => Stage::Marked,
            PipelineState::Segmented { .. } => Stage::Segmented,
            PipelineState::Quantized { .. } => Stage::Quantized,
            PipelineState::Finalized { .. } => Stage::Finalized,
        }
    }

    fn segmentation(&self) -> Option<&Segmentation> {
        match self {
            PipelineState::Unmarked | PipelineState::Marked => None,
            PipelineState::Segmented { segmentation }
            | PipelineState::Quantized { segmentation, .. }
            | PipelineState::Finalized { segmentation, .. } => Some(segmentation),
        }
    }

    fn quantization(&self) -> Option<&Quantization> {
        match self {
            PipelineState::Quantized { quantization, .. }
            | PipelineState::Finalized { quantization, .. } => Some(quantization),
            _ => None,
        }
    }
}

/// Analysis image, possibly downscaled from the caller's image
#[derive(Debug, Clone)]
struct WorkingImage {
    image: RgbImage,
    /// Working size / source size
    scale: f64,
    source_width: u32,
    source_height: u32,
}

impl WorkingImage {
    fn new(source: RgbImage, max_pixels: u32) -> Self {
        let (source_width, source_height) = source.dimensions();
        let pixels = source_width as u64 * source_height as u64;

        if max_pixels == 0 || pixels <= max_pixels as u64 {
            return Self {
                image: source,
                scale: 1.0,
                source_width,
                source_height,
            };
        }

        let scale = (max_pixels as f64 / pixels as f64).sqrt();
        let width = ((source_width as f64 * scale).round() as u32).max(1);
        let height = ((source_height as f64 * scale).round() as u32).max(1);
        debug!("downscaling {source_width}x{source_height} to {width}x{height}");

        Self {
            image: imageops::resize(&source, width, height, imageops::FilterType::Triangle),
            scale,
            source_width,
            source_height,
        }
    }

    fn to_working(&self, rect: Rect) -> Rect {
        rect.scaled(self.scale)
    }
}

/// Dominant color extraction for a single image
///
/// ```no_run
/// use dominant_colors::DominantColor;
///
/// let image = image::open("photo.jpg")?.to_rgb8();
/// let mut analysis = DominantColor::new();
/// analysis.set_image(image);
/// analysis.mark_default_area();
/// analysis.grab_cut()?;
/// analysis.k_means(8);
/// analysis.minimize_colors_with_distance_threshold(10.0);
/// for color in analysis.color_array() {
///     println!("{}", color.to_hex());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DominantColor {
    config: PipelineConfig,
    image: Option<WorkingImage>,
    marks: Vec<RegionMark>,
    segmenter: Box<dyn Segmenter>,
    face_detector: Box<dyn FaceDetector>,
    state: PipelineState,
}

impl Default for DominantColor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DominantColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DominantColor")
            .field("config", &self.config)
            .field("image", &self.image.as_ref().map(|w| w.image.dimensions()))
            .field("marks", &self.marks)
            .field("stage", &self.state.stage())
            .finish()
    }
}

impl DominantColor {
    /// Pipeline with default configuration, the built-in segmenter and no
    /// face detection
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            image: None,
            marks: Vec::new(),
            segmenter: Box::new(ColorModelSegmenter::new()),
            face_detector: Box::new(NoFaceDetector),
            state: PipelineState::Unmarked,
        }
    }

    /// Replace the segmentation solver
    pub fn with_segmenter(mut self, segmenter: impl Segmenter + 'static) -> Self {
        self.segmenter = Box::new(segmenter);
        self
    }

    /// Replace the face detector used by [`Self::mark_face`]
    pub fn with_face_detector(mut self, detector: impl FaceDetector + 'static) -> Self {
        self.face_detector = Box::new(detector);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a new image, discarding all marks and results
    pub fn set_image(&mut self, image: RgbImage) {
        let working = WorkingImage::new(image, self.config.max_pixels);
        info!(
            "image set: {}x{} (working {}x{})",
            working.source_width,
            working.source_height,
            working.image.width(),
            working.image.height()
        );
        self.image = Some(working);
        self.marks.clear();
        self.state = PipelineState::Unmarked;
    }

    /// Image the analysis runs on, after downscaling
    pub fn working_image(&self) -> Option<&RgbImage> {
        self.image.as_ref().map(|w| &w.image)
    }

    /// Working size divided by source size
    pub fn scale(&self) -> f64 {
        self.image.as_ref().map_or(1.0, |w| w.scale)
    }

    pub fn marks(&self) -> &[RegionMark] {
        &self.marks
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Mark a rectangle, in source-image coordinates, as subject or backdrop
    ///
    /// The rectangle grows by the configured border before rasterization and
    /// the added ring becomes background.
    ///
    /// # Returns
    ///
    /// `false`, with nothing recorded, when no image is set, the rectangle is
    /// empty or entirely outside the image, or the pipeline is past marking
    pub fn mark_rect(&mut self, rect: Rect, is_foreground: bool) -> bool {
        self.mark_source_rect(rect, is_foreground, false)
    }

    /// Mark a rectangle whose foreground pixels are treated as skin
    pub fn mark_removal_rect(&mut self, rect: Rect) -> bool {
        self.mark_source_rect(rect, false, true)
    }

    fn mark_source_rect(&mut self, rect: Rect, foreground: bool, color_removal: bool) -> bool {
        let Some(working) = self.markable_image("mark_rect") else {
            return false;
        };
        if rect.clip(working.source_width, working.source_height).is_none() {
            debug!("mark_rect: {rect:?} is empty or outside the image");
            return false;
        }
        let rect = working.to_working(rect);
        self.push_mark(RegionMark::Rect {
            rect,
            foreground,
            color_removal,
            force_foreground: false,
        });
        true
    }

    /// Mark a disc of definite foreground or background
    ///
    /// Parts of the disc outside the image are ignored. Fails only without an
    /// image or once the pipeline is past marking.
    pub fn mark_point(&mut self, point: Point, radius: i32, is_foreground: bool) -> bool {
        let Some(working) = self.markable_image("mark_point") else {
            return false;
        };
        let scale = working.scale;
        let center = Point::new(
            (point.x as f64 * scale).floor() as i32,
            (point.y as f64 * scale).floor() as i32,
        );
        let radius = (radius.max(0) as f64 * scale).round() as i32;
        self.push_mark(RegionMark::Point {
            center,
            radius,
            foreground: is_foreground,
        });
        true
    }

    /// Mark the image minus a thin margin as probable subject
    ///
    /// The margin becomes background through the rectangle's border ring.
    /// The area may be forced to foreground when segmentation discards it.
    pub fn mark_default_area(&mut self) -> bool {
        let Some(working) = self.markable_image("mark_default_area") else {
            return false;
        };
        let (width, height) = working.image.dimensions();
        let percent = self.config.mask.default_area_margin_percent;
        let margin_x = (width as f32 * percent).round() as i32;
        let margin_y = (height as f32 * percent).round() as i32;
        let rect = Rect::new(
            margin_x,
            margin_y,
            width as i32 - 2 * margin_x,
            height as i32 - 2 * margin_y,
        );
        if rect.is_empty() {
            return false;
        }
        self.push_mark(RegionMark::Rect {
            rect,
            foreground: true,
            color_removal: false,
            force_foreground: true,
        });
        true
    }

    /// Detect faces and mark each one as a color-removal region
    ///
    /// # Returns
    ///
    /// `true` when at least one face was marked. Detector errors are logged
    /// and count as no faces.
    pub fn mark_face(&mut self) -> bool {
        let Some(working) = self.markable_image("mark_face") else {
            return false;
        };
        let faces = match self.face_detector.detect_faces(&working.image) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("face detection failed: {e}");
                return false;
            }
        };

        let (width, height) = working.image.dimensions();
        let faces: Vec<Rect> = faces
            .into_iter()
            .filter_map(|face| face.clip(width, height))
            .collect();
        info!("mark_face: {} faces", faces.len());
        if faces.is_empty() {
            return false;
        }
        for rect in faces {
            self.push_mark(RegionMark::Face { rect });
        }
        true
    }

    fn markable_image(&self, operation: &str) -> Option<&WorkingImage> {
        let Some(working) = self.image.as_ref() else {
            debug!("{operation}: no image set");
            return None;
        };
        if self.state.stage() > Stage::Marked {
            warn!("{operation}: marks are closed once segmentation has run");
            return None;
        }
        Some(working)
    }

    fn push_mark(&mut self, mark: RegionMark) {
        debug!("mark added: {mark:?}");
        self.marks.push(mark);
        self.state = PipelineState::Marked;
    }

    /// Rasterize the marks and run the segmentation solver
    ///
    /// May be called without marks, which yields an all-background mask.
    /// Calling it again re-segments and drops any quantization.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` when no image is set
    /// - `Segmentation` when the solver fails; the pipeline state is kept
    pub fn grab_cut(&mut self) -> Result<()> {
        let Some(working) = self.image.as_ref() else {
            return Err(DominantColorError::invalid_parameter("image", "unset"));
        };
        let image = &working.image;
        let (width, height) = image.dimensions();
        let mask_config = &self.config.mask;
        let region_mask = RegionMask::from_marks(width, height, &self.marks, mask_config);

        let mut foreground = if region_mask.has_foreground() {
            self.segmenter
                .refine(image, &region_mask, self.config.segmenter.iterations)
                .map_err(|e| match e {
                    DominantColorError::Segmentation { .. } => e,
                    other => DominantColorError::segmentation("solver returned an error", other),
                })?
        } else {
            debug!("grab_cut: no foreground marks, skipping solver");
            ForegroundMask::background(width, height)
        };

        if foreground.width() != width || foreground.height() != height {
            return Err(DominantColorError::segmentation(
                "solver returned a mask of the wrong size",
                DominantColorError::MaskDimensions {
                    width,
                    height,
                    actual_width: foreground.width(),
                    actual_height: foreground.height(),
                },
            ));
        }

        for mark in &self.marks {
            let RegionMark::Rect {
                rect,
                foreground: true,
                color_removal: false,
                force_foreground: true,
            } = *mark
            else {
                continue;
            };
            let Some(clipped) = rect.clip(width, height) else {
                continue;
            };
            let covered = foreground.count_in(clipped) as f64;
            if covered < mask_config.force_foreground_pixel_percent as f64 * clipped.area() as f64 {
                let forced = rect.centered_fraction(mask_config.force_foreground_rect_percent);
                info!("grab_cut: only {covered} foreground pixels in {rect:?}, forcing {forced:?}");
                foreground.fill(forced);
            }
        }
        foreground.enforce_definite(&region_mask);

        info!(
            "grab_cut: {} of {} pixels foreground",
            foreground.count(),
            width as usize * height as usize
        );
        self.state = PipelineState::Segmented {
            segmentation: Segmentation {
                region_mask,
                foreground,
            },
        };
        Ok(())
    }

    /// Cluster the foreground into `k` swatches
    ///
    /// Needs a segmentation; before [`Self::grab_cut`] this logs a warning and
    /// returns no swatches without changing state. Re-running replaces any
    /// previous quantization and merge.
    pub fn k_means(&mut self, k: usize) -> &[Swatch] {
        let Some(segmentation) = self.state.segmentation().cloned() else {
            warn!("k_means called before grab_cut; nothing to cluster");
            return &[];
        };
        let Some(working) = self.image.as_ref() else {
            return &[];
        };

        let mut pixels = Vec::new();
        let mut removal_pixels = Vec::new();
        for ((pixel, &fg), &removal) in working
            .image
            .pixels()
            .zip(segmentation.foreground.as_slice())
            .zip(segmentation.region_mask.removal())
        {
            if !fg {
                continue;
            }
            if removal {
                removal_pixels.push(pixel.0);
            } else {
                pixels.push(pixel.0);
            }
        }

        let quantizer = Quantizer::from_config(&self.config.quantizer);
        let quantization = quantizer.quantize(&pixels, &removal_pixels, k);
        info!(
            "k_means: {} swatches from {} pixels ({} color-removal pixels)",
            quantization.swatches.len(),
            pixels.len(),
            removal_pixels.len()
        );

        self.state = PipelineState::Quantized {
            segmentation,
            quantization,
        };
        self.swatches()
    }

    /// Merge swatches closer than `threshold` (CIE94, 0 to 116)
    ///
    /// Always starts from the quantized swatches, so thresholds can be tried
    /// in any order. Thresholds above 116 are clamped; NaN or negative
    /// thresholds are logged and merge nothing. Before [`Self::k_means`] this
    /// logs a warning and returns no swatches.
    pub fn minimize_colors_with_distance_threshold(&mut self, threshold: f32) -> &[Swatch] {
        let state = std::mem::replace(&mut self.state, PipelineState::Unmarked);
        let (segmentation, quantization) = match state {
            PipelineState::Quantized {
                segmentation,
                quantization,
            }
            | PipelineState::Finalized {
                segmentation,
                quantization,
                ..
            } => (segmentation, quantization),
            other => {
                warn!("minimize_colors_with_distance_threshold called before k_means");
                self.state = other;
                return &[];
            }
        };

        let threshold = sanitize_threshold(threshold);
        let mut merged = quantization.swatches.clone();
        let merges = merge_swatches(&mut merged, threshold);
        info!(
            "minimize: {merges} merges at threshold {threshold}, {} colors left",
            palette_indices(&merged).len()
        );
        self.state = PipelineState::Finalized {
            segmentation,
            quantization,
            merged,
            threshold,
        };
        self.swatches()
    }

    /// Current swatch list: merged when finalized, raw when quantized
    pub fn swatches(&self) -> &[Swatch] {
        match &self.state {
            PipelineState::Finalized { merged, .. } => merged,
            PipelineState::Quantized { quantization, .. } => &quantization.swatches,
            _ => &[],
        }
    }

    /// Palette swatches by descending pixel count
    pub fn palette(&self) -> Vec<&Swatch> {
        let swatches = self.swatches();
        palette_indices(swatches)
            .into_iter()
            .map(|i| &swatches[i])
            .collect()
    }

    /// Dominant colors, most prominent first; empty before [`Self::k_means`]
    pub fn color_array(&self) -> Vec<Color> {
        self.palette().into_iter().map(|s| s.color).collect()
    }

    pub fn region_mask(&self) -> Option<&RegionMask> {
        self.state.segmentation().map(|s| &s.region_mask)
    }

    pub fn foreground_mask(&self) -> Option<&ForegroundMask> {
        self.state.segmentation().map(|s| &s.foreground)
    }

    /// Debug rendering of the working image
    ///
    /// `None` before [`Self::grab_cut`]. See [`render::render`] for the color
    /// scheme.
    pub fn render_preview(&self, background: Color, removed: Color, alpha: f32) -> Option<RgbImage> {
        let working = self.image.as_ref()?;
        let segmentation = self.state.segmentation()?;
        let palette = self.state.quantization().map(|quantization| PreviewPalette {
            quantization,
            swatches: self.swatches(),
        });
        Some(render::render(
            &working.image,
            &segmentation.region_mask,
            &segmentation.foreground,
            palette,
            background,
            removed,
            alpha,
        ))
    }
}

/// Clamp a merge threshold into `[0, MAX_DISTANCE]`; NaN and negatives disable merging
fn sanitize_threshold(threshold: f32) -> f32 {
    let max = constants::merge::MAX_DISTANCE;
    if threshold.is_nan() || threshold < 0.0 {
        warn!("merge threshold {threshold} is invalid, merging disabled");
        0.0
    } else if threshold > max {
        warn!("merge threshold {threshold} clamped to {max}");
        max
    } else {
        threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::SeedSegmenter;
    use image::Rgb;

    fn red_image() -> RgbImage {
        RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]))
    }

    struct FailingSegmenter;

    impl Segmenter for FailingSegmenter {
        fn refine(&self, _image: &RgbImage, _mask: &RegionMask, _iterations: u32) -> Result<ForegroundMask> {
            Err(DominantColorError::Processing("solver crashed".into()))
        }
    }

    /// Discards every probable pixel
    struct EmptySegmenter;

    impl Segmenter for EmptySegmenter {
        fn refine(&self, image: &RgbImage, _mask: &RegionMask, _iterations: u32) -> Result<ForegroundMask> {
            Ok(ForegroundMask::background(image.width(), image.height()))
        }
    }

    #[test]
    fn test_marks_need_an_image() {
        let mut analysis = DominantColor::new();
        assert!(!analysis.mark_default_area());
        assert!(!analysis.mark_rect(Rect::new(0, 0, 5, 5), true));
        assert!(!analysis.mark_point(Point::new(1, 1), 1, true));
        assert!(analysis.grab_cut().is_err());
        assert_eq!(analysis.stage(), Stage::Unmarked);
    }

    #[test]
    fn test_invalid_rect_leaves_state() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        assert!(!analysis.mark_rect(Rect::new(2, 2, 0, 5), true));
        assert!(!analysis.mark_rect(Rect::new(20, 20, 5, 5), true));
        assert!(analysis.marks().is_empty());
        assert_eq!(analysis.stage(), Stage::Unmarked);

        assert!(analysis.mark_rect(Rect::new(2, 2, 5, 5), true));
        assert_eq!(analysis.stage(), Stage::Marked);
    }

    #[test]
    fn test_k_means_before_grab_cut_is_noop() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        analysis.mark_default_area();
        assert!(analysis.k_means(3).is_empty());
        assert_eq!(analysis.stage(), Stage::Marked);
        assert!(analysis.minimize_colors_with_distance_threshold(10.0).is_empty());
        assert_eq!(analysis.stage(), Stage::Marked);
    }

    #[test]
    fn test_default_area_on_uniform_image() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        assert!(analysis.mark_default_area());
        analysis.grab_cut().unwrap();

        let swatches = analysis.k_means(3).to_vec();
        assert_eq!(swatches.len(), 3);
        assert_eq!(swatches[0].pixel_count, 100);
        assert_eq!(swatches[0].color.to_rgb8(), [255, 0, 0]);
        assert_eq!(swatches[1].pixel_count, 0);
        assert_eq!(swatches[2].pixel_count, 0);
        assert_eq!(analysis.color_array(), vec![swatches[0].color]);
    }

    #[test]
    fn test_no_marks_gives_empty_palette() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        analysis.grab_cut().unwrap();
        assert_eq!(analysis.foreground_mask().unwrap().count(), 0);
        assert!(analysis.k_means(3).is_empty());
        assert_eq!(analysis.stage(), Stage::Quantized);
        assert!(analysis.color_array().is_empty());
    }

    #[test]
    fn test_segmentation_failure_is_reported() {
        let mut analysis = DominantColor::new().with_segmenter(FailingSegmenter);
        analysis.set_image(red_image());
        analysis.mark_default_area();
        let err = analysis.grab_cut().unwrap_err();
        assert!(matches!(err, DominantColorError::Segmentation { .. }));
        assert_eq!(analysis.stage(), Stage::Marked);
    }

    #[test]
    fn test_force_foreground_recovers_subject() {
        let mut analysis = DominantColor::new().with_segmenter(EmptySegmenter);
        analysis.set_image(RgbImage::from_pixel(40, 40, Rgb([0, 0, 200])));
        analysis.mark_default_area();
        analysis.grab_cut().unwrap();

        // margin 1, area (1, 1, 38, 38), forced center 19x19
        let fg = analysis.foreground_mask().unwrap();
        assert_eq!(fg.count(), 19 * 19);
        assert!(fg.get(20, 20));
        assert!(!fg.get(2, 2));
    }

    #[test]
    fn test_plain_rect_is_not_forced() {
        let mut analysis = DominantColor::new().with_segmenter(EmptySegmenter);
        analysis.set_image(RgbImage::from_pixel(40, 40, Rgb([0, 0, 200])));
        analysis.mark_rect(Rect::new(5, 5, 30, 30), true);
        analysis.grab_cut().unwrap();
        assert_eq!(analysis.foreground_mask().unwrap().count(), 0);
    }

    #[test]
    fn test_marks_closed_after_segmentation() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        analysis.mark_default_area();
        analysis.grab_cut().unwrap();
        assert!(!analysis.mark_point(Point::new(1, 1), 1, false));
        assert_eq!(analysis.marks().len(), 1);

        analysis.set_image(red_image());
        assert!(analysis.marks().is_empty());
        assert_eq!(analysis.stage(), Stage::Unmarked);
    }

    #[test]
    fn test_face_marks_remove_skin() {
        let detector = |_: &RgbImage| -> Result<Vec<Rect>> { Ok(vec![Rect::new(0, 0, 10, 3)]) };
        let mut analysis = DominantColor::new()
            .with_segmenter(SeedSegmenter)
            .with_face_detector(detector);
        let image = RgbImage::from_fn(10, 10, |_, y| {
            if y < 5 {
                Rgb([230, 180, 150])
            } else {
                Rgb([20, 20, 160])
            }
        });
        analysis.set_image(image);
        assert!(analysis.mark_default_area());
        assert!(analysis.mark_face());
        analysis.grab_cut().unwrap();
        analysis.k_means(2);

        // The 30 face pixels are excluded from clustering and flag the
        // remaining 20 skin pixels as a skin cluster
        let counted: u64 = analysis.swatches().iter().map(|s| s.pixel_count).sum();
        assert_eq!(counted, 70);
        assert_eq!(analysis.swatches().iter().filter(|s| s.removed).count(), 1);
        assert_eq!(analysis.color_array().len(), 1);
        assert_eq!(analysis.color_array()[0].to_rgb8(), [20, 20, 160]);
    }

    #[test]
    fn test_face_detector_error_marks_nothing() {
        let detector = |_: &RgbImage| -> Result<Vec<Rect>> {
            Err(DominantColorError::Processing("no model".into()))
        };
        let mut analysis = DominantColor::new().with_face_detector(detector);
        analysis.set_image(red_image());
        assert!(!analysis.mark_face());
        assert_eq!(analysis.stage(), Stage::Unmarked);
    }

    #[test]
    fn test_huge_point_radius_segments() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        assert!(analysis.mark_point(Point::new(5, 5), i32::MAX, true));
        analysis.grab_cut().unwrap();
        assert_eq!(analysis.foreground_mask().unwrap().count(), 100);
    }

    #[test]
    fn test_huge_rect_segments() {
        let mut analysis = DominantColor::new().with_segmenter(SeedSegmenter);
        analysis.set_image(red_image());
        assert!(analysis.mark_rect(Rect::new(0, 0, i32::MAX, i32::MAX), true));
        analysis.grab_cut().unwrap();
        assert_eq!(analysis.foreground_mask().unwrap().count(), 100);
    }

    #[test]
    fn test_no_faces_found_marks_nothing() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        assert!(!analysis.mark_face());
        assert!(analysis.marks().is_empty());
        assert_eq!(analysis.stage(), Stage::Unmarked);
    }

    fn red_blue_quantized() -> DominantColor {
        let mut config = PipelineConfig::default();
        config.mask.default_area_margin_percent = 0.0;
        let mut analysis = DominantColor::with_config(config).with_segmenter(SeedSegmenter);
        analysis.set_image(RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        }));
        analysis.mark_default_area();
        analysis.grab_cut().unwrap();
        analysis.k_means(2);
        analysis
    }

    #[test]
    fn test_invalid_threshold_disables_merging() {
        let mut analysis = red_blue_quantized();
        analysis.minimize_colors_with_distance_threshold(f32::NAN);
        assert_eq!(analysis.color_array().len(), 2);
        assert!(matches!(
            analysis.state(),
            PipelineState::Finalized { threshold, .. } if *threshold == 0.0
        ));

        analysis.minimize_colors_with_distance_threshold(-5.0);
        assert_eq!(analysis.color_array().len(), 2);

        analysis.minimize_colors_with_distance_threshold(f32::INFINITY);
        assert!(matches!(
            analysis.state(),
            PipelineState::Finalized { threshold, .. }
                if *threshold == constants::merge::MAX_DISTANCE
        ));
    }

    #[test]
    fn test_large_images_are_downscaled() {
        let mut config = PipelineConfig::default();
        config.max_pixels = 100;
        let mut analysis = DominantColor::with_config(config);
        analysis.set_image(RgbImage::from_pixel(40, 40, Rgb([0, 200, 0])));

        let working = analysis.working_image().unwrap();
        assert_eq!(working.dimensions(), (10, 10));
        assert!((analysis.scale() - 0.25).abs() < 1e-9);

        assert!(analysis.mark_rect(Rect::new(8, 8, 16, 16), true));
        assert_eq!(
            analysis.marks()[0],
            RegionMark::Rect {
                rect: Rect::new(2, 2, 4, 4),
                foreground: true,
                color_removal: false,
                force_foreground: false,
            }
        );
    }

    #[test]
    fn test_preview_needs_segmentation() {
        let mut analysis = DominantColor::new();
        analysis.set_image(red_image());
        assert!(analysis.render_preview(Color::WHITE, Color::BLACK, 0.5).is_none());
        analysis.grab_cut().unwrap();
        let preview = analysis.render_preview(Color::WHITE, Color::BLACK, 0.5).unwrap();
        assert_eq!(preview.get_pixel(5, 5), &Rgb([255, 255, 255]));
    }
}
