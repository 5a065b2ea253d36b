//! Command-line interface for dominant_colors
//!
//! Usage:
//!   cli photo.jpg                                 # default area, 8 clusters
//!   cli photo.jpg --rect 40,30,200,260 -k 6       # explicit subject box
//!   cli photo.jpg --preview preview.png           # save the debug rendering
//!
//! JSON goes to stdout, a summary to stderr. Set `RUST_LOG=debug` for
//! pipeline logs.

use anyhow::{bail, Context, Result};
use clap::Parser;
use dominant_colors::{
    constants, image_loader::load_image, Color, DominantColor, PipelineConfig, Point, Rect,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dominant-colors")]
#[command(author, version, about = "Extract the dominant colors of a photo's subject", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Number of k-means clusters
    #[arg(short = 'k', long, default_value_t = constants::quantizer::DEFAULT_CLUSTERS)]
    clusters: usize,

    /// CIE94 merge threshold (0 disables merging)
    #[arg(short, long, default_value_t = constants::merge::DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Foreground rectangle as x,y,width,height (repeatable)
    #[arg(long, value_parser = parse_rect)]
    rect: Vec<Rect>,

    /// Background rectangle as x,y,width,height (repeatable)
    #[arg(long, value_parser = parse_rect)]
    background: Vec<Rect>,

    /// Color-removal rectangle as x,y,width,height (repeatable)
    #[arg(long, value_parser = parse_rect)]
    skin: Vec<Rect>,

    /// Foreground point as x,y,radius (repeatable)
    #[arg(long, value_parser = parse_point)]
    point: Vec<(Point, i32)>,

    /// Haar cascade for face-based skin removal
    #[cfg(feature = "opencv")]
    #[arg(long)]
    faces: Option<PathBuf>,

    /// Pipeline configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a preview PNG of the segmentation and palette
    #[arg(short, long)]
    preview: Option<PathBuf>,
}

#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    colors: Vec<ColorOutput>,
}

#[derive(Serialize)]
struct ColorOutput {
    hex: String,
    rgb: [u8; 3],
    lab: [f32; 3],
    pixel_count: u64,
    /// Share of the foreground, in percent
    percent: f32,
}

fn parse_numbers(s: &str, expected: usize) -> std::result::Result<Vec<i32>, String> {
    let values: Vec<i32> = s
        .split(',')
        .map(|part| part.trim().parse::<i32>().map_err(|e| format!("'{part}': {e}")))
        .collect::<std::result::Result<_, _>>()?;
    if values.len() != expected {
        return Err(format!("expected {expected} comma-separated values, got {}", values.len()));
    }
    Ok(values)
}

fn parse_rect(s: &str) -> std::result::Result<Rect, String> {
    let v = parse_numbers(s, 4)?;
    Ok(Rect::new(v[0], v[1], v[2], v[3]))
}

fn parse_point(s: &str) -> std::result::Result<(Point, i32), String> {
    let v = parse_numbers(s, 3)?;
    Ok((Point::new(v[0], v[1]), v[2]))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let image = load_image(&args.image).with_context(|| format!("loading {}", args.image.display()))?;
    let (width, height) = image.dimensions();

    let mut analysis = DominantColor::with_config(config);
    #[cfg(feature = "opencv")]
    if let Some(cascade) = &args.faces {
        let detector = dominant_colors::CascadeFaceDetector::new(cascade)?;
        analysis = analysis
            .with_face_detector(detector)
            .with_segmenter(dominant_colors::GrabCutSegmenter::new());
    }
    analysis.set_image(image);

    // Later marks override earlier ones, so the default area goes first
    if args.rect.is_empty() && args.point.is_empty() && !analysis.mark_default_area() {
        bail!("image is too small to mark");
    }
    for rect in &args.rect {
        report(analysis.mark_rect(*rect, true), "rect", rect);
    }
    for rect in &args.background {
        report(analysis.mark_rect(*rect, false), "background", rect);
    }
    for (point, radius) in &args.point {
        report(analysis.mark_point(*point, *radius, true), "point", point);
    }
    for rect in &args.skin {
        report(analysis.mark_removal_rect(*rect), "skin", rect);
    }
    #[cfg(feature = "opencv")]
    if args.faces.is_some() && !analysis.mark_face() {
        eprintln!("No faces found");
    }

    if let Err(error) = analysis.grab_cut() {
        eprintln!("Segmentation failed: {error}");
        eprintln!("Suggestion: {}", error.user_message());
        std::process::exit(1);
    }
    analysis.k_means(args.clusters);
    analysis.minimize_colors_with_distance_threshold(args.threshold);

    let palette = analysis.palette();
    let total: u64 = palette.iter().map(|s| s.pixel_count).sum();
    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        colors: palette
            .iter()
            .map(|swatch| {
                let lab = swatch.color.to_lab();
                ColorOutput {
                    hex: swatch.color.to_hex(),
                    rgb: swatch.color.to_rgb8(),
                    lab: [lab.l, lab.a, lab.b],
                    pixel_count: swatch.pixel_count,
                    percent: if total == 0 {
                        0.0
                    } else {
                        swatch.pixel_count as f32 * 100.0 / total as f32
                    },
                }
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    eprintln!();
    eprintln!("Dominant colors ({}):", output.colors.len());
    for color in &output.colors {
        eprintln!("  {}  {:5.1}%", color.hex, color.percent);
    }

    if let Some(path) = &args.preview {
        let preview = analysis
            .render_preview(Color::WHITE, Color::from_rgb8(255, 0, 255), 1.0)
            .context("no segmentation to preview")?;
        preview
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Preview saved to {}", path.display());
    }

    Ok(())
}

fn report(accepted: bool, kind: &str, what: &impl std::fmt::Debug) {
    if !accepted {
        eprintln!("Warning: ignored {kind} {what:?} (empty or outside the image)");
    }
}
