//! Generate a default pipeline configuration file
//!
//! Creates a JSON config with all default parameters, ready for editing and
//! passing to the `cli` example with `--config`.

use dominant_colors::PipelineConfig;
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} configs/portrait.json", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = PipelineConfig::default();

    match config.to_json_file(output_path) {
        Ok(_) => {
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!("  Working image: {} pixels max", config.max_pixels);
            eprintln!(
                "  Marks: border {:.0}%, default margin {:.0}%",
                config.mask.border_percent * 100.0,
                config.mask.default_area_margin_percent * 100.0
            );
            eprintln!(
                "  Forced foreground: center {:.0}% when under {:.0}% coverage",
                config.mask.force_foreground_rect_percent * 100.0,
                config.mask.force_foreground_pixel_percent * 100.0
            );
            eprintln!("  Segmenter: {} iterations", config.segmenter.iterations);
            eprintln!(
                "  K-means: up to {} rounds, skin ratio {:.2}",
                config.quantizer.max_iterations, config.quantizer.color_removal_ratio
            );
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
