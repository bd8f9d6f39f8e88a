use clap::{Parser, Subcommand, ValueEnum};
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fruitscan::detection::annotate::Annotator;
use fruitscan::detection::preprocessing;
use fruitscan::detection::steps::*;
use fruitscan::{FruitDetector, FruitFilter, Locale, Pipeline};

#[derive(Parser)]
#[command(name = "fruitscan")]
#[command(about = "Detect fruits by color and rank banana ripeness")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TrueType font used to draw labels (defaults to a bundled font)
    #[arg(long, value_name = "TTF", global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect apples, oranges and bananas
    Detect {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// "all" or a single fruit name (case-insensitive)
        #[arg(long, default_value = "all")]
        fruit: String,

        /// Minimum region area for a detection
        #[arg(long, default_value_t = fruitscan::detection::classifier::MIN_FRUIT_AREA)]
        min_area: f64,

        /// Save the annotated image
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Print detections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank bananas by ripeness, left (least ripe) to right (most ripe)
    Ripeness {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[arg(long, value_enum, default_value_t = Locale::English)]
        locale: Locale,

        /// Minimum region area for a banana
        #[arg(long, default_value_t = fruitscan::detection::ripeness::MIN_BANANA_AREA)]
        min_banana_area: f64,

        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Save one binary mask per fruit category
    Segment {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// Apply a single inspection transform
    Preprocess {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[arg(long, value_enum)]
        mode: PreprocessMode,

        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Chain transforms and detectors, e.g. --step contrast --step detect
    Pipeline {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        #[arg(long = "step", value_enum, required = true)]
        steps: Vec<StepKind>,

        /// Fruit filter used by the detect step
        #[arg(long, default_value = "all")]
        fruit: String,

        #[arg(long, value_enum, default_value_t = Locale::English)]
        locale: Locale,

        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Save each step's output to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PreprocessMode {
    Grayscale,
    Contrast,
    Edges,
}

#[derive(Clone, Copy, ValueEnum)]
enum StepKind {
    Grayscale,
    Contrast,
    Edges,
    Detect,
    Ripeness,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut detector = FruitDetector::new();
    if let Some(font_path) = &args.font {
        detector = detector.with_font(Annotator::load_font(font_path)?);
    }
    if !detector.annotator().has_font() {
        log::warn!("No usable font, labels will not be drawn");
    }

    match args.command {
        Command::Detect { image_path, fruit, min_area, out, json } => {
            let img = load_image(&image_path)?;
            let filter = FruitFilter::from(fruit.as_str());
            let result = detector.with_min_fruit_area(min_area).detect_fruits(&img, &filter);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("\n=== Fruit Detection Results ({}) ===", filter);
                println!("Total detections: {}", result.detections.len());
                for d in &result.detections {
                    println!("  {} at ({}, {}) {}x{} - area: {:.0}",
                            d.label, d.bbox.x, d.bbox.y, d.bbox.width, d.bbox.height, d.area);
                }
            }

            if let Some(out) = out {
                save_image(&DynamicImage::ImageRgb8(result.annotated), &out)?;
            }
        }

        Command::Ripeness { image_path, locale, min_banana_area, out, json } => {
            let img = load_image(&image_path)?;
            let result = detector
                .with_locale(locale)
                .with_min_banana_area(min_banana_area)
                .rank_banana_ripeness(&img);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("\n=== Banana Ripeness Results ===");
                println!("Bananas ranked: {}", result.assignments.len());
                for a in &result.assignments {
                    println!("  {} at ({}, {}) {}x{}",
                            a.label, a.bbox.x, a.bbox.y, a.bbox.width, a.bbox.height);
                }
            }

            if let Some(out) = out {
                save_image(&DynamicImage::ImageRgb8(result.annotated), &out)?;
            }
        }

        Command::Segment { image_path, out_dir } => {
            let img = load_image(&image_path)?;
            std::fs::create_dir_all(&out_dir)?;

            for mask in detector.segment(&img) {
                let path = out_dir.join(format!("{}_mask.png", mask.category));
                log::info!("{}: {} pixels", mask.category, mask.pixel_count());
                save_image(&DynamicImage::ImageLuma8(mask.image), &path)?;
            }
        }

        Command::Preprocess { image_path, mode, out } => {
            let img = load_image(&image_path)?;
            let processed = match mode {
                PreprocessMode::Grayscale => DynamicImage::ImageLuma8(preprocessing::to_grayscale(&img)),
                PreprocessMode::Contrast => DynamicImage::ImageRgb8(preprocessing::enhance_contrast(&img)),
                PreprocessMode::Edges => DynamicImage::ImageRgb8(preprocessing::edge_map(&img)),
            };
            save_image(&processed, &out)?;
        }

        Command::Pipeline { image_path, steps, fruit, locale, out, debug_out } => {
            let img = load_image(&image_path)?;
            let detector = Arc::new(detector.with_locale(locale));

            let mut pipeline = Pipeline::new();
            for step in steps {
                pipeline = match step {
                    StepKind::Grayscale => pipeline.add_step_boxed(Box::new(GrayscaleStep)),
                    StepKind::Contrast => pipeline.add_step_boxed(Box::new(ContrastEnhancementStep)),
                    StepKind::Edges => pipeline.add_step_boxed(Box::new(EdgeDetectionStep::default())),
                    StepKind::Detect => pipeline.add_step(Arc::new(FruitDetectionStep {
                        detector: detector.clone(),
                        filter: FruitFilter::from(fruit.as_str()),
                    })),
                    StepKind::Ripeness => pipeline.add_step(Arc::new(BananaRipenessStep {
                        detector: detector.clone(),
                    })),
                };
            }

            if let Some(debug_dir) = debug_out {
                pipeline = pipeline.with_debug(debug_dir)?;
            }

            log::debug!("Running pipeline with {} steps", pipeline.len());
            let data = pipeline.run(img)?;

            if let Some(detections) = data.get_detections("detections") {
                println!("Fruit detections: {}", detections.len());
                for d in detections {
                    println!("  {} at ({}, {})", d.label, d.bbox.x, d.bbox.y);
                }
            }
            if let Some(assignments) = data.get_ripeness("ripeness") {
                println!("Bananas ranked: {}", assignments.len());
                for a in assignments {
                    println!("  {} at ({}, {})", a.label, a.bbox.x, a.bbox.y);
                }
            }

            if let Some(out) = out {
                save_image(&data.image, &out)?;
            }
        }
    }

    Ok(())
}

fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    log::debug!("Loading image: {:?}", path);
    let img = ImageReader::open(path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    log::debug!("Image loaded: {}x{}", img.width(), img.height());
    Ok(img)
}

fn save_image(img: &DynamicImage, path: &Path) -> anyhow::Result<()> {
    img.save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
    log::info!("Saved {}", path.display());
    Ok(())
}
