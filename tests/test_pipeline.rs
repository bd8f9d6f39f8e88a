//! Integration tests for the step pipeline.
//!
//! Tests cover:
//! - Chaining transforms with detectors and reading step metadata
//! - Partial runs
//! - Debug output layout and the empty-directory requirement

mod common;

use fruitscan::detection::steps::*;
use fruitscan::Pipeline;
use std::sync::Arc;

use common::*;

fn detection_pipeline(detector: Arc<FruitDetector>) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(FruitDetectionStep {
            detector: detector.clone(),
            filter: FruitFilter::All,
        }))
        .add_step(Arc::new(BananaRipenessStep { detector }))
}

#[test]
fn test_detection_steps_record_metadata() -> anyhow::Result<()> {
    let img = scene(300, 100, &[(10, 10, 50, 50, TEST_RED), (110, 10, 50, 50, TEST_YELLOW)]);
    let data = detection_pipeline(Arc::new(FruitDetector::new())).run(img)?;

    assert_eq!(data.get_int("fruit_count"), Some(2));
    assert_eq!(data.get_string("fruit_filter"), Some("all"));
    assert_eq!(data.get_detections("detections").map(|d| d.len()), Some(2));
    assert_eq!(data.get_int("banana_count"), Some(1));
    assert_eq!(data.get_ripeness("ripeness").map(|r| r[0].level), Some(1));
    Ok(())
}

#[test]
fn test_preprocessing_steps_transform_image() -> anyhow::Result<()> {
    let img = scene(160, 120, &[(40, 40, 40, 40, TEST_ORANGE)]);
    let pipeline = Pipeline::new()
        .add_step_boxed(Box::new(ContrastEnhancementStep))
        .add_step_boxed(Box::new(GrayscaleStep))
        .add_step_boxed(Box::new(EdgeDetectionStep::default()));

    assert_eq!(pipeline.len(), 3);
    let data = pipeline.run(img)?;

    assert_eq!((data.image.width(), data.image.height()), (800, 600));
    assert!(data.metadata.is_empty());
    Ok(())
}

#[test]
fn test_run_partial_stops_early() -> anyhow::Result<()> {
    let img = scene(300, 100, &[(10, 10, 50, 50, TEST_RED)]);
    let data = detection_pipeline(Arc::new(FruitDetector::new())).run_partial(img, 1)?;

    assert_eq!(data.get_int("fruit_count"), Some(1));
    assert!(data.get_ripeness("ripeness").is_none());
    Ok(())
}

#[test]
fn test_debug_output_written_per_step() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let img = scene(120, 80, &[(10, 10, 40, 40, TEST_YELLOW)]);

    Pipeline::new()
        .add_step_boxed(Box::new(GrayscaleStep))
        .add_step(Arc::new(BananaRipenessStep {
            detector: Arc::new(FruitDetector::new()),
        }))
        .with_debug(debug_dir.clone())?
        .run(img)?;

    assert!(debug_dir.join("00_input.png").exists());
    assert!(debug_dir.join("01_grayscale_conversion.png").exists());
    assert!(debug_dir.join("02_banana_ripeness.png").exists());
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;

    let result = Pipeline::new().with_debug(dir.path().to_path_buf());
    assert!(result.is_err());
    Ok(())
}
