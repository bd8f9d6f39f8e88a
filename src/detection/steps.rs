use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;

use crate::detection::classifier::FruitFilter;
use crate::detection::{preprocessing, FruitDetector};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        Ok(data.with_image(DynamicImage::ImageLuma8(gray)))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Resize to the processing size and equalize contrast
pub struct ContrastEnhancementStep;

impl PipelineStep for ContrastEnhancementStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let enhanced = preprocessing::enhance_contrast(&data.image);
        Ok(data.with_image(DynamicImage::ImageRgb8(enhanced)))
    }

    fn name(&self) -> &str {
        "Contrast Enhancement"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeDetectionStep {
    fn default() -> Self {
        Self {
            low_threshold: preprocessing::CANNY_LOW_THRESHOLD,
            high_threshold: preprocessing::CANNY_HIGH_THRESHOLD,
        }
    }
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        let edges = preprocessing::detect_edges(&gray, self.low_threshold, self.high_threshold);
        let rgb = DynamicImage::ImageLuma8(edges).to_rgb8();
        Ok(data.with_image(DynamicImage::ImageRgb8(rgb)))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Detect fruits; stores "detections" and "fruit_count"
pub struct FruitDetectionStep {
    pub detector: Arc<FruitDetector>,
    pub filter: FruitFilter,
}

impl PipelineStep for FruitDetectionStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let result = self.detector.detect_fruits(&data.image, &self.filter);
        let count = result.detections.len() as i64;

        Ok(data
            .with_image(DynamicImage::ImageRgb8(result.annotated))
            .with_metadata("fruit_filter", MetadataValue::String(self.filter.to_string()))
            .with_metadata("fruit_count", MetadataValue::Int(count))
            .with_metadata("detections", MetadataValue::Detections(result.detections)))
    }

    fn name(&self) -> &str {
        "Fruit Detection"
    }
}

/// Rank bananas by position; stores "ripeness" and "banana_count"
pub struct BananaRipenessStep {
    pub detector: Arc<FruitDetector>,
}

impl PipelineStep for BananaRipenessStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let result = self.detector.rank_banana_ripeness(&data.image);
        let count = result.assignments.len() as i64;

        Ok(data
            .with_image(DynamicImage::ImageRgb8(result.annotated))
            .with_metadata("banana_count", MetadataValue::Int(count))
            .with_metadata("ripeness", MetadataValue::Ripeness(result.assignments)))
    }

    fn name(&self) -> &str {
        "Banana Ripeness"
    }
}
