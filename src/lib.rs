//! Color-threshold fruit detection.
//!
//! Segments apples, oranges and bananas by HSV range, extracts outer regions
//! from the masks, and ranks bananas by a positional ripeness heuristic.

pub mod detection;
pub mod models;
pub mod pipeline;

pub use models::{BoundingBox, Detection, Region, RipenessAssignment};
pub use detection::{FruitDetector, FruitDetectionResult, RipenessResult};
pub use detection::classifier::FruitFilter;
pub use detection::ripeness::Locale;
pub use detection::segmentation::{segment, ColorSegmenter, Mask, SegmentationMasks};
pub use pipeline::{Pipeline, PipelineData, PipelineStep, PipelineContext, MetadataValue};
