use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;

use crate::models::{Detection, RipenessAssignment};

/// Data that flows through the pipeline: the current image and whatever
/// earlier steps recorded about it
#[derive(Clone)]
pub struct PipelineData {
    pub image: DynamicImage,

    /// Step results keyed by name (e.g. "detections", "fruit_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone)]
pub enum MetadataValue {
    Int(i64),
    String(String),
    Detections(Vec<Detection>),
    Ripeness(Vec<RipenessAssignment>),
}

impl PipelineData {
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            metadata: HashMap::new(),
        }
    }

    /// Replace the image, keeping metadata from earlier steps
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = image;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn get_detections(&self, key: &str) -> Option<&[Detection]> {
        match self.metadata.get(key) {
            Some(MetadataValue::Detections(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn get_ripeness(&self, key: &str) -> Option<&[RipenessAssignment]> {
        match self.metadata.get(key) {
            Some(MetadataValue::Ripeness(v)) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    /// Directory receiving one image per step, if enabled
    pub debug_dir: Option<PathBuf>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform the data; steps may replace the image and add metadata
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug file names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug_dir = Some(output_dir);
        Ok(self)
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order on `input`
    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<PipelineData> {
        if let Some(dir) = &self.context.debug_dir {
            save_debug_image(dir, "00_input.png", &input)?;
        }

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            log::debug!("Running step {}: {}", step_idx + 1, step.name());
            data = step.process(data, &self.context)?;

            if let Some(dir) = &self.context.debug_dir {
                let filename = format!(
                    "{:02}_{}.png",
                    step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_")
                );
                save_debug_image(dir, &filename, &data.image)?;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn save_debug_image(dir: &Path, filename: &str, image: &DynamicImage) -> Result<()> {
    let path = dir.join(filename);
    image
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))?;
    log::debug!("  Debug: saved {}", filename);
    Ok(())
}
