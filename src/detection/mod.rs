pub mod annotate;
pub mod classifier;
pub mod contours;
pub mod preprocessing;
pub mod ripeness;
pub mod segmentation;
pub mod steps;

use ab_glyph::FontArc;
use image::{DynamicImage, RgbImage};
use serde::Serialize;

use crate::models::{Detection, RipenessAssignment};
use annotate::Annotator;
use classifier::{FruitFilter, MIN_FRUIT_AREA};
use ripeness::{Locale, MIN_BANANA_AREA};
use segmentation::{
    to_hsv, ColorSegmenter, FruitCategory, Mask, SegmentationMasks, BANANA, BANANA_FALLBACK_RANGE,
};

/// Annotated image plus the detections drawn on it
#[derive(Debug, Clone, Serialize)]
pub struct FruitDetectionResult {
    #[serde(skip)]
    pub annotated: RgbImage,
    pub detections: Vec<Detection>,
}

/// Annotated image plus the ripeness levels drawn on it
#[derive(Debug, Clone, Serialize)]
pub struct RipenessResult {
    #[serde(skip)]
    pub annotated: RgbImage,
    pub assignments: Vec<RipenessAssignment>,
}

/// Color-threshold fruit detector.
///
/// Holds only immutable configuration; every call works on its own copy of
/// the input image.
#[derive(Debug, Clone)]
pub struct FruitDetector {
    pub segmenter: ColorSegmenter,
    /// Regions must be strictly larger than this to count as fruit
    pub min_fruit_area: f64,
    /// Area threshold for ripeness ranking
    pub min_banana_area: f64,
    pub locale: Locale,
    annotator: Annotator,
}

impl FruitDetector {
    pub fn new() -> Self {
        Self {
            segmenter: ColorSegmenter::new(),
            min_fruit_area: MIN_FRUIT_AREA,
            min_banana_area: MIN_BANANA_AREA,
            locale: Locale::default(),
            annotator: Annotator::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: &'static [FruitCategory]) -> Self {
        self.segmenter = ColorSegmenter::with_catalog(catalog);
        self
    }

    pub fn with_min_fruit_area(mut self, area: f64) -> Self {
        self.min_fruit_area = area;
        self
    }

    pub fn with_min_banana_area(mut self, area: f64) -> Self {
        self.min_banana_area = area;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Draw labels with `font` instead of the bundled one
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.annotator = self.annotator.with_font(font);
        self
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// One mask per catalog category
    pub fn segment(&self, img: &DynamicImage) -> SegmentationMasks {
        self.segmenter.segment(img)
    }

    /// Detections for the categories accepted by `filter`, without drawing
    pub fn find_fruits(&self, img: &DynamicImage, filter: &FruitFilter) -> Vec<Detection> {
        let masks = self.segment(img);
        classifier::classify(&masks, filter, self.min_fruit_area)
    }

    /// Detect fruits and draw them on a copy of `img`.
    ///
    /// A filter naming no catalog category yields no detections and an
    /// untouched copy.
    pub fn detect_fruits(&self, img: &DynamicImage, filter: &FruitFilter) -> FruitDetectionResult {
        let detections = self.find_fruits(img, filter);
        log::info!("Detected {} fruits (filter: {})", detections.len(), filter);

        let mut annotated = img.to_rgb8();
        classifier::draw_detections(&mut annotated, &detections, &self.annotator);

        FruitDetectionResult { annotated, detections }
    }

    /// Ripeness levels for up to seven banana regions, without drawing
    pub fn find_ripeness(&self, img: &DynamicImage) -> Vec<RipenessAssignment> {
        let mask = self.banana_mask(img);
        let regions = contours::extract_regions(&mask, self.min_banana_area);
        log::debug!("{} banana regions above area {}", regions.len(), self.min_banana_area);

        if regions.len() > ripeness::RIPENESS_LEVELS {
            log::info!(
                "Found {} banana regions, ranking only the {} leftmost",
                regions.len(),
                ripeness::RIPENESS_LEVELS
            );
        }

        ripeness::rank_regions(regions, self.locale.palette())
    }

    /// Rank bananas left to right and draw their levels on a copy of `img`
    pub fn rank_banana_ripeness(&self, img: &DynamicImage) -> RipenessResult {
        let assignments = self.find_ripeness(img);
        log::info!("Assigned {} ripeness levels", assignments.len());

        let mut annotated = img.to_rgb8();
        ripeness::draw_assignments(&mut annotated, &assignments, &self.annotator);

        RipenessResult { annotated, assignments }
    }

    fn banana_mask(&self, img: &DynamicImage) -> Mask {
        let hsv = to_hsv(&img.to_rgb8());
        let masks = self.segmenter.segment_hsv(&hsv);

        match masks.into_iter().find(|m| m.category == BANANA) {
            Some(mask) => mask,
            None => {
                log::warn!("No banana mask from segmentation, using broad fallback range");
                Mask::from_ranges(BANANA, &hsv, &[BANANA_FALLBACK_RANGE])
            }
        }
    }
}

impl Default for FruitDetector {
    fn default() -> Self {
        Self::new()
    }
}
