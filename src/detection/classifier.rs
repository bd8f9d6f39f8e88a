use image::{Rgb, RgbImage};
use std::str::FromStr;

use crate::detection::annotate::Annotator;
use crate::detection::contours::extract_regions;
use crate::detection::segmentation::SegmentationMasks;
use crate::models::Detection;

/// Regions at or below this area are treated as noise
pub const MIN_FRUIT_AREA: f64 = 1000.0;

pub const DETECTION_LABEL_SIZE: f32 = 20.0;

pub const DEFAULT_BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Display color per category key; anything unlisted is drawn green
static DISPLAY_COLORS: &[(&str, Rgb<u8>)] = &[
    ("apple", Rgb([255, 0, 0])),
    ("orange", Rgb([255, 165, 0])),
];

pub fn display_color(category: &str) -> Rgb<u8> {
    DISPLAY_COLORS
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_BOX_COLOR)
}

/// Which categories a detection pass reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FruitFilter {
    All,
    /// Lowercased category name; need not exist in the catalog
    Category(String),
}

impl FruitFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            FruitFilter::All => true,
            FruitFilter::Category(name) => name.eq_ignore_ascii_case(category),
        }
    }
}

impl From<&str> for FruitFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") || value.eq_ignore_ascii_case("all fruits") {
            FruitFilter::All
        } else {
            FruitFilter::Category(value.to_lowercase())
        }
    }
}

impl FromStr for FruitFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FruitFilter::from(s))
    }
}

impl std::fmt::Display for FruitFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FruitFilter::All => write!(f, "all"),
            FruitFilter::Category(name) => write!(f, "{}", name),
        }
    }
}

/// Turn the masks of every category accepted by `filter` into detections,
/// in catalog order then region discovery order.
pub fn classify(masks: &SegmentationMasks, filter: &FruitFilter, min_area: f64) -> Vec<Detection> {
    let mut detections = Vec::new();

    for mask in masks.iter().filter(|m| filter.matches(m.category)) {
        let regions = extract_regions(mask, min_area);
        log::debug!("{}: {} regions above area {}", mask.category, regions.len(), min_area);

        for region in regions {
            log::debug!(
                "  {} at ({}, {}) {}x{} area={:.0} fill={:.2}",
                mask.category,
                region.bbox.x,
                region.bbox.y,
                region.bbox.width,
                region.bbox.height,
                region.area,
                region.fill_ratio()
            );
            detections.push(Detection {
                label: capitalize(mask.category),
                bbox: region.bbox,
                area: region.area,
                category: mask.category,
            });
        }
    }

    detections
}

/// Draw detections in order; overlapping boxes are overdrawn by later ones
pub fn draw_detections(canvas: &mut RgbImage, detections: &[Detection], annotator: &Annotator) {
    for detection in detections {
        let color = display_color(detection.category);
        annotator.draw_labeled_box(canvas, &detection.bbox, &detection.label, color, DETECTION_LABEL_SIZE);
    }
}

/// "apple" -> "Apple"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
