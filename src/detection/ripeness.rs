//! Banana ripeness ranking.
//!
//! Ripeness is inferred from placement alone: bananas are expected to be laid
//! out from least ripe on the left to most ripe on the right, so the ranker
//! orders regions by their left edge and hands out levels in that order. No
//! pixel color is consulted.

use image::{Rgb, RgbImage};

use crate::detection::annotate::Annotator;
use crate::models::{Region, RipenessAssignment};

/// Smaller than the general fruit threshold; fragmented banana masks still rank
pub const MIN_BANANA_AREA: f64 = 300.0;

pub const RIPENESS_LEVELS: usize = 7;

pub const RIPENESS_LABEL_SIZE: f32 = 17.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipenessLevel {
    pub label: &'static str,
    pub color: [u8; 3],
}

const fn level(label: &'static str, color: [u8; 3]) -> RipenessLevel {
    RipenessLevel { label, color }
}

pub type Palette = [RipenessLevel; RIPENESS_LEVELS];

pub static ENGLISH_PALETTE: Palette = [
    level("Level 1 (Hard Green)", [0, 255, 0]),
    level("Level 2 (Green-Yellowish)", [50, 200, 0]),
    level("Level 3 (Yellow-Green)", [255, 165, 0]),
    level("Level 4 (Fully Yellow)", [255, 255, 0]),
    level("Level 5 (Yellow w/ Few Spots)", [200, 255, 0]),
    level("Level 6 (Yellow w/ Many Spots)", [255, 180, 0]),
    level("Level 7 (Mostly Spotted)", [255, 100, 50]),
];

pub static INDONESIAN_PALETTE: Palette = [
    level("Level 1 (Hijau)", [0, 255, 0]),
    level("Level 2 (Hijau Kekuningan)", [0, 255, 50]),
    level("Level 3 (Kuning Kehijauan)", [0, 255, 100]),
    level("Level 4 (Kuning Penuh)", [255, 255, 0]),
    level("Level 5 (Kuning dengan Bintik Kecil)", [255, 200, 0]),
    level("Level 6 (Bintik Cokelat Banyak)", [255, 100, 0]),
    level("Level 7 (Sangat Matang/Cokelat)", [255, 0, 0]),
];

/// Language of the ripeness labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Locale {
    #[default]
    English,
    Indonesian,
}

impl Locale {
    pub fn palette(&self) -> &'static Palette {
        match self {
            Locale::English => &ENGLISH_PALETTE,
            Locale::Indonesian => &INDONESIAN_PALETTE,
        }
    }
}

/// Sort regions left to right and give the first seven levels 1..=7.
///
/// The sort is stable, so regions sharing an x keep their discovery order.
/// Regions past the seventh get nothing.
pub fn rank_regions(mut regions: Vec<Region>, palette: &Palette) -> Vec<RipenessAssignment> {
    regions.sort_by_key(|r| r.bbox.x);

    regions
        .into_iter()
        .zip(palette.iter())
        .enumerate()
        .map(|(i, (region, level))| RipenessAssignment {
            bbox: region.bbox,
            level: (i + 1) as u8,
            label: level.label,
            color: level.color,
        })
        .collect()
}

pub fn draw_assignments(canvas: &mut RgbImage, assignments: &[RipenessAssignment], annotator: &Annotator) {
    for assignment in assignments {
        let color = Rgb(assignment.color);
        annotator.draw_labeled_box(canvas, &assignment.bbox, assignment.label, color, RIPENESS_LABEL_SIZE);
    }
}
