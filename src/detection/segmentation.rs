use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// Inclusive range over 8-bit HSV, hue on the 0..=179 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Red hues wrap around 0, so apples need two red ranges plus a green one
pub const APPLE_RANGES: &[HsvRange] = &[
    HsvRange::new([0, 100, 100], [10, 255, 255]),
    HsvRange::new([160, 100, 100], [179, 255, 255]),
    HsvRange::new([60, 80, 60], [90, 255, 255]),
];

pub const ORANGE_RANGES: &[HsvRange] = &[HsvRange::new([10, 150, 100], [25, 255, 255])];

/// Broad enough to cover green, yellow and brown bananas
pub const BANANA_RANGES: &[HsvRange] = &[HsvRange::new([15, 40, 40], [60, 255, 255])];

/// Used by the ripeness ranker when a catalog has no banana entry
pub const BANANA_FALLBACK_RANGE: HsvRange = HsvRange::new([15, 40, 40], [60, 255, 255]);

pub const BANANA: &str = "banana";

/// A fruit the segmenter knows how to mask
#[derive(Debug, Clone, Copy)]
pub struct FruitCategory {
    pub key: &'static str,
    pub ranges: &'static [HsvRange],
}

pub static DEFAULT_CATALOG: &[FruitCategory] = &[
    FruitCategory { key: "apple", ranges: APPLE_RANGES },
    FruitCategory { key: "orange", ranges: ORANGE_RANGES },
    FruitCategory { key: BANANA, ranges: BANANA_RANGES },
];

/// Binary presence mask (0 or 255) for one category
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub category: &'static str,
    pub image: GrayImage,
}

impl Mask {
    /// Threshold an HSV image against the union of `ranges`
    pub fn from_ranges(category: &'static str, hsv: &RgbImage, ranges: &[HsvRange]) -> Self {
        Self {
            category,
            image: in_range(hsv, ranges),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.image.pixels().all(|p| p[0] == 0)
    }
}

/// Masks produced by one segmentation pass, in catalog order
#[derive(Debug, Clone, Default)]
pub struct SegmentationMasks {
    masks: Vec<Mask>,
}

impl SegmentationMasks {
    pub fn get(&self, category: &str) -> Option<&Mask> {
        self.masks.iter().find(|m| m.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mask> {
        self.masks.iter()
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.masks.iter().map(|m| m.category)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

impl IntoIterator for SegmentationMasks {
    type Item = Mask;
    type IntoIter = std::vec::IntoIter<Mask>;

    fn into_iter(self) -> Self::IntoIter {
        self.masks.into_iter()
    }
}

/// Color segmenter over a static fruit catalog
#[derive(Debug, Clone, Copy)]
pub struct ColorSegmenter {
    catalog: &'static [FruitCategory],
}

impl ColorSegmenter {
    pub fn new() -> Self {
        Self::with_catalog(DEFAULT_CATALOG)
    }

    pub fn with_catalog(catalog: &'static [FruitCategory]) -> Self {
        Self { catalog }
    }

    /// Produce one mask per catalog entry. Never fails: no matching pixels
    /// gives an all-zero mask.
    pub fn segment(&self, img: &DynamicImage) -> SegmentationMasks {
        let hsv = to_hsv(&img.to_rgb8());
        self.segment_hsv(&hsv)
    }

    pub fn segment_hsv(&self, hsv: &RgbImage) -> SegmentationMasks {
        let masks = self
            .catalog
            .iter()
            .map(|category| Mask::from_ranges(category.key, hsv, category.ranges))
            .collect();
        SegmentationMasks { masks }
    }
}

impl Default for ColorSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment with the default apple/orange/banana catalog
pub fn segment(img: &DynamicImage) -> SegmentationMasks {
    ColorSegmenter::new().segment(img)
}

/// Convert an RGB pixel to 8-bit HSV: H in 0..=179 (degrees / 2), S and V in 0..=255
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let hue = ((hue / 2.0).round() as u32 % 180) as u8;
    [hue, saturation.round() as u8, max as u8]
}

/// Convert a whole image; the HSV triple is stored in the Rgb container
pub fn to_hsv(img: &RgbImage) -> RgbImage {
    let mut hsv = RgbImage::new(img.width(), img.height());
    for (src, dst) in img.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv(src.0));
    }
    hsv
}

/// 255 where the pixel falls in any of `ranges`, 0 elsewhere
pub fn in_range(hsv: &RgbImage, ranges: &[HsvRange]) -> GrayImage {
    let mut mask = GrayImage::new(hsv.width(), hsv.height());
    for (src, dst) in hsv.pixels().zip(mask.pixels_mut()) {
        if ranges.iter().any(|range| range.contains(src.0)) {
            *dst = Luma([255u8]);
        }
    }
    mask
}
