use serde::Serialize;

/// Axis-aligned bounding box, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a box from inclusive min/max pixel coordinates
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A connected foreground area traced from the outer boundary of a mask
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Category key of the mask this region was found in
    pub category: &'static str,
    pub bbox: BoundingBox,
    /// Area enclosed by the traced boundary (not the bounding box area)
    pub area: f64,
}

impl Region {
    /// Fraction of the bounding box covered by the region
    pub fn fill_ratio(&self) -> f64 {
        let bbox_area = self.bbox.area();
        if bbox_area == 0 {
            return 0.0;
        }
        self.area / bbox_area as f64
    }
}

/// A region classified as a fruit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Human-readable label, e.g. "Apple"
    pub label: String,
    pub bbox: BoundingBox,
    pub area: f64,
    /// Raw category key, used for the display color lookup
    pub category: &'static str,
}

/// A banana region with its positional ripeness level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RipenessAssignment {
    pub bbox: BoundingBox,
    /// 1 (least ripe) to 7 (most ripe)
    pub level: u8,
    pub label: &'static str,
    /// RGB display color
    pub color: [u8; 3],
}
