use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::edges::canny;

/// Size every contrast-enhanced image is normalized to
pub const PROCESSING_WIDTH: u32 = 800;
pub const PROCESSING_HEIGHT: u32 = 600;

pub const CLAHE_CLIP_LIMIT: f32 = 4.0;
pub const CLAHE_GRID: (u32, u32) = (8, 8);

pub const CANNY_LOW_THRESHOLD: f32 = 100.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 200.0;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Resize to the processing size and apply CLAHE to the brightness channel.
///
/// Each pixel's channels are scaled by the same factor, which keeps hue and
/// saturation unchanged.
pub fn enhance_contrast(img: &DynamicImage) -> RgbImage {
    let resized = imageops::resize(
        &img.to_rgb8(),
        PROCESSING_WIDTH,
        PROCESSING_HEIGHT,
        FilterType::Triangle,
    );

    let value = GrayImage::from_fn(resized.width(), resized.height(), |x, y| {
        let p = resized.get_pixel(x, y);
        Luma([p[0].max(p[1]).max(p[2])])
    });
    let equalized = clahe(&value, CLAHE_CLIP_LIMIT, CLAHE_GRID);

    RgbImage::from_fn(resized.width(), resized.height(), |x, y| {
        let p = resized.get_pixel(x, y);
        let old_v = value.get_pixel(x, y)[0];
        if old_v == 0 {
            return *p;
        }
        let gain = equalized.get_pixel(x, y)[0] as f32 / old_v as f32;
        Rgb(p.0.map(|c| (c as f32 * gain).round().min(255.0) as u8))
    })
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Canny edges with the default thresholds, expanded back to three channels
pub fn edge_map(img: &DynamicImage) -> RgbImage {
    let edges = detect_edges(&to_grayscale(img), CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);
    DynamicImage::ImageLuma8(edges).to_rgb8()
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a `grid` of tiles, each tile gets a clipped
/// histogram-equalization lookup table, and every pixel is mapped through a
/// bilinear blend of its four nearest tile tables.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid: (u32, u32)) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tile_w = width.div_ceil(grid.0.max(1)).max(1);
    let tile_h = height.div_ceil(grid.1.max(1)).max(1);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let (x0, y0) = (tx * tile_w, ty * tile_h);
            let (x1, y1) = ((x0 + tile_w).min(width), (y0 + tile_h).min(height));

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[gray.get_pixel(x, y)[0] as usize] += 1;
                }
            }
            luts.push(tile_lut(&mut hist, (x1 - x0) * (y1 - y0), clip_limit));
        }
    }

    let lut_at = |tx: u32, ty: u32, v: usize| luts[(ty * tiles_x + tx) as usize][v] as f32;

    GrayImage::from_fn(width, height, |x, y| {
        let (tx0, tx1, ax) = neighbours(x, tile_w, tiles_x);
        let (ty0, ty1, ay) = neighbours(y, tile_h, tiles_y);
        let v = gray.get_pixel(x, y)[0] as usize;

        let top = lut_at(tx0, ty0, v) * (1.0 - ax) + lut_at(tx1, ty0, v) * ax;
        let bottom = lut_at(tx0, ty1, v) * (1.0 - ax) + lut_at(tx1, ty1, v) * ax;
        Luma([(top * (1.0 - ay) + bottom * ay).round().min(255.0) as u8])
    })
}

/// Tile indices surrounding `pos` along one axis and the weight of the second
fn neighbours(pos: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let f = (pos as f32 + 0.5) / tile as f32 - 0.5;
    let first = f.floor().clamp(0.0, (tiles - 1) as f32) as u32;
    let second = (first + 1).min(tiles - 1);
    let weight = (f - first as f32).clamp(0.0, 1.0);
    (first, second, weight)
}

fn tile_lut(hist: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let per_bin = excess / 256;
    let residual = excess % 256;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if (i as u32) < residual {
            *bin += 1;
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut cdf = 0u32;
    for (value, bin) in lut.iter_mut().zip(hist.iter()) {
        cdf += bin;
        *value = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
