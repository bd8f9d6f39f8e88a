#![allow(dead_code)]

use fruitscan::Mask;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// Color constants for tests, chosen to fall in exactly one HSV range each
/// (hue on the 0..=179 scale in brackets)
pub const TEST_RED: Rgb<u8> = Rgb([220, 20, 20]); // apple, H=0
pub const TEST_ORANGE: Rgb<u8> = Rgb([255, 100, 0]); // orange, H=12
pub const TEST_YELLOW: Rgb<u8> = Rgb([240, 220, 20]); // banana, H=27
pub const TEST_BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Creates a black RGB canvas
pub fn blank_canvas(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, TEST_BLACK)
}

/// Fills a `w`x`h` rectangle with its top-left corner at (x, y)
pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for py in y..y + h {
        for px in x..x + w {
            img.put_pixel(px, py, color);
        }
    }
}

/// Canvas with one filled rectangle per (x, y, w, h, color) entry
pub fn scene(width: u32, height: u32, rects: &[(u32, u32, u32, u32, Rgb<u8>)]) -> DynamicImage {
    let mut img = blank_canvas(width, height);
    for &(x, y, w, h, color) in rects {
        fill_rect(&mut img, x, y, w, h, color);
    }
    DynamicImage::ImageRgb8(img)
}

/// Binary mask with filled rectangles given as (x, y, w, h)
pub fn mask_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Mask {
    let mut image = GrayImage::new(width, height);
    for &(x, y, w, h) in rects {
        for py in y..y + h {
            for px in x..x + w {
                image.put_pixel(px, py, Luma([255u8]));
            }
        }
    }
    Mask { category: "test", image }
}

/// Area traced for a filled w x h rectangle: the boundary runs through
/// the centers of the edge pixels
pub fn rect_contour_area(w: u32, h: u32) -> f64 {
    ((w - 1) * (h - 1)) as f64
}
