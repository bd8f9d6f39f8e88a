use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;

use crate::detection::segmentation::Mask;
use crate::models::{BoundingBox, Region};

/// Find outer regions in a binary mask and keep those with area > `min_area`.
///
/// Only outermost boundaries are traced into regions: holes, and anything
/// nested inside a hole, belong to the enclosing region. Pixels outside the
/// image count as background, so regions touching the frame are traced like
/// any other. The result follows boundary discovery order (raster order of
/// each boundary's first pixel).
pub fn extract_regions(mask: &Mask, min_area: f64) -> Vec<Region> {
    let contours: Vec<Contour<i32>> = find_contours(&pad_with_background(&mask.image));

    contours
        .iter()
        .filter(|c| is_external(c))
        .filter_map(|c| {
            let points = unpad(&c.points);
            let bbox = bounding_box(&points)?;
            let area = contour_area(&points);
            Some(Region {
                category: mask.category,
                bbox,
                area,
            })
        })
        .filter(|r| r.area > min_area)
        .collect()
}

fn is_external(contour: &Contour<i32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

/// Copy of `image` inside a 1 px zero border.
///
/// The border follower reads a foreground pixel on column 0 as the inside of
/// a hole, so every mask is traced with a background frame around it.
fn pad_with_background(image: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(image.width() + 2, image.height() + 2);
    imageops::replace(&mut padded, image, 1, 1);
    padded
}

/// Move points traced on a padded mask back to mask coordinates
fn unpad(points: &[Point<i32>]) -> Vec<Point<i32>> {
    points.iter().map(|p| Point::new(p.x - 1, p.y - 1)).collect()
}

/// Polygon area of a closed boundary (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    twice_area.abs() as f64 / 2.0
}

/// Smallest axis-aligned box containing every boundary point
pub fn bounding_box(points: &[Point<i32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(BoundingBox::from_extents(
        min_x.max(0) as u32,
        min_y.max(0) as u32,
        max_x.max(0) as u32,
        max_y.max(0) as u32,
    ))
}
