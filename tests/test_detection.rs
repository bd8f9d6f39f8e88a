//! Integration tests for fruit classification.
//!
//! Tests cover:
//! - Detections for each fruit color with the default noise threshold
//! - Case-insensitive category filters and unknown categories
//! - Drawing colors and overdraw order
//! - Repeatable results

mod common;

use fruitscan::detection::classifier::{capitalize, display_color, DEFAULT_BOX_COLOR};
use image::Rgb;

use common::*;

#[test]
fn test_single_apple_detection() {
    let img = scene(200, 100, &[(10, 10, 50, 40, TEST_RED)]);
    let detections = FruitDetector::new().find_fruits(&img, &FruitFilter::All);

    assert_eq!(detections.len(), 1);
    let d = &detections[0];
    assert_eq!(d.label, "Apple");
    assert_eq!(d.category, "apple");
    assert_eq!(d.bbox, BoundingBox::new(10, 10, 50, 40));
    assert_eq!(d.area, rect_contour_area(50, 40));
}

#[test]
fn test_fruit_cut_off_by_frame_is_detected() {
    let img = scene(300, 200, &[(0, 50, 80, 80, TEST_RED), (250, 0, 50, 50, TEST_ORANGE)]);
    let detections = FruitDetector::new().find_fruits(&img, &FruitFilter::All);

    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].bbox, BoundingBox::new(0, 50, 80, 80));
    assert_eq!(detections[0].area, rect_contour_area(80, 80));
    assert_eq!(detections[1].bbox, BoundingBox::new(250, 0, 50, 50));
}

#[test]
fn test_small_regions_are_noise() {
    // 30x30 traces 841 < 1000
    let img = scene(100, 100, &[(10, 10, 30, 30, TEST_RED)]);
    assert!(FruitDetector::new().find_fruits(&img, &FruitFilter::All).is_empty());
}

#[test]
fn test_detections_in_catalog_order() {
    let img = scene(
        300,
        100,
        &[
            (210, 10, 50, 50, TEST_YELLOW),
            (110, 10, 50, 50, TEST_ORANGE),
            (10, 10, 50, 50, TEST_RED),
        ],
    );
    let detections = FruitDetector::new().find_fruits(&img, &FruitFilter::All);
    let labels: Vec<&str> = detections.iter().map(|d| d.label.as_str()).collect();

    assert_eq!(labels, vec!["Apple", "Orange", "Banana"]);
}

#[test]
fn test_filter_is_case_insensitive() {
    let img = scene(200, 100, &[(10, 10, 50, 50, TEST_RED), (110, 10, 50, 50, TEST_YELLOW)]);
    let detections = FruitDetector::new().find_fruits(&img, &FruitFilter::from("APPLE"));

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].category, "apple");
}

#[test]
fn test_filter_parsing() {
    assert_eq!(FruitFilter::from("all"), FruitFilter::All);
    assert_eq!(FruitFilter::from("All Fruits"), FruitFilter::All);
    assert_eq!(FruitFilter::from(" Banana "), FruitFilter::Category("banana".to_string()));
    assert!(FruitFilter::from("Orange").matches("orange"));
    assert!(!FruitFilter::from("Orange").matches("apple"));
}

#[test]
fn test_unknown_category_leaves_image_untouched() {
    let img = scene(200, 100, &[(10, 10, 50, 50, TEST_RED), (110, 10, 50, 50, TEST_YELLOW)]);
    let result = FruitDetector::new().detect_fruits(&img, &FruitFilter::from("kiwi"));

    assert!(result.detections.is_empty());
    assert_eq!(result.annotated, img.to_rgb8());
}

#[test]
fn test_empty_image_has_no_detections() {
    let img = scene(120, 90, &[]);
    let result = FruitDetector::new().detect_fruits(&img, &FruitFilter::All);

    assert!(result.detections.is_empty());
    assert_eq!(result.annotated, img.to_rgb8());
}

#[test]
fn test_detection_is_repeatable() {
    let img = scene(
        300,
        120,
        &[(10, 10, 60, 60, TEST_RED), (100, 30, 45, 70, TEST_ORANGE), (200, 5, 80, 35, TEST_YELLOW)],
    );
    let detector = FruitDetector::new();

    let first = detector.find_fruits(&img, &FruitFilter::All);
    let second = detector.find_fruits(&img, &FruitFilter::All);
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_boxes_drawn_in_category_color() {
    let img = scene(200, 100, &[(10, 10, 50, 40, TEST_RED), (110, 10, 50, 40, TEST_YELLOW)]);
    let result = FruitDetector::new().detect_fruits(&img, &FruitFilter::All);
    let apple_color = display_color("apple");

    // Two-pixel outline from (x, y) to (x + w, y + h)
    assert_eq!(*result.annotated.get_pixel(10, 10), apple_color);
    assert_eq!(*result.annotated.get_pixel(11, 11), apple_color);
    assert_eq!(*result.annotated.get_pixel(60, 50), apple_color);
    assert_eq!(*result.annotated.get_pixel(12, 30), TEST_RED);

    assert_eq!(*result.annotated.get_pixel(110, 10), DEFAULT_BOX_COLOR);

    // The caller's image is untouched
    assert_eq!(*img.as_rgb8().expect("rgb image").get_pixel(10, 10), TEST_RED);
}

#[test]
fn test_later_boxes_overdraw_earlier_ones() {
    // The apple box's right edge (x = 60) is the orange box's left edge
    let img = scene(200, 100, &[(10, 10, 50, 40, TEST_RED), (60, 10, 50, 40, TEST_ORANGE)]);
    let result = FruitDetector::new().detect_fruits(&img, &FruitFilter::All);

    assert_eq!(result.detections.len(), 2);
    assert_eq!(*result.annotated.get_pixel(60, 30), display_color("orange"));
}

#[test]
fn test_labels_drawn_above_detections() {
    let img = scene(200, 150, &[(20, 60, 60, 60, TEST_RED), (120, 60, 60, 60, TEST_ORANGE)]);
    let result = FruitDetector::new().detect_fruits(&img, &FruitFilter::All);

    assert_eq!(result.detections.len(), 2);
    let labelled = result
        .annotated
        .enumerate_pixels()
        .filter(|(_, y, p)| *y < 60 && **p != TEST_BLACK)
        .count();
    assert!(labelled > 0);
    // Fruit interiors keep their own color
    assert_eq!(*result.annotated.get_pixel(50, 90), TEST_RED);
    assert_eq!(*result.annotated.get_pixel(150, 90), TEST_ORANGE);
}

#[test]
fn test_display_colors() {
    assert_eq!(display_color("apple"), Rgb([255, 0, 0]));
    assert_eq!(display_color("orange"), Rgb([255, 165, 0]));
    assert_eq!(display_color("banana"), DEFAULT_BOX_COLOR);
}

#[test]
fn test_min_area_override() {
    let img = scene(100, 100, &[(10, 10, 30, 30, TEST_RED)]);
    let detector = FruitDetector::new().with_min_fruit_area(500.0);

    assert_eq!(detector.find_fruits(&img, &FruitFilter::All).len(), 1);
}

#[test]
fn test_capitalize() {
    assert_eq!(capitalize("apple"), "Apple");
    assert_eq!(capitalize("ORANGE"), "Orange");
    assert_eq!(capitalize(""), "");
}

#[test]
fn test_detections_serialize_to_json() -> anyhow::Result<()> {
    let img = scene(200, 100, &[(10, 10, 50, 40, TEST_RED)]);
    let result = FruitDetector::new().detect_fruits(&img, &FruitFilter::All);

    let json: serde_json::Value = serde_json::to_value(&result)?;
    assert_eq!(json["detections"][0]["label"], "Apple");
    assert_eq!(json["detections"][0]["bbox"]["width"], 50);
    assert!(json.get("annotated").is_none());
    Ok(())
}
