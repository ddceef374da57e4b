// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end annotation pipeline tests (decode → annotate → encode),
//! exercised without the HTTP layer.

use detect_server::vision::annotate::{font_size, label_text, stroke_width};
use detect_server::vision::image_utils::{decode_image_bytes, encode_jpeg};
use detect_server::{Annotator, Detection, LabelFont};
use image::{ImageFormat, Rgb, RgbImage};

const RED: Rgb<u8> = Rgb([255, 0, 0]);

fn annotator() -> Annotator {
    Annotator::new(LabelFont::Bitmap)
}

fn dog_at(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Detection {
    Detection {
        x_min: x1,
        y_min: y1,
        x_max: x2,
        y_max: y2,
        class_id: 16,
        confidence,
    }
}

#[test]
fn test_zero_detections_roundtrip() {
    let mut img = RgbImage::from_pixel(320, 240, Rgb([40, 80, 120]));
    let original = img.clone();

    annotator().annotate(&mut img, &[], |_| unreachable!());

    // Raster untouched
    assert_eq!(img.as_raw(), original.as_raw());

    // Re-encoding still yields a valid image of the same dimensions
    let jpeg = encode_jpeg(&img).unwrap();
    let (decoded, info) = decode_image_bytes(&jpeg).unwrap();
    assert_eq!(info.width, 320);
    assert_eq!(info.height, 240);
    assert_eq!(decoded.width(), 320);
}

#[test]
fn test_each_detection_gets_a_rectangle() {
    let mut img = RgbImage::new(640, 480);
    let boxes = [
        dog_at(50.0, 100.0, 150.0, 200.0, 0.9),
        dog_at(300.0, 100.0, 400.0, 200.0, 0.8),
        dog_at(500.0, 300.0, 600.0, 450.0, 0.7),
    ];

    annotator().annotate(&mut img, &boxes, |_| "dog".to_string());

    for b in &boxes {
        let x = b.x_min as u32;
        let y = (b.y_min + b.height() / 2.0) as u32;
        assert_eq!(*img.get_pixel(x, y), RED, "left edge of box {:?}", b);
    }
}

#[test]
fn test_label_rounding() {
    assert_eq!(label_text("person", 0.873), "person 0.87");
    assert_eq!(label_text("person", 0.8750001), "person 0.88");
}

#[test]
fn test_full_pipeline_scenario() {
    // Upload a 640x480 JPEG with one detection at (100,100,200,200),
    // class "dog", confidence 0.95
    let source = RgbImage::new(640, 480);
    let mut buf = std::io::Cursor::new(Vec::new());
    source.write_to(&mut buf, ImageFormat::Jpeg).unwrap();

    let (decoded, info) = decode_image_bytes(buf.get_ref()).unwrap();
    assert_eq!((info.width, info.height), (640, 480));

    let mut rgb = decoded.to_rgb8();
    let detection = dog_at(100.0, 100.0, 200.0, 200.0, 0.95);
    annotator().annotate(&mut rgb, &[detection], |_| "dog".to_string());

    // Red rectangle at (100,100)-(200,200)
    assert_eq!(*rgb.get_pixel(100, 150), RED);
    assert_eq!(*rgb.get_pixel(199, 150), RED);
    assert_eq!(*rgb.get_pixel(150, 199), RED);

    // Label anchored above the box top-left: some non-background pixels
    // in the strip above (100,100)
    let (_, text_h) = LabelFont::Bitmap.text_size(font_size(480), "dog 0.95");
    let strip_y = 100 - text_h / 2;
    let marked = (100..200)
        .filter(|&x| *rgb.get_pixel(x, strip_y) != Rgb([0, 0, 0]))
        .count();
    assert!(marked > 0, "label strip above the box should be drawn");

    // Response path: encodes to a valid JPEG with unchanged dimensions
    let jpeg = encode_jpeg(&rgb).unwrap();
    let (out, out_info) = decode_image_bytes(&jpeg).unwrap();
    assert_eq!((out_info.width, out_info.height), (640, 480));
    assert_eq!(out.width(), 640);
}

#[test]
fn test_sizing_rules_for_scenario_image() {
    // 640x480: stroke = max(640*0.006, 2) = 3, font = max(480*0.04, 12) = 19
    assert_eq!(stroke_width(640), 3);
    assert_eq!(font_size(480), 19.0);
}

#[test]
fn test_label_clamped_when_box_touches_top() {
    let mut img = RgbImage::new(200, 200);

    annotator().annotate(&mut img, &[dog_at(20.0, 0.0, 120.0, 80.0, 0.5)], |_| {
        "dog".to_string()
    });

    // Label background starts at row 0 instead of above the image
    assert_ne!(*img.get_pixel(20, 0), Rgb([0, 0, 0]));
}

#[test]
fn test_detections_drawn_in_input_order() {
    // Overlapping boxes: the later one draws over the earlier one where
    // they intersect, by construction of the loop
    let mut img = RgbImage::new(300, 300);
    let first = dog_at(50.0, 50.0, 150.0, 150.0, 0.9);
    let second = dog_at(50.0, 50.0, 150.0, 150.0, 0.1);

    let mut order = Vec::new();
    annotator().annotate(&mut img, &[first, second], |id| {
        order.push(id);
        "dog".to_string()
    });

    // Both were drawn, nothing filtered on confidence
    assert_eq!(order.len(), 2);
}
