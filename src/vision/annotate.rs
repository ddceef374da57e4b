// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotator: draws detections onto an image
//!
//! For each detection, in detector-returned order: a box outline, then a
//! label `"{class_name} {confidence:.2}"` above the box with a filled
//! background and outlined text. Stroke width and font size scale with the
//! image dimensions so annotations stay legible across resolutions.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::detector::Detection;
use super::font::LabelFont;

/// Box outline and label background color.
const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Label text color.
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
/// Color of the text outline drawn behind the label text.
const TEXT_OUTLINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
/// Offset (px) of the 8 outline passes around the label text.
const TEXT_OUTLINE_OFFSET: i32 = 2;

/// Box stroke width for a given image width: max(width * 0.006, 2).
pub fn stroke_width(image_width: u32) -> u32 {
    ((image_width as f32 * 0.006) as u32).max(2)
}

/// Label font size for a given image height: max(height * 0.04, 12).
pub fn font_size(image_height: u32) -> f32 {
    ((image_height as f32 * 0.04) as u32).max(12) as f32
}

/// Label string for a detection: class name plus two-decimal confidence.
pub fn label_text(class_name: &str, confidence: f32) -> String {
    format!("{} {:.2}", class_name, confidence)
}

/// Draws detection boxes and labels onto RGB images.
pub struct Annotator {
    font: LabelFont,
}

impl Annotator {
    pub fn new(font: LabelFont) -> Self {
        Self { font }
    }

    /// Draw every detection onto `image`, in input order. No detections is
    /// a valid input and leaves the image untouched.
    pub fn annotate<F>(&self, image: &mut RgbImage, detections: &[Detection], mut class_name: F)
    where
        F: FnMut(usize) -> String,
    {
        if detections.is_empty() {
            return;
        }

        let stroke = stroke_width(image.width());
        let font_px = font_size(image.height());

        for det in detections {
            self.draw_box(image, det, stroke);

            let label = label_text(&class_name(det.class_id), det.confidence);
            self.draw_label(image, det, &label, font_px);
        }
    }

    /// Hollow rectangle at the detection box, stroked inward with
    /// `stroke` concentric 1-px rectangles.
    fn draw_box(&self, image: &mut RgbImage, det: &Detection, stroke: u32) {
        let x1 = det.x_min.round() as i32;
        let y1 = det.y_min.round() as i32;
        let w = (det.x_max - det.x_min).round().max(1.0) as u32;
        let h = (det.y_max - det.y_min).round().max(1.0) as u32;

        for i in 0..stroke {
            let inset = i as i32;
            if w <= 2 * i || h <= 2 * i {
                break;
            }
            let rect = Rect::at(x1 + inset, y1 + inset).of_size(w - 2 * i, h - 2 * i);
            draw_hollow_rect_mut(image, rect, BOX_COLOR);
        }
    }

    /// Label above the box's top-left corner. The top edge is clamped to
    /// row 0 so the label never leaves the image. A filled background goes
    /// down first, then the text outline (8 offset passes), then the text.
    fn draw_label(&self, image: &mut RgbImage, det: &Detection, label: &str, font_px: f32) {
        let (text_w, text_h) = self.font.text_size(font_px, label);
        let text_w = text_w.max(1);
        let text_h = text_h.max(1);

        let text_x = det.x_min.round() as i32;
        let text_y = (det.y_min.round() as i32 - text_h as i32).max(0);

        let background = Rect::at(text_x, text_y).of_size(text_w, text_h);
        draw_filled_rect_mut(image, background, BOX_COLOR);

        for dx in [-TEXT_OUTLINE_OFFSET, 0, TEXT_OUTLINE_OFFSET] {
            for dy in [-TEXT_OUTLINE_OFFSET, 0, TEXT_OUTLINE_OFFSET] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                self.font.draw_text(
                    image,
                    TEXT_OUTLINE_COLOR,
                    text_x + dx,
                    text_y + dy,
                    font_px,
                    label,
                );
            }
        }

        self.font
            .draw_text(image, TEXT_COLOR, text_x, text_y, font_px, label);
    }
}
