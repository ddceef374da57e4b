// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection adapter
//!
//! The server only depends on the [`ObjectDetector`] trait; the concrete
//! implementation is a YOLO model running under ONNX Runtime.

pub mod classes;
pub mod yolo;

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

pub use classes::COCO_CLASSES;
pub use yolo::YoloDetector;

/// One predicted object instance, in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Detection {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    pub class_id: usize,
    /// Detection confidence score (0.0-1.0)
    pub confidence: f32,
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Check if this detection has reasonable dimensions
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0 && self.confidence > 0.0
    }

    /// IoU (intersection over union) with another box.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x_min.max(other.x_min);
        let iy1 = self.y_min.max(other.y_min);
        let ix2 = self.x_max.min(other.x_max);
        let iy2 = self.y_max.min(other.y_max);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        let union = self.width() * self.height() + other.width() * other.height() - inter;
        inter / union
    }
}

/// Boundary the request handler depends on: a loaded detection model that
/// can be invoked concurrently and a class-id → name mapping.
pub trait ObjectDetector: Send + Sync {
    /// Run inference on a decoded RGB image and return detections in
    /// source-image pixel coordinates. The adapter owns confidence
    /// filtering; callers draw everything returned.
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>>;

    /// Human-readable name for a class id.
    fn class_name(&self, class_id: usize) -> &str;
}
