// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detection model
//!
//! Wraps a pretrained YOLOv8/v11 ONNX model. The session is loaded once at
//! startup and shared across requests; inference serializes on the session
//! lock.

use anyhow::{Context, Result};
use image::{imageops, RgbImage};
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::classes::COCO_CLASSES;
use super::{Detection, ObjectDetector};

/// Expected input size for YOLO models (square)
pub const YOLO_INPUT_SIZE: u32 = 640;

/// YOLO detection model
///
/// Uses a YOLOv8/v11 model exported to ONNX. Runs on CPU.
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Confidence threshold for detections
    conf_threshold: f32,
    /// IoU threshold for non-maximum suppression
    iou_threshold: f32,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("conf_threshold", &self.conf_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the YOLO model from a file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("YOLO model not found: {}", model_path.display());
        }

        info!("Loading YOLO model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load YOLO model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("YOLO model loaded - input: {}", input_name);

        info!("✅ YOLO model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
        })
    }

    /// Set the confidence threshold for detections
    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = clamp_threshold(threshold);
        self
    }

    /// Set the IoU threshold for non-maximum suppression
    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = clamp_threshold(threshold);
        self
    }

    /// Get current confidence threshold
    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }

    /// Resize to the model input size and convert to a [1, 3, H, W] tensor
    /// normalized to [0, 1].
    fn preprocess(image: &RgbImage) -> Array4<f32> {
        let size = YOLO_INPUT_SIZE;
        let resized = imageops::resize(image, size, size, imageops::FilterType::Triangle);

        let mut tensor = Array4::zeros((1, 3, size as usize, size as usize));
        for y in 0..size as usize {
            for x in 0..size as usize {
                let pixel = resized.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
                }
            }
        }

        tensor
    }

}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let input = Self::preprocess(image);

        let mut session = self.session.lock().unwrap();

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("YOLO inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let detections = parse_output(
            output_tensor.view(),
            image.width(),
            image.height(),
            self.conf_threshold,
            self.iou_threshold,
        )?;

        debug!("Detected {} objects", detections.len());

        Ok(detections)
    }

    fn class_name(&self, class_id: usize) -> &str {
        COCO_CLASSES.get(class_id).copied().unwrap_or("unknown")
    }
}

/// Thresholds are probabilities; keep them in [0, 1].
fn clamp_threshold(threshold: f32) -> f32 {
    threshold.clamp(0.0, 1.0)
}

/// Parse YOLO output into detections in source-image pixel coordinates.
///
/// YOLOv8/v11 output shape is [1, 4 + num_classes, num_proposals] with
/// proposals laid out column-major: rows 0-3 are (cx, cy, w, h) in
/// input-tensor space, the remaining rows are per-class scores.
fn parse_output(
    output: ArrayViewD<f32>,
    source_width: u32,
    source_height: u32,
    conf_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<Detection>> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
        anyhow::bail!(
            "Unexpected YOLO output shape: {:?}, expected [1, 4+classes, proposals]",
            shape
        );
    }

    let num_classes = shape[1] - 4;
    let num_proposals = shape[2];

    let scale_x = source_width as f32 / YOLO_INPUT_SIZE as f32;
    let scale_y = source_height as f32 / YOLO_INPUT_SIZE as f32;

    let mut candidates = Vec::new();

    for i in 0..num_proposals {
        // Best class and its score
        let mut class_id = 0usize;
        let mut score = 0f32;
        for c in 0..num_classes {
            let s = output[IxDyn(&[0, 4 + c, i])];
            if s > score {
                score = s;
                class_id = c;
            }
        }

        if score < conf_threshold {
            continue;
        }

        let cx = output[IxDyn(&[0, 0, i])];
        let cy = output[IxDyn(&[0, 1, i])];
        let w = output[IxDyn(&[0, 2, i])];
        let h = output[IxDyn(&[0, 3, i])];

        // (cx,cy,w,h) in 640-space → (x1,y1,x2,y2) in source pixels
        let x_min = ((cx - w / 2.0) * scale_x).max(0.0);
        let y_min = ((cy - h / 2.0) * scale_y).max(0.0);
        let x_max = ((cx + w / 2.0) * scale_x).min(source_width as f32);
        let y_max = ((cy + h / 2.0) * scale_y).min(source_height as f32);

        candidates.push(Detection {
            x_min,
            y_min,
            x_max,
            y_max,
            class_id,
            confidence: score,
        });
    }

    Ok(nms(candidates, iou_threshold))
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes
/// of the same class.
fn nms(mut boxes: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    boxes.sort_unstable_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for i in 0..boxes.len() {
        if suppressed[i] {
            continue;
        }
        kept.push(boxes[i]);
        for j in (i + 1)..boxes.len() {
            if boxes[i].class_id == boxes[j].class_id
                && boxes[i].iou(&boxes[j]) > iou_threshold
            {
                suppressed[j] = true;
            }
        }
    }

    kept
}
