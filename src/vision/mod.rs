// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Image decoding/encoding for the upload → response path
//! - Object detection via a pretrained YOLO ONNX model
//! - Annotation (bounding boxes + labels) drawn onto the image
//!
//! Everything runs on CPU; the model session is loaded once at startup.

pub mod annotate;
pub mod detector;
pub mod font;
pub mod image_utils;

pub use annotate::Annotator;
pub use detector::{Detection, ObjectDetector, YoloDetector};
pub use font::LabelFont;
pub use image_utils::{decode_image_bytes, detect_format, encode_jpeg, ImageError, ImageInfo};
