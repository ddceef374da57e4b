// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven server configuration

use std::env;
use std::path::PathBuf;

/// Default confidence threshold applied by the detector adapter.
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;

/// Default IoU threshold for non-maximum suppression.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP API listens on (`API_PORT`)
    pub api_port: u16,
    /// Path to the YOLO ONNX model file (`MODEL_PATH`)
    pub model_path: PathBuf,
    /// Optional TrueType font override for labels (`FONT_PATH`)
    pub font_path: Option<PathBuf>,
    /// Detector confidence threshold (`CONF_THRESHOLD`)
    pub conf_threshold: f32,
    /// NMS IoU threshold (`IOU_THRESHOLD`)
    pub iou_threshold: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_port: 8000,
            model_path: PathBuf::from("./models/yolo11n.onnx"),
            font_path: None,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.api_port);

        let model_path = env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let font_path = env::var("FONT_PATH").ok().map(PathBuf::from);

        let conf_threshold = env::var("CONF_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.conf_threshold);

        let iou_threshold = env::var("IOU_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.iou_threshold);

        Self {
            api_port,
            model_path,
            font_path,
            conf_threshold,
            iou_threshold,
        }
    }
}
