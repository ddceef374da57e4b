// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use detect_server::{
    api::http_server::{start_server, AppState},
    config::ServerConfig,
    vision::{Annotator, LabelFont, YoloDetector},
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    tracing::info!("Starting detect-server with {:?}", config);

    // Load the detection model once, before accepting requests. A missing
    // or broken model is fatal at startup rather than per-request.
    let detector = YoloDetector::new(&config.model_path)
        .await?
        .with_conf_threshold(config.conf_threshold)
        .with_iou_threshold(config.iou_threshold);

    // Resolve the label font once; falls back to the built-in bitmap font
    let font = LabelFont::resolve(config.font_path.as_deref());
    let annotator = Annotator::new(font);

    let state = AppState {
        detector: Arc::new(detector),
        annotator: Arc::new(annotator),
    };

    start_server(state, config.api_port).await
}
