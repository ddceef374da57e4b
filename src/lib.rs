// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod vision;

// Re-export main types
pub use api::errors::{ApiError, ErrorResponse};
pub use api::http_server::{router, start_server, AppState};
pub use config::ServerConfig;
pub use vision::annotate::Annotator;
pub use vision::detector::{Detection, ObjectDetector, YoloDetector};
pub use vision::font::LabelFont;
