// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use super::detect::detect_handler;
use super::index::index_handler;
use crate::vision::{Annotator, ObjectDetector};

/// Shared request state: the detection model handle (loaded once at
/// startup) and the annotator. Both are read-only per request.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn ObjectDetector>,
    pub annotator: Arc<Annotator>,
}

/// Build the application router. Split out from [`start_server`] so tests
/// can drive it directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Upload page
        .route("/", get(index_handler))
        // Detection endpoint
        .route("/detect", post(detect_handler))
        // Health check
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    // The detector is loaded before the server starts, so reaching this
    // handler implies the model is ready.
    axum::response::Json(json!({
        "status": "healthy",
        "model_ready": true,
    }))
}
