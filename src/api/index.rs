// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload page served at GET /

use axum::response::Html;

/// GET / - Static upload UI (drag-and-drop + preview).
pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
