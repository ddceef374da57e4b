// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod http_server;
pub mod index;

pub use detect::detect_handler;
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{router, start_server, AppState};
pub use index::index_handler;
