// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /detect for annotating an uploaded image with detected
//! objects.

pub mod handler;

pub use handler::detect_handler;
