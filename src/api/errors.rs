// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON body returned for every API error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Malformed request (missing file field, bad multipart body)
    InvalidRequest(String),
    /// Uploaded bytes are not a decodable image
    DecodeError(String),
    /// The detection model failed during inference
    DetectorError(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::DecodeError(_) => StatusCode::BAD_REQUEST,
            ApiError::DetectorError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone()),
            ApiError::DecodeError(msg) => ("decode_error", msg.clone()),
            ApiError::DetectorError(msg) => ("detector_error", msg.clone()),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone()),
            ApiError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.to_response();
        write!(f, "{}: {}", response.error_type, response.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, axum::response::Json(self.to_response())).into_response()
    }
}
