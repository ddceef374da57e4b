// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum_extra::extract::Multipart;
use tracing::{debug, info, warn};

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::{decode_image_bytes, encode_jpeg};

/// POST /detect - Annotate an uploaded image with detected objects
///
/// Accepts a multipart form with a single image file field and returns the
/// image re-encoded as JPEG with bounding boxes and labels drawn on.
///
/// # Errors
/// - 400 Bad Request: missing file field or undecodable image
/// - 500 Internal Server Error: inference or encoding failed
pub async fn detect_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Pull the uploaded file out of the multipart body
    let image_bytes = read_file_field(&mut multipart).await?;

    debug!("Received upload: {} bytes", image_bytes.len());

    // 2. Decode to an RGB raster
    let (image, image_info) = decode_image_bytes(&image_bytes).map_err(|e| {
        warn!("Failed to decode upload: {}", e);
        ApiError::DecodeError(format!("Invalid image: {}", e))
    })?;
    let mut rgb = image.to_rgb8();

    debug!(
        "Decoded image: {}x{}, format {:?}",
        image_info.width, image_info.height, image_info.format
    );

    // 3. Run detection (single attempt, no retry)
    let detections = state.detector.detect(&rgb).map_err(|e| {
        warn!("Detection failed: {}", e);
        ApiError::DetectorError(format!("Detection failed: {}", e))
    })?;

    info!(
        "Detection complete: {} objects in {}x{} image",
        detections.len(),
        image_info.width,
        image_info.height
    );

    // 4. Draw boxes and labels, in detector-returned order
    let detector = state.detector.clone();
    state.annotator.annotate(&mut rgb, &detections, |class_id| {
        detector.class_name(class_id).to_string()
    });

    // 5. Encode the annotated image for transport
    let jpeg = encode_jpeg(&rgb).map_err(|e| {
        warn!("Failed to encode response image: {}", e);
        ApiError::InternalError(format!("Failed to encode image: {}", e))
    })?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg))
}

/// Extract the first file field from the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        // The UI posts the image under "file"; accept any field carrying data
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        if !bytes.is_empty() {
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::InvalidRequest(
        "No file field in multipart body".to_string(),
    ))
}
