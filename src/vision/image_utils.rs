// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and utility functions for vision processing

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Maximum image size (10MB)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Decode raw image bytes (for multipart uploads)
///
/// # Arguments
/// * `bytes` - Raw image bytes
///
/// # Returns
/// * `Ok((DynamicImage, ImageInfo))` - The decoded image and metadata
/// * `Err(ImageError)` - If decoding fails
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    // Validate size
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    // Load image
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Encode an RGB image as JPEG bytes for the HTTP response.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new(&mut buf);
    encoder
        .encode_image(image)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;
    Ok(buf)
}

/// Detect image format from magic bytes
///
/// # Arguments
/// * `bytes` - Raw image data
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ImageError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tiny valid PNG, as raw bytes (1x1 red pixel).
    fn tiny_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_image_bytes_valid() {
        let bytes = tiny_png();
        let result = decode_image_bytes(&bytes);
        assert!(result.is_ok(), "Failed to decode PNG: {:?}", result.err());

        let (img, info) = result.unwrap();
        assert_eq!(info.width, 1);
        assert_eq!(info.height, 1);
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(img.width(), 1);
    }

    #[test]
    fn test_decode_image_bytes_empty() {
        let result = decode_image_bytes(&[]);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ImageError::EmptyData));
    }

    #[test]
    fn test_decode_image_bytes_not_an_image() {
        let result = decode_image_bytes(b"this is plain text, not an image");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ImageError::UnsupportedFormat));
    }

    #[test]
    fn test_decode_image_bytes_corrupted() {
        // PNG header but corrupted data
        let corrupted = [0x89, 0x50, 0x4E, 0x47, 0x00, 0x00, 0x00, 0x00];
        let result = decode_image_bytes(&corrupted);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ImageError::DecodeFailed(_)));
    }

    #[test]
    fn test_decode_image_bytes_too_large() {
        let large_bytes = vec![0u8; MAX_IMAGE_SIZE + 1];
        let result = decode_image_bytes(&large_bytes);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ImageError::TooLarge(_, _)));
    }

    #[test]
    fn test_detect_format_png() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&png_header).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_format_jpeg() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_format_gif87a() {
        let gif_header = [0x47, 0x49, 0x46, 0x38, 0x37, 0x61];
        assert_eq!(detect_format(&gif_header).unwrap(), ImageFormat::Gif);
    }

    #[test]
    fn test_detect_format_gif89a() {
        let gif_header = [0x47, 0x49, 0x46, 0x38, 0x39, 0x61];
        assert_eq!(detect_format(&gif_header).unwrap(), ImageFormat::Gif);
    }

    #[test]
    fn test_detect_format_webp() {
        let webp_header = [
            0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50,
        ];
        assert_eq!(detect_format(&webp_header).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_detect_format_unknown() {
        let unknown = [0x00, 0x00, 0x00, 0x00];
        assert!(detect_format(&unknown).is_err());
    }

    #[test]
    fn test_encode_jpeg_roundtrip() {
        let img = RgbImage::from_pixel(8, 6, image::Rgb([0, 128, 255]));
        let bytes = encode_jpeg(&img).unwrap();

        assert_eq!(detect_format(&bytes).unwrap(), ImageFormat::Jpeg);

        let (decoded, info) = decode_image_bytes(&bytes).unwrap();
        assert_eq!(info.width, 8);
        assert_eq!(info.height, 6);
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 6);
    }
}
