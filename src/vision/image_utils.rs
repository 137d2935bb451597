// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and utility functions for the scan pipeline

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Hard ceiling on base64 payload length (characters).
pub const MAX_BASE64_LEN: usize = 8_000_000;

/// Hard ceiling on decoded image bytes.
pub const MAX_IMAGE_BYTES: usize = 6_000_000;

/// Default longest-edge cap applied before the remote identification call.
pub const DEFAULT_DOWNSCALE_EDGE: u32 = 1024;

/// Custom error types for image handling
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("base64 payload is too large: {0} chars (max: {1})")]
    PayloadTooLarge(usize, usize),

    #[error("decoded image is too large: {0} bytes (max: {1})")]
    TooLarge(usize, usize),

    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("image data is empty")]
    EmptyData,
}

/// Decode a base64 payload into raw bytes, enforcing the payload ceiling.
pub fn decode_base64_payload(base64_str: &str) -> Result<Vec<u8>, ImageError> {
    if base64_str.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if base64_str.len() > MAX_BASE64_LEN {
        return Err(ImageError::PayloadTooLarge(base64_str.len(), MAX_BASE64_LEN));
    }

    let bytes = STANDARD.decode(base64_str)?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_BYTES));
    }
    Ok(bytes)
}

/// Decode raw image bytes into an RGB image.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_BYTES));
    }

    let img = image::load_from_memory(bytes).map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Decode a base64-encoded image
pub fn decode_base64_image(base64_str: &str) -> Result<DynamicImage, ImageError> {
    let bytes = decode_base64_payload(base64_str)?;
    decode_image_bytes(&bytes)
}

/// Downscale so the longest edge does not exceed `max_edge`, preserving
/// aspect ratio. Images already within the cap are returned untouched.
pub fn downscale_longest_edge(image: &DynamicImage, max_edge: u32) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    let longest = w.max(h);
    if longest <= max_edge || max_edge == 0 {
        return image.clone();
    }

    let scale = max_edge as f32 / longest as f32;
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    image.resize_exact(new_w, new_h, image::imageops::FilterType::CatmullRom)
}

/// Re-encode an image as JPEG for bandwidth-efficient upstream transfer.
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .to_rgb8()
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}
