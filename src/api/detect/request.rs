// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Border detection request parsing
//!
//! The endpoint accepts either raw image bytes or a JSON envelope, so
//! both camera uploads and worker relays can call it without re-framing.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::image_utils::{decode_base64_image, decode_image_bytes};

/// JSON form of the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectBorderRequest {
    pub image_b64: Option<String>,
}

/// Decode a request body that is either raw image bytes or a JSON
/// envelope carrying `image_b64`. The body is sniffed: JSON bodies start
/// with `{`.
pub fn image_from_body(body: &[u8]) -> Result<DynamicImage, ApiError> {
    if body.is_empty() {
        return Err(ApiError::InvalidRequest("empty request body".to_string()));
    }

    if looks_like_json(body) {
        let request: DetectBorderRequest = serde_json::from_slice(body)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid JSON body: {}", e)))?;
        let image_b64 = request
            .image_b64
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::InvalidRequest("image_b64 is required".to_string()))?;
        Ok(decode_base64_image(&image_b64)?)
    } else {
        Ok(decode_image_bytes(body)?)
    }
}

pub(crate) fn looks_like_json(body: &[u8]) -> bool {
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|&b| b == b'{')
        .unwrap_or(false)
}
