// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Card signal request parsing

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::api::detect::request::looks_like_json;
use crate::api::errors::ApiError;
use crate::vision::geometry::Quad;
use crate::vision::image_utils::{decode_base64_image, decode_image_bytes};
use crate::vision::warp::quad_from_pairs;

/// JSON form of the request body. `polygon_norm` is the border polygon
/// from a prior /detect-card-border call; when present the image is
/// perspective-normalized before scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSignalsRequest {
    pub image_b64: Option<String>,
    #[serde(default)]
    pub polygon_norm: Option<Vec<[f32; 2]>>,
}

/// Decode the request body (raw bytes or JSON envelope) into the image
/// and the optional border polygon.
pub fn parse_body(body: &[u8]) -> Result<(DynamicImage, Option<Quad>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::InvalidRequest("empty request body".to_string()));
    }

    if !looks_like_json(body) {
        return Ok((decode_image_bytes(body)?, None));
    }

    let request: CardSignalsRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid JSON body: {}", e)))?;
    let image_b64 = request
        .image_b64
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("image_b64 is required".to_string()))?;
    let image = decode_base64_image(&image_b64)?;

    let polygon = match request.polygon_norm {
        Some(pairs) => Some(quad_from_pairs(&pairs).ok_or_else(|| {
            ApiError::InvalidRequest("polygon_norm must contain exactly 4 [x, y] pairs".to_string())
        })?),
        None => None,
    };

    Ok((image, polygon))
}
