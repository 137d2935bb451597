// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Border detection endpoint handler

use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, info};

use super::request::image_from_body;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::border::{detect_border, DetectionResult};

/// POST /detect-card-border - Locate the card face in a photo
///
/// Accepts raw image bytes or `{"image_b64": ...}` and returns the card
/// border as a normalized quadrilateral.
///
/// # Response
/// - `ok`: whether a border was found
/// - `confidence`: detection confidence (0.0-1.0)
/// - `polygon_norm`: four `[x, y]` corners in normalized coordinates,
///   ordered top-left, top-right, bottom-right, bottom-left
/// - `notes`: diagnostic trail
pub async fn detect_border_handler(
    State(_state): State<AppState>,
    body: Bytes,
) -> Result<Json<DetectionResult>, ApiError> {
    debug!("border detection request: {} bytes", body.len());

    // 1. Decode either framing of the body
    let image = image_from_body(&body)?;

    // 2. Run detection; soft failures come back as ok:false, not errors
    let result = detect_border(&image);
    info!(
        ok = result.ok,
        confidence = result.confidence,
        "border detection complete"
    );

    Ok(Json(result))
}
