// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Card signal extraction endpoint handler

use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, info};

use super::request::parse_body;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::signals::{extract_signals, SignalBundle};

/// POST /ocr-card-signals - Read printed signals from a card photo
///
/// Accepts raw image bytes or `{"image_b64": ..., "polygon_norm": ...}`.
/// When a polygon is supplied the card face is perspective-normalized
/// first.
///
/// # Response
/// - `name`: `{text, confidence}` or null
/// - `number_raw`: `{text, confidence}` or null (e.g. "27/159")
/// - `printed_total`: `{value, confidence}` or null
/// - `printed_set_abbrev_raw`: `{text, confidence}` or null
/// - `debug`: orientation and diagnostic notes
pub async fn card_signals_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SignalBundle>, ApiError> {
    debug!("card signals request: {} bytes", body.len());

    // 1. Decode image and optional border polygon
    let (image, polygon) = parse_body(&body)?;

    // 2. Run the signal pipeline; unreadable cards come back as nulls
    let bundle = extract_signals(&image, polygon, state.recognizer.as_ref());
    info!(
        recognizer = state.recognizer.name(),
        has_name = bundle.name.is_some(),
        has_number = bundle.number_raw.is_some(),
        orientation = %bundle.debug.orientation,
        "card signal extraction complete"
    );

    Ok(Json(bundle))
}
