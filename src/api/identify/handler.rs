// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Remote identification endpoint handler

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{debug, info};

use super::request::{IdentifyRequest, TOKEN_HEADER};
use super::response::{status_for, IdentifyResponse};
use crate::api::http_server::AppState;
use crate::identify::IdentifyParams;

/// POST /ai-identify-warp - Identify a card via the remote vision model
///
/// Requires the `x-gv-token` header when a shared secret is configured.
/// Results are cached by the SHA-256 of the decoded image bytes;
/// `force_refresh` bypasses the lookup but still stores the fresh result.
///
/// # Response
/// - `ok`, `cache_hit`, `run_id`, `trace_id`
/// - `sha256`: content address of the decoded image
/// - `cached_at`: when the returned result entered the cache
/// - `result`: `{name, number, printed_total, hp, confidence, model}`
/// - `error`: stable tag on failure (`unauthorized`, `image_too_large`,
///   `decode_failed`, `upstream_*`)
pub async fn identify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IdentifyRequest>,
) -> (StatusCode, Json<IdentifyResponse>) {
    debug!(
        force_refresh = request.force_refresh,
        payload_chars = request.image_b64.len(),
        "identify request received"
    );

    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let outcome = state
        .identify
        .identify(IdentifyParams {
            image_b64: request.image_b64,
            token,
            force_refresh: request.force_refresh,
            trace_id: request.trace_id,
        })
        .await;

    info!(
        run_id = %outcome.run_id,
        ok = outcome.ok,
        cache_hit = outcome.cache_hit,
        error = outcome.error.as_deref().unwrap_or("-"),
        "identify request complete"
    );

    (status_for(&outcome), Json(outcome))
}
