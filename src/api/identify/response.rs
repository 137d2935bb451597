// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Identify response types

use axum::http::StatusCode;

use crate::identify::IdentifyOutcome;

/// The wire response is the service outcome verbatim; only the HTTP
/// status varies with the error tag.
pub type IdentifyResponse = IdentifyOutcome;

/// Map an outcome's error tag to the HTTP status. Successful outcomes
/// (including cache hits) are 200.
pub fn status_for(outcome: &IdentifyOutcome) -> StatusCode {
    match outcome.error.as_deref() {
        None => StatusCode::OK,
        Some("unauthorized") => StatusCode::UNAUTHORIZED,
        Some("image_too_large") => StatusCode::PAYLOAD_TOO_LARGE,
        Some("decode_failed") => StatusCode::BAD_REQUEST,
        Some("upstream_unconfigured") => StatusCode::SERVICE_UNAVAILABLE,
        Some("upstream_timeout") => StatusCode::GATEWAY_TIMEOUT,
        Some(_) => StatusCode::BAD_GATEWAY,
    }
}
