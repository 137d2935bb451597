// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /ai-identify-warp
//!
//! The handler is called directly with a scripted remote identifier, so
//! these cover the gate order, the cache behavior, and the status
//! mapping without any network.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};
use cardscan_node::api::identify::{identify_handler, IdentifyRequest};

use super::common::{plain_state, png_b64, state_with_identifier, ScriptedIdentifier};

fn request(image_b64: String, force_refresh: bool) -> IdentifyRequest {
    IdentifyRequest {
        image_b64,
        force_refresh,
        trace_id: None,
    }
}

fn token_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-gv-token", HeaderValue::from_str(token).unwrap());
    headers
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let identifier = ScriptedIdentifier::new("Pikachu");
    let state = state_with_identifier(Some(identifier.clone()), Some("secret"));

    let (status, Json(outcome)) =
        identify_handler(State(state), HeaderMap::new(), Json(request(png_b64(), false))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!outcome.ok);
    assert_eq!(outcome.error.as_deref(), Some("unauthorized"));
    assert_eq!(identifier.call_count(), 0);
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let state = state_with_identifier(Some(ScriptedIdentifier::new("x")), Some("secret"));
    let (status, Json(outcome)) = identify_handler(
        State(state),
        token_headers("wrong"),
        Json(request(png_b64(), false)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(outcome.error.as_deref(), Some("unauthorized"));
}

#[tokio::test]
async fn test_identify_and_cache_hit() {
    let identifier = ScriptedIdentifier::new("Pikachu");
    let state = state_with_identifier(Some(identifier.clone()), Some("secret"));
    let b64 = png_b64();

    let (status, Json(first)) = identify_handler(
        State(state.clone()),
        token_headers("secret"),
        Json(request(b64.clone(), false)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(first.ok);
    assert!(!first.cache_hit);
    assert!(first.sha256.is_some());
    assert_eq!(first.result.as_ref().unwrap().name.as_deref(), Some("Pikachu"));

    let (status, Json(second)) = identify_handler(
        State(state),
        token_headers("secret"),
        Json(request(b64, false)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(second.cache_hit);
    assert_eq!(second.sha256, first.sha256);
    assert_eq!(identifier.call_count(), 1);
}

#[tokio::test]
async fn test_force_refresh_calls_upstream_again() {
    let identifier = ScriptedIdentifier::new("Pikachu");
    let state = state_with_identifier(Some(identifier.clone()), None);
    let b64 = png_b64();

    identify_handler(
        State(state.clone()),
        HeaderMap::new(),
        Json(request(b64.clone(), false)),
    )
    .await;
    let (_, Json(refreshed)) = identify_handler(
        State(state),
        HeaderMap::new(),
        Json(request(b64, true)),
    )
    .await;

    assert!(refreshed.ok);
    assert!(!refreshed.cache_hit);
    assert_eq!(identifier.call_count(), 2);
}

#[tokio::test]
async fn test_oversized_payload_is_413() {
    let state = state_with_identifier(Some(ScriptedIdentifier::new("x")), None);
    // One character over the 8,000,000-char ceiling.
    let huge = "A".repeat(8_000_001);
    let (status, Json(outcome)) =
        identify_handler(State(state), HeaderMap::new(), Json(request(huge, false))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(outcome.error.as_deref(), Some("image_too_large"));
    assert!(outcome.sha256.is_none());
}

#[tokio::test]
async fn test_unconfigured_upstream_is_503() {
    let state = plain_state();
    let (status, Json(outcome)) =
        identify_handler(State(state), HeaderMap::new(), Json(request(png_b64(), false))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(outcome.error.as_deref(), Some("upstream_unconfigured"));
}

#[tokio::test]
async fn test_trace_id_echoed() {
    let state = plain_state();
    let (_, Json(outcome)) = identify_handler(
        State(state),
        HeaderMap::new(),
        Json(IdentifyRequest {
            image_b64: png_b64(),
            force_refresh: false,
            trace_id: Some("trace-42".to_string()),
        }),
    )
    .await;
    assert_eq!(outcome.trace_id, "trace-42");
}
