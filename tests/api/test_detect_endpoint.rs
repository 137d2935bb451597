// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /detect-card-border

use axum::{body::Bytes, extract::State};
use cardscan_node::api::detect::detect_border_handler;

use super::common::{plain_state, png_b64, png_bytes};

#[tokio::test]
async fn test_raw_bytes_body() {
    let response = detect_border_handler(State(plain_state()), Bytes::from(png_bytes()))
        .await
        .expect("raw bytes should decode");
    // A flat 16x16 image has no card edges, so the quad strategy never fires.
    assert!(!response.0.notes.iter().any(|n| n == "quad_contour"));
    assert!(!response.0.notes.is_empty());
}

#[tokio::test]
async fn test_json_body() {
    let body = serde_json::json!({"image_b64": png_b64()}).to_string();
    let response = detect_border_handler(State(plain_state()), Bytes::from(body))
        .await
        .expect("JSON body should decode");
    assert!(!response.0.notes.is_empty());
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let err = detect_border_handler(State(plain_state()), Bytes::new())
        .await
        .unwrap_err();
    assert_eq!(err.tag(), "invalid_request");
}

#[tokio::test]
async fn test_undecodable_bytes_rejected() {
    let err = detect_border_handler(State(plain_state()), Bytes::from_static(b"\xff\xfe\x00"))
        .await
        .unwrap_err();
    assert_eq!(err.tag(), "decode_failed");
}
