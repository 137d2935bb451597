// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /ocr-card-signals

use axum::{body::Bytes, extract::State};
use cardscan_node::api::signals::card_signals_handler;

use super::common::{plain_state, png_b64, png_bytes};

#[tokio::test]
async fn test_noop_recognizer_yields_null_signals() {
    let response = card_signals_handler(State(plain_state()), Bytes::from(png_bytes()))
        .await
        .expect("raw bytes should decode");
    let bundle = response.0;
    assert!(bundle.name.is_none());
    assert!(bundle.number_raw.is_none());
    assert!(bundle.printed_total.is_none());
    assert_eq!(bundle.debug.orientation, "0");
}

#[tokio::test]
async fn test_polygon_norm_accepted() {
    let body = serde_json::json!({
        "image_b64": png_b64(),
        "polygon_norm": [[0.05, 0.05], [0.95, 0.05], [0.95, 0.95], [0.05, 0.95]]
    })
    .to_string();
    let response = card_signals_handler(State(plain_state()), Bytes::from(body))
        .await
        .expect("polygon body should parse");
    assert!(response.0.number_raw.is_none());
}

#[tokio::test]
async fn test_bad_polygon_rejected() {
    let body = serde_json::json!({
        "image_b64": png_b64(),
        "polygon_norm": [[0.0, 0.0]]
    })
    .to_string();
    let err = card_signals_handler(State(plain_state()), Bytes::from(body))
        .await
        .unwrap_err();
    assert_eq!(err.tag(), "invalid_request");
}

#[tokio::test]
async fn test_missing_image_rejected() {
    let err = card_signals_handler(State(plain_state()), Bytes::from_static(b"{}"))
        .await
        .unwrap_err();
    assert_eq!(err.tag(), "invalid_request");
}
