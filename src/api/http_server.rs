// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server: routing, shared state, and middleware layers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::detect::detect_border_handler;
use crate::api::identify::identify_handler;
use crate::api::pricing::pricing_import_handler;
use crate::api::signals::card_signals_handler;
use crate::config::ServiceConfig;
use crate::identify::IdentifyService;
use crate::ocr::TextRecognizer;

#[derive(Clone)]
pub struct AppState {
    pub recognizer: Arc<dyn TextRecognizer>,
    pub identify: Arc<IdentifyService>,
    pub config: Arc<ServiceConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/detect-card-border", post(detect_border_handler))
        .route("/ocr-card-signals", post(card_signals_handler))
        .route("/ai-identify-warp", post(identify_handler))
        .route("/pricing/import", post(pricing_import_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let port = state.config.api_port;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("card scan API listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz_handler() -> impl IntoResponse {
    Json(json!({"ok": true}))
}
