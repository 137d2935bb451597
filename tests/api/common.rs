// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for API handler tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use cardscan_node::api::http_server::AppState;
use cardscan_node::config::ServiceConfig;
use cardscan_node::identify::{
    CardIdentifier, IdentificationResult, IdentifyError, IdentifyService,
};
use cardscan_node::ocr::NoopRecognizer;

/// Scripted remote identifier that counts calls.
pub struct ScriptedIdentifier {
    pub calls: AtomicUsize,
    pub name: String,
}

impl ScriptedIdentifier {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            name: name.to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CardIdentifier for ScriptedIdentifier {
    async fn identify(&self, _: &[u8]) -> Result<IdentificationResult, IdentifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(IdentificationResult {
            name: Some(self.name.clone()),
            number: Some("27/159".to_string()),
            printed_total: Some(159),
            hp: Some(60),
            confidence: 0.9,
            model: "scripted".to_string(),
        })
    }
}

fn test_config(shared_token: Option<&str>) -> ServiceConfig {
    ServiceConfig {
        api_port: 0,
        shared_token: shared_token.map(|t| t.to_string()),
        vision_api_url: None,
        vision_api_key: None,
        vision_model: "test-model".to_string(),
        vision_downscale_edge: 1024,
        identify_cache_capacity: 8,
        ocr_model_path: None,
        ocr_dict_path: None,
    }
}

/// AppState with a noop recognizer and a scripted identifier.
pub fn state_with_identifier<I: CardIdentifier + 'static>(
    identifier: Option<Arc<I>>,
    shared_token: Option<&str>,
) -> AppState {
    let config = test_config(shared_token);
    AppState {
        recognizer: Arc::new(NoopRecognizer),
        identify: Arc::new(IdentifyService::new(
            identifier.map(|i| i as Arc<dyn CardIdentifier>),
            config.shared_token.clone(),
            config.identify_cache_capacity,
            Some(config.vision_downscale_edge),
        )),
        config: Arc::new(config),
    }
}

pub fn plain_state() -> AppState {
    state_with_identifier::<ScriptedIdentifier>(None, None)
}

/// A tiny valid PNG as raw bytes.
pub fn png_bytes() -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        16,
        16,
        image::Rgb([90, 120, 60]),
    ));
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn png_b64() -> String {
    base64::engine::general_purpose::STANDARD.encode(png_bytes())
}
