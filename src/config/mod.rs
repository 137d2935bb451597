// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from the environment.

use std::env;

use tracing::warn;

use crate::identify::cache::DEFAULT_CACHE_CAPACITY;
use crate::vision::image_utils::DEFAULT_DOWNSCALE_EDGE;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port.
    pub api_port: u16,
    /// Shared secret expected in the `x-gv-token` header. `None` disables
    /// the gate (local development).
    pub shared_token: Option<String>,
    /// OpenAI-compatible vision endpoint base URL.
    pub vision_api_url: Option<String>,
    pub vision_api_key: Option<String>,
    pub vision_model: String,
    /// Longest-edge cap applied before the image is sent upstream.
    pub vision_downscale_edge: u32,
    pub identify_cache_capacity: usize,
    /// CRNN recognition model and its character dictionary. Missing paths
    /// degrade signal extraction to null reads rather than failing boot.
    pub ocr_model_path: Option<String>,
    pub ocr_dict_path: Option<String>,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let shared_token = non_empty(env::var("GV_TOKEN").ok());
        if shared_token.is_none() {
            warn!("GV_TOKEN is not set; the identify endpoint is unauthenticated");
        }

        let vision_api_url = non_empty(env::var("VISION_API_URL").ok());
        if vision_api_url.is_none() {
            warn!("VISION_API_URL is not set; /ai-identify-warp will report upstream_unconfigured");
        }

        Self {
            api_port,
            shared_token,
            vision_api_url,
            vision_api_key: non_empty(env::var("VISION_API_KEY").ok()),
            vision_model: env::var("VISION_MODEL").unwrap_or_else(|_| "qwen2.5-vl-7b".to_string()),
            vision_downscale_edge: env::var("VISION_DOWNSCALE_EDGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DOWNSCALE_EDGE),
            identify_cache_capacity: env::var("IDENTIFY_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
            ocr_model_path: non_empty(env::var("OCR_MODEL_PATH").ok()),
            ocr_dict_path: non_empty(env::var("OCR_DICT_PATH").ok()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
