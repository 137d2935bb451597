// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
use std::{env, sync::Arc};

use anyhow::Result;
use tracing::{info, warn};

use cardscan_node::api::http_server::{start_server, AppState};
use cardscan_node::config::ServiceConfig;
use cardscan_node::identify::{CardIdentifier, IdentifyService, VisionIdClient};
use cardscan_node::ocr::{NoopRecognizer, OnnxRecognizer, TextRecognizer};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env();
    info!("starting card scan node on port {}", config.api_port);

    // Recognition model; signal extraction degrades to null reads when
    // the model files are absent.
    let recognizer: Arc<dyn TextRecognizer> = match (&config.ocr_model_path, &config.ocr_dict_path)
    {
        (Some(model), Some(dict)) => match OnnxRecognizer::new(model, dict) {
            Ok(recognizer) => {
                info!("text recognizer loaded from {}", model);
                Arc::new(recognizer)
            }
            Err(e) => {
                warn!("failed to load text recognizer: {}; signals disabled", e);
                Arc::new(NoopRecognizer)
            }
        },
        _ => {
            warn!("OCR_MODEL_PATH/OCR_DICT_PATH not set; signals disabled");
            Arc::new(NoopRecognizer)
        }
    };

    let identifier: Option<Arc<dyn CardIdentifier>> = match &config.vision_api_url {
        Some(url) => Some(Arc::new(VisionIdClient::new(
            url,
            config.vision_api_key.as_deref(),
            &config.vision_model,
        )?)),
        None => None,
    };
    let identify = Arc::new(IdentifyService::new(
        identifier,
        config.shared_token.clone(),
        config.identify_cache_capacity,
        Some(config.vision_downscale_edge),
    ));

    let state = AppState {
        recognizer,
        identify,
        config: Arc::new(config),
    };

    start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;
    Ok(())
}
