// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Vision-model client for card identification via OpenAI-compatible API

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const IDENTIFY_PROMPT: &str = "You are identifying a trading card from a photo. Respond with strict JSON only, no prose, exactly this shape: {\"name\": string|null, \"number\": string|null, \"printed_total\": number|null, \"hp\": number|null, \"confidence\": number}. \"number\" is the printed collector number such as \"27/159\". Use null for any field you cannot read. \"confidence\" is your overall confidence between 0 and 1.";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_COMPLETION_TOKENS: u32 = 300;

/// Failures talking to or interpreting the remote model. `tag()` is the
/// stable machine-readable form reported to API clients.
#[derive(Debug, thiserror::Error)]
pub enum IdentifyError {
    #[error("vision endpoint is not configured")]
    Unconfigured,
    #[error("vision request timed out")]
    Timeout,
    #[error("vision endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("vision endpoint returned HTTP {0}")]
    Http(u16),
    #[error("vision response was not valid JSON: {0}")]
    InvalidJson(String),
}

impl IdentifyError {
    pub fn tag(&self) -> String {
        match self {
            IdentifyError::Unconfigured => "upstream_unconfigured".to_string(),
            IdentifyError::Timeout => "upstream_timeout".to_string(),
            IdentifyError::Unreachable(_) => "upstream_unreachable".to_string(),
            IdentifyError::Http(status) => format!("upstream_http_{}", status),
            IdentifyError::InvalidJson(_) => "upstream_invalid_json".to_string(),
        }
    }
}

/// Structured identification returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentificationResult {
    pub name: Option<String>,
    pub number: Option<String>,
    pub printed_total: Option<u32>,
    pub hp: Option<u32>,
    pub confidence: f32,
    pub model: String,
}

/// Seam between the identify service and the remote model, so tests can
/// script responses without a network.
#[async_trait]
pub trait CardIdentifier: Send + Sync {
    async fn identify(&self, jpeg: &[u8]) -> Result<IdentificationResult, IdentifyError>;
}

/// Client for an OpenAI-compatible vision endpoint.
pub struct VisionIdClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl VisionIdClient {
    pub fn new(endpoint: &str, api_key: Option<&str>, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "vision identify client configured: endpoint={}, model={}",
            endpoint, model
        );

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.map(|k| k.to_string()),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CardIdentifier for VisionIdClient {
    async fn identify(&self, jpeg: &[u8]) -> Result<IdentificationResult, IdentifyError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        let data_url = format!("data:image/jpeg;base64,{}", encoded);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": IDENTIFY_PROMPT},
                    {"type": "image_url", "image_url": {"url": data_url}}
                ]),
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: 0.0,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                IdentifyError::Timeout
            } else {
                IdentifyError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentifyError::Http(status.as_u16()));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| IdentifyError::InvalidJson(e.to_string()))?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!(model = %self.model, content_len = content.len(), "vision response received");
        parse_identification(&content, &self.model)
    }
}

/// Parse model output into a normalized result. Tolerates code fences and
/// surrounding prose, lenient field types, and leading zeros in the
/// printed number.
pub fn parse_identification(
    content: &str,
    model: &str,
) -> Result<IdentificationResult, IdentifyError> {
    let json = unwrap_json(content)
        .ok_or_else(|| IdentifyError::InvalidJson(truncate(content, 200)))?;

    let name = json
        .get("name")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let number_raw = match json.get("number") {
        Some(serde_json::Value::String(s)) => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty());
    let mut printed_total = lenient_u32(json.get("printed_total"));
    let hp = lenient_u32(json.get("hp"));
    let confidence = json
        .get("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0) as f32;

    // "027/159" normalizes to "27/159"; the denominator backfills a
    // missing printed_total.
    let number = number_raw.map(|raw| {
        let fraction = Regex::new(r"^0*(\d+)\s*/\s*0*(\d+)$").expect("static pattern");
        match fraction.captures(&raw) {
            Some(caps) => {
                if printed_total.is_none() {
                    printed_total = caps[2].parse().ok();
                }
                format!("{}/{}", &caps[1], &caps[2])
            }
            None => raw,
        }
    });

    Ok(IdentificationResult {
        name,
        number,
        printed_total,
        hp,
        confidence,
        model: model.to_string(),
    })
}

/// Extract the JSON object from model output, stripping markdown fences
/// and falling back to the first brace-delimited span.
fn unwrap_json(content: &str) -> Option<serde_json::Value> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str(unfenced) {
        return Some(value);
    }

    let braces = Regex::new(r"(?s)\{.*\}").expect("static pattern");
    let span = braces.find(unfenced)?;
    serde_json::from_str(span.as_str()).ok()
}

fn lenient_u32(value: Option<&serde_json::Value>) -> Option<u32> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
