// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Identify service: request gating, content addressing, cache, and the
//! remote model call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::identify::cache::IdentificationCache;
use crate::identify::client::{CardIdentifier, IdentificationResult, IdentifyError};
use crate::vision::image_utils::{
    decode_base64_payload, decode_image_bytes, downscale_longest_edge, encode_jpeg, ImageError,
    DEFAULT_DOWNSCALE_EDGE,
};

pub const ERR_UNAUTHORIZED: &str = "unauthorized";
pub const ERR_IMAGE_TOO_LARGE: &str = "image_too_large";
pub const ERR_DECODE_FAILED: &str = "decode_failed";

/// One identify request after HTTP unwrapping.
pub struct IdentifyParams {
    pub image_b64: String,
    pub token: Option<String>,
    pub force_refresh: bool,
    pub trace_id: Option<String>,
}

/// Outcome of one identify request. `error` carries a stable tag when
/// `ok` is false.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IdentifyOutcome {
    pub ok: bool,
    pub cache_hit: bool,
    pub run_id: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<IdentificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct IdentifyService {
    cache: IdentificationCache,
    identifier: Option<Arc<dyn CardIdentifier>>,
    shared_token: Option<String>,
    downscale_edge: u32,
}

impl IdentifyService {
    pub fn new(
        identifier: Option<Arc<dyn CardIdentifier>>,
        shared_token: Option<String>,
        cache_capacity: usize,
        downscale_edge: Option<u32>,
    ) -> Self {
        Self {
            cache: IdentificationCache::new(cache_capacity),
            identifier,
            shared_token,
            downscale_edge: downscale_edge.unwrap_or(DEFAULT_DOWNSCALE_EDGE),
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Run one identify request end to end. Gates are checked in order:
    /// shared token, payload size, decoded size. The digest of the
    /// decoded bytes keys the cache; `force_refresh` skips the lookup
    /// but still stores the fresh result.
    pub async fn identify(&self, params: IdentifyParams) -> IdentifyOutcome {
        let run_id = Uuid::new_v4().to_string();
        let trace_id = params
            .trace_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // 1. Shared-secret gate
        if let Some(expected) = &self.shared_token {
            if params.token.as_deref() != Some(expected.as_str()) {
                warn!(run_id = %run_id, "identify request rejected: bad token");
                return self.failure(run_id, trace_id, None, ERR_UNAUTHORIZED);
            }
        }

        // 2. Payload gates, before any decode work
        let bytes = match decode_base64_payload(&params.image_b64) {
            Ok(bytes) => bytes,
            Err(ImageError::PayloadTooLarge(..)) | Err(ImageError::TooLarge(..)) => {
                return self.failure(run_id, trace_id, None, ERR_IMAGE_TOO_LARGE)
            }
            Err(_) => return self.failure(run_id, trace_id, None, ERR_DECODE_FAILED),
        };

        // 3. Content address
        let digest = hex::encode(Sha256::digest(&bytes));

        // 4. Cache lookup
        if !params.force_refresh {
            if let Some(entry) = self.cache.get(&digest) {
                debug!(run_id = %run_id, sha256 = %digest, "identify cache hit");
                return IdentifyOutcome {
                    ok: true,
                    cache_hit: true,
                    run_id,
                    trace_id,
                    sha256: Some(digest),
                    cached_at: Some(entry.cached_at),
                    result: Some(entry.result),
                    error: None,
                };
            }
        }

        // 5. Re-encode for the remote model
        let image = match decode_image_bytes(&bytes) {
            Ok(image) => image,
            Err(_) => return self.failure(run_id, trace_id, Some(digest), ERR_DECODE_FAILED),
        };
        let downscaled = downscale_longest_edge(&image, self.downscale_edge);
        let jpeg = match encode_jpeg(&downscaled) {
            Ok(jpeg) => jpeg,
            Err(_) => return self.failure(run_id, trace_id, Some(digest), ERR_DECODE_FAILED),
        };

        // 6. Remote call
        let Some(identifier) = &self.identifier else {
            return self.failure(
                run_id,
                trace_id,
                Some(digest),
                &IdentifyError::Unconfigured.tag(),
            );
        };
        let result = match identifier.identify(&jpeg).await {
            Ok(result) => result,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "identify upstream failed");
                return self.failure(run_id, trace_id, Some(digest), &e.tag());
            }
        };

        // 7. Store, including on force_refresh
        let cached_at = self.cache.put(digest.clone(), result.clone());
        info!(
            run_id = %run_id,
            sha256 = %digest,
            confidence = result.confidence,
            "identify completed"
        );

        IdentifyOutcome {
            ok: true,
            cache_hit: false,
            run_id,
            trace_id,
            sha256: Some(digest),
            cached_at: Some(cached_at),
            result: Some(result),
            error: None,
        }
    }

    fn failure(
        &self,
        run_id: String,
        trace_id: String,
        sha256: Option<String>,
        tag: &str,
    ) -> IdentifyOutcome {
        IdentifyOutcome {
            ok: false,
            cache_hit: false,
            run_id,
            trace_id,
            sha256,
            cached_at: None,
            result: None,
            error: Some(tag.to_string()),
        }
    }
}
