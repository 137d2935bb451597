// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Identify request types

use serde::{Deserialize, Serialize};

/// Header carrying the shared secret.
pub const TOKEN_HEADER: &str = "x-gv-token";

/// Request for remote identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyRequest {
    /// Base64-encoded image data
    pub image_b64: String,

    /// Skip the cache lookup; the fresh result is still stored
    #[serde(default)]
    pub force_refresh: bool,

    /// Caller-supplied correlation id, echoed back
    #[serde(default)]
    pub trace_id: Option<String>,
}
