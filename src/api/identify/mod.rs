// Copyright (c) 2025 Grookai
// SPDX-License-Identifier: BUSL-1.1
//! Remote identification API endpoint module
//!
//! Provides POST /ai-identify-warp for vision-model card identification
//! behind the shared-secret gate and the content-addressed cache.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::identify_handler;
pub use request::IdentifyRequest;
pub use response::IdentifyResponse;
